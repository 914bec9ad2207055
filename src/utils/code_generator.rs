use crate::error::{AppError, AppResult};
use rand::Rng;
use regex::Regex;

/// Generate a 6-digit pairing code.
///
/// Sampled uniformly from 100000..=999999, so generated codes never carry a
/// leading zero even though `validate_code_format` accepts any 6-digit string.
pub fn generate_six_digit_code() -> String {
    let mut rng = rand::thread_rng();
    format!("{:06}", rng.gen_range(100000..=999999))
}

/// Validate the syntactic shape of a submitted pairing code.
///
/// Trims surrounding whitespace and requires exactly 6 ASCII digits; `\d`
/// would also match non-ASCII decimal digits, so the class is spelled out.
/// Leading zeros pass here by design; rejecting them would leak which values
/// the generator can produce.
pub fn validate_code_format(code: &str) -> AppResult<String> {
    let code_regex = Regex::new(r"^[0-9]{6}$").unwrap();
    let trimmed = code.trim();

    if !code_regex.is_match(trimmed) {
        return Err(AppError::InvalidFormat(
            "Pairing code must be exactly 6 digits".to_string(),
        ));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_six_digit_code() {
        let code = generate_six_digit_code();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));

        let code_num: u32 = code.parse().unwrap();
        assert!(code_num >= 100000 && code_num <= 999999);
    }

    #[test]
    fn test_generated_codes_pass_validation() {
        for _ in 0..100 {
            let code = generate_six_digit_code();
            assert_eq!(validate_code_format(&code).unwrap(), code);
        }
    }

    #[test]
    fn test_validate_trims_whitespace() {
        assert_eq!(validate_code_format(" 482913\n").unwrap(), "482913");
    }

    #[test]
    fn test_validate_accepts_leading_zeros() {
        assert_eq!(validate_code_format("012345").unwrap(), "012345");
    }

    #[test]
    fn test_validate_rejects_non_ascii_digits() {
        // Arabic-Indic and fullwidth digits are decimal digits to Unicode
        // but not valid code characters.
        for bad in ["٤٨٢٩١٣", "１２３４５６"] {
            match validate_code_format(bad) {
                Err(AppError::InvalidFormat(_)) => {}
                other => panic!("expected InvalidFormat for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_validate_rejects_bad_shapes() {
        assert!(validate_code_format("12a456").is_err());
        assert!(validate_code_format("12345").is_err());
        assert!(validate_code_format("1234567").is_err());
        assert!(validate_code_format("").is_err());
        assert!(validate_code_format("48 2913").is_err());
    }
}
