use uuid::Uuid;

/// Mint an opaque session token handed to the companion app on successful
/// redemption. Returned exactly once; the server keeps only the storage-side
/// record, never the token semantics.
pub fn mint_session_token() -> String {
    format!("wl_{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_token_shape() {
        let token = mint_session_token();
        assert!(token.starts_with("wl_"));
        assert_eq!(token.len(), 3 + 32);
        assert!(token[3..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_session_tokens_differ() {
        assert_ne!(mint_session_token(), mint_session_token());
    }
}
