pub mod code_generator;
pub mod session;

pub use code_generator::{generate_six_digit_code, validate_code_format};
pub use session::mint_session_token;
