pub mod telegram;
pub mod storage;

pub use telegram::*;
pub use storage::*;
