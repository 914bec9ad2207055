pub mod common;
pub mod pairing;
pub mod message;

pub use common::*;
pub use pairing::*;
pub use message::*;
