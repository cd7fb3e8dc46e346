pub mod alphabet;
pub mod error;

pub use alphabet::{chr, ord, CHAR_NUM, END_ORD};
pub use error::{Error, ErrorCategory, Result};

/// A guessed or scored string paired with its model probability.
pub type StrProb = (Vec<u8>, f64);
