#![doc = include_str!("../README.md")]

mod bytes;
mod error;

pub mod decoder;
pub mod message;
pub mod replay;
pub mod sequence;
pub mod stream;
pub mod summary;
pub mod telegram;

pub use decoder::{decode_telegram, Decoded, Decoder};
pub use error::{DecodeError, DecodeErrorKind, Error, Result};
pub use message::{Message, MessageKind, ValidityTime};
pub use summary::Summary;

pub(crate) mod prelude {
    pub(crate) use crate::error::{Error, Result};
}
