//! Binary stack images.
//!
//! A reduced stack (typically the primitive library plus the prelude) can be
//! frozen into a compact byte image and thawed later, so an embedder can
//! continue evaluation from it without parsing and reducing the prelude
//! again. Natives are stored by primitive id.

use super::stack::Stack;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("cannot encode stack image: {0}")]
    Encode(#[source] postcard::Error),

    #[error("malformed stack image: {0}")]
    Decode(#[source] postcard::Error),
}

pub fn freeze(stack: &Stack) -> Result<Vec<u8>, ImageError> {
    postcard::to_allocvec(stack).map_err(ImageError::Encode)
}

pub fn thaw(bytes: &[u8]) -> Result<Stack, ImageError> {
    postcard::from_bytes(bytes).map_err(ImageError::Decode)
}
