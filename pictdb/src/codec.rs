//! Abstract image codec consumed by the engine.
//!
//! The engine never interprets payload bytes itself; dimension extraction
//! and variant generation go through this trait so the storage semantics
//! stay independent of any particular JPEG implementation.

use crate::error::Result;

/// Decodes, measures, and re-encodes image payloads.
pub trait Codec {
    /// Extracts `(width, height)` from an encoded image.
    fn dimensions(&self, bytes: &[u8]) -> Result<(u32, u32)>;

    /// Decodes `bytes`, scales the raster to exactly `width × height`, and
    /// re-encodes it.
    fn resize(&self, bytes: &[u8], width: u32, height: u32) -> Result<Vec<u8>>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Deterministic codecs for engine tests.

    use super::Codec;
    use crate::error::{Error, Result};

    /// Reports fixed dimensions and produces synthetic variant payloads.
    pub(crate) struct StubCodec {
        /// Dimensions reported for every payload.
        pub(crate) dims: (u32, u32),
    }

    impl StubCodec {
        /// The payload `resize` produces for a given target.
        pub(crate) fn variant_payload(width: u32, height: u32) -> Vec<u8> {
            format!("variant {width}x{height}").into_bytes()
        }
    }

    impl Codec for StubCodec {
        fn dimensions(&self, _bytes: &[u8]) -> Result<(u32, u32)> {
            Ok(self.dims)
        }

        fn resize(&self, _bytes: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
            Ok(Self::variant_payload(width, height))
        }
    }

    /// Fails every operation, for rollback tests.
    pub(crate) struct BrokenCodec;

    impl Codec for BrokenCodec {
        fn dimensions(&self, _bytes: &[u8]) -> Result<(u32, u32)> {
            Err(Error::Codec("not an image".to_owned()))
        }

        fn resize(&self, _bytes: &[u8], _width: u32, _height: u32) -> Result<Vec<u8>> {
            Err(Error::Codec("not an image".to_owned()))
        }
    }
}
