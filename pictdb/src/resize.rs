//! Lazy materialisation of resized variants.
//!
//! Thumbnail and small payloads are not produced at insert time; the first
//! read at a given resolution derives them from the original, appends the
//! encoded bytes, and records the new offset and size in the slot.

use tracing::debug;

use crate::codec::Codec;
use crate::db::PictDb;
use crate::error::{Error, Result};
use crate::io;
use crate::layout::Resolution;

/// Target dimensions for a variant, preserving aspect ratio.
///
/// Scales `orig` by `min(target_w / w, target_h / h)` with floored axes.
/// An image already within the target box keeps its original dimensions;
/// variants never upscale.
pub(crate) fn scaled_dims(orig: (u32, u32), target: (u16, u16)) -> (u32, u32) {
    let (w, h) = (f64::from(orig.0), f64::from(orig.1));
    let scale = f64::min(f64::from(target.0) / w, f64::from(target.1) / h);
    if scale >= 1.0 {
        orig
    } else {
        ((w * scale) as u32, (h * scale) as u32)
    }
}

impl PictDb {
    /// Materialises the `res` variant of the slot at `index` if absent.
    ///
    /// A request for the original, or for a variant that already exists,
    /// returns immediately. The slot is only mutated after the codec has
    /// produced the encoded variant, so a decode or encode failure leaves
    /// no partial state behind.
    pub(crate) fn lazily_resize(
        &mut self,
        res: Resolution,
        index: usize,
        codec: &dyn Codec,
    ) -> Result<()> {
        let Some(target) = self.header.target_res(res) else {
            return Ok(());
        };
        if self.metadata[index].offset[res.index()] != 0 {
            return Ok(());
        }

        let (orig_offset, orig_size, res_orig) = {
            let slot = &self.metadata[index];
            (
                slot.offset[Resolution::Orig.index()],
                slot.size[Resolution::Orig.index()],
                slot.res_orig,
            )
        };

        let original = io::read_image(&mut self.file, orig_offset, orig_size)?;
        let (width, height) = scaled_dims(res_orig, target);
        let encoded = codec.resize(&original, width, height)?;
        let size = u32::try_from(encoded.len())
            .map_err(|_| Error::Codec("encoded variant exceeds 4 GiB".to_owned()))?;

        let offset = io::append_image(&mut self.file, &encoded)?;
        let slot = &mut self.metadata[index];
        slot.offset[res.index()] = offset;
        slot.size[res.index()] = size;

        io::write_metadata(&mut self.file, index, &self.metadata[index])?;
        io::write_header(&mut self.file, &mut self.header, 0, false)?;

        debug!(index, %res, width, height, size, "variant materialised");
        Ok(())
    }
}
