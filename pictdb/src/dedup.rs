//! Name and content deduplication pass.
//!
//! Runs after a candidate slot has been populated with its id, digest, and
//! original size, but before any payload is appended. A single ascending
//! scan over the other occupied slots either rejects the candidate
//! (duplicate id), aliases it onto an existing payload (digest match), or
//! confirms it as fresh content.

use tracing::debug;

use crate::db::PictDb;
use crate::error::{Error, Result};
use crate::io;
use crate::layout::{EMPTY, NB_RES, Resolution};

/// What the dedup pass decided about the candidate slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupOutcome {
    /// The candidate's content already exists; its variant offsets now
    /// alias the existing payloads and both slots are persisted.
    Aliased,
    /// No other slot holds this content; the caller must append the
    /// payload itself.
    Fresh,
}

impl PictDb {
    /// Deduplicates the candidate slot at `index` against every other
    /// occupied slot.
    ///
    /// On a digest match the two slots exchange variants under the rule
    /// "whichever slot already has the variant wins": for each variant the
    /// slot missing it copies the other's offset and size. On
    /// [`DedupOutcome::Fresh`] the candidate's original offset is zeroed
    /// in memory only; the caller overwrites it when appending.
    pub(crate) fn deduplicate(&mut self, index: usize) -> Result<DedupOutcome> {
        for i in 0..self.metadata.len() {
            if i == index || !self.metadata[i].is_used() {
                continue;
            }

            if self.metadata[i].pict_id == self.metadata[index].pict_id {
                self.metadata[index].is_valid = EMPTY;
                return Err(Error::DuplicateId(self.metadata[i].pict_id.clone()));
            }

            if self.metadata[i].sha == self.metadata[index].sha {
                for res in 0..NB_RES {
                    // The established slot wins; the candidate only
                    // donates a variant the other side is missing.
                    let (to, from) = if self.metadata[i].offset[res] == 0 {
                        (i, index)
                    } else {
                        (index, i)
                    };
                    let (offset, size) = (self.metadata[from].offset[res], self.metadata[from].size[res]);
                    self.metadata[to].offset[res] = offset;
                    self.metadata[to].size[res] = size;
                }
                self.metadata[index].res_orig = self.metadata[i].res_orig;

                io::write_header(&mut self.file, &mut self.header, 0, false)?;
                io::write_metadata(&mut self.file, i, &self.metadata[i])?;
                io::write_metadata(&mut self.file, index, &self.metadata[index])?;

                debug!(index, alias = i, "content match, payload aliased");
                return Ok(DedupOutcome::Aliased);
            }
        }

        self.metadata[index].offset[Resolution::Orig.index()] = 0;
        Ok(DedupOutcome::Fresh)
    }
}
