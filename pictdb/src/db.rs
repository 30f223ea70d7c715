//! Database handle lifecycle and engine operations.

use std::fs::{self, File, OpenOptions};
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::codec::Codec;
use crate::dedup::DedupOutcome;
use crate::error::{Error, Result};
use crate::io;
use crate::layout::{
    DEF_MAX_FILES, DEF_SMALL_RES, DEF_THUMB_RES, EMPTY, HEADER_SIZE, Header, MAX_DB_NAME,
    MAX_MAX_FILES, MAX_PIC_ID, MAX_SMALL_RES, MAX_THUMB_RES, METADATA_SIZE, Metadata, NON_EMPTY,
    Resolution,
};

/// Parameters for creating a new database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateConfig {
    /// Number of metadata slots; clamped to 100 000.
    pub max_files: u32,
    /// Thumbnail target resolution (width, height), each axis 1..=128.
    pub thumb_res: (u16, u16),
    /// Small-variant target resolution (width, height), each axis 1..=512.
    pub small_res: (u16, u16),
}

impl Default for CreateConfig {
    fn default() -> Self {
        Self {
            max_files: DEF_MAX_FILES,
            thumb_res: (DEF_THUMB_RES, DEF_THUMB_RES),
            small_res: (DEF_SMALL_RES, DEF_SMALL_RES),
        }
    }
}

/// An open picture database.
///
/// The handle exclusively owns the underlying file and the in-memory
/// metadata table; dropping it closes the file. During a session the
/// in-memory table is authoritative and the on-disk copy lags by at most
/// one slot-plus-header write.
#[derive(Debug)]
pub struct PictDb {
    /// The open database file.
    pub(crate) file: File,
    /// In-memory header mirror.
    pub(crate) header: Header,
    /// In-memory metadata table, one entry per slot.
    pub(crate) metadata: Vec<Metadata>,
}

/// Extracts the file-name component and enforces the 31-byte limit.
fn db_name(path: &Path) -> Result<String> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if name.is_empty() || name.len() > MAX_DB_NAME {
        return Err(Error::InvalidFilename(path.display().to_string()));
    }
    Ok(name)
}

/// Validates one axis of a resize target.
fn check_axis(axis: u16, max: u16, what: &str) -> Result<()> {
    if axis == 0 || axis > max {
        return Err(Error::Resolutions(format!(
            "{what} axis {axis} not in 1..={max}"
        )));
    }
    Ok(())
}

/// Maps an open-mode token to the options it grants.
///
/// Tokens follow the C stdio mode syntax (`rb`, `r+b`, `wb`, …); anything
/// else is rejected.
fn open_options(mode: &str) -> Option<OpenOptions> {
    let mut opts = OpenOptions::new();
    match mode {
        "rb" => opts.read(true),
        "rb+" | "r+b" => opts.read(true).write(true),
        "wb" => opts.write(true).create(true).truncate(true),
        "wb+" | "w+b" => opts.read(true).write(true).create(true).truncate(true),
        "ab" => opts.append(true).create(true),
        "ab+" | "a+b" => opts.read(true).append(true).create(true),
        _ => return None,
    };
    Some(opts)
}

impl PictDb {
    /// Creates a new database file at `path`, truncating any existing one,
    /// and returns the open handle.
    ///
    /// The header is written with version 1 followed by `max_files` empty
    /// slots. The configured `max_files` is clamped to 100 000; resize
    /// targets outside their per-axis bounds are rejected.
    pub fn create(path: impl AsRef<Path>, cfg: CreateConfig) -> Result<Self> {
        let path = path.as_ref();
        let name = db_name(path)?;

        check_axis(cfg.thumb_res.0, MAX_THUMB_RES, "thumbnail")?;
        check_axis(cfg.thumb_res.1, MAX_THUMB_RES, "thumbnail")?;
        check_axis(cfg.small_res.0, MAX_SMALL_RES, "small")?;
        check_axis(cfg.small_res.1, MAX_SMALL_RES, "small")?;

        let max_files = cfg.max_files.min(MAX_MAX_FILES);
        let mut header = Header {
            db_name: name,
            db_version: 0,
            num_files: 0,
            max_files,
            thumb_res: cfg.thumb_res,
            small_res: cfg.small_res,
        };
        let metadata = vec![Metadata::default(); max_files as usize];

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        io::write_header(&mut file, &mut header, 0, true)?;

        // The fresh table is all zeros; lay it down in one write rather
        // than slot by slot.
        let table = vec![0u8; max_files as usize * METADATA_SIZE as usize];
        use std::io::Write as _;
        file.write_all(&table)?;

        debug!(max_files, "database created");
        Ok(Self {
            file,
            header,
            metadata,
        })
    }

    /// Opens an existing database at `path`.
    ///
    /// `mode` must be one of `rb`, `rb+`, `r+b`, `wb`, `wb+`, `w+b`, `ab`,
    /// `ab+`, `a+b`; any other token fails with
    /// [`Error::InvalidArgument`]. `max_files` read from disk is clamped
    /// to 100 000, and `num_files` is recomputed from the slot scan — the
    /// stored count is treated as a hint.
    pub fn open(path: impl AsRef<Path>, mode: &str) -> Result<Self> {
        let path = path.as_ref();
        let opts = open_options(mode).ok_or_else(|| Error::InvalidArgument(mode.to_owned()))?;
        db_name(path)?;

        let mut file = opts.open(path)?;

        let mut header = io::read_header(&mut file)?;
        header.max_files = header.max_files.min(MAX_MAX_FILES);

        let metadata = io::read_metadata_table(&mut file, header.max_files)?;
        header.num_files = metadata.iter().filter(|m| m.is_used()).count() as u32;

        Ok(Self {
            file,
            header,
            metadata,
        })
    }

    /// The in-memory header mirror.
    pub const fn header(&self) -> &Header {
        &self.header
    }

    /// The in-memory metadata table.
    pub fn metadata(&self) -> &[Metadata] {
        &self.metadata
    }

    /// Index of the occupied slot holding `pict_id`, scanning in ascending
    /// order.
    pub fn find_index(&self, pict_id: &str) -> Option<usize> {
        self.metadata
            .iter()
            .position(|m| m.is_used() && m.pict_id == pict_id)
    }

    /// Lowest empty slot index.
    fn allocate(&self) -> Result<usize> {
        self.metadata
            .iter()
            .position(|m| !m.is_used())
            .ok_or(Error::FullDatabase)
    }

    /// Inserts a new picture under `pict_id`.
    ///
    /// Identical content already present is aliased instead of stored
    /// again; an id already present fails with [`Error::DuplicateId`]
    /// without occupying a slot. Ids longer than 127 bytes are truncated
    /// when the slot is persisted.
    pub fn insert(&mut self, bytes: &[u8], pict_id: &str, codec: &dyn Codec) -> Result<()> {
        if self.header.num_files >= self.header.max_files {
            return Err(Error::FullDatabase);
        }
        let size = u32::try_from(bytes.len())
            .map_err(|_| Error::InvalidArgument("payload exceeds 4 GiB".to_owned()))?;

        let index = self.allocate()?;
        {
            let slot = &mut self.metadata[index];
            slot.sha = Sha256::digest(bytes).into();
            slot.pict_id = pict_id.to_owned();
            slot.size[Resolution::Orig.index()] = size;
        }

        match self.deduplicate(index)? {
            DedupOutcome::Aliased => {
                debug!(pict_id, index, "insert aliased to existing payload");
            }
            DedupOutcome::Fresh => {
                let res_orig = match codec.dimensions(bytes) {
                    Ok(dims) => dims,
                    Err(e) => {
                        self.metadata[index] = Metadata::default();
                        return Err(e);
                    }
                };
                let offset = io::append_image(&mut self.file, bytes)?;

                let slot = &mut self.metadata[index];
                slot.res_orig = res_orig;
                slot.offset[Resolution::Orig.index()] = offset;
                slot.offset[Resolution::Thumb.index()] = 0;
                slot.offset[Resolution::Small.index()] = 0;
                slot.size[Resolution::Thumb.index()] = 0;
                slot.size[Resolution::Small.index()] = 0;
                debug!(pict_id, index, offset, size, "insert appended payload");
            }
        }

        self.metadata[index].is_valid = NON_EMPTY;
        io::write_header(&mut self.file, &mut self.header, 1, true)?;
        io::write_metadata(&mut self.file, index, &self.metadata[index])?;
        Ok(())
    }

    /// Reads the payload of `pict_id` at resolution `res`, materialising
    /// the variant from the original on first access.
    ///
    /// A freshly materialised variant is propagated to content aliases by
    /// re-running the dedup pass.
    pub fn read(&mut self, pict_id: &str, res: Resolution, codec: &dyn Codec) -> Result<Vec<u8>> {
        let index = self
            .find_index(pict_id)
            .ok_or_else(|| Error::FileNotFound(pict_id.to_owned()))?;

        // The dedup re-scan below clears offset[orig] in memory when the
        // slot has no content alias; save it and put it back afterwards.
        let orig_offset = self.metadata[index].offset[Resolution::Orig.index()];

        if self.metadata[index].offset[res.index()] == 0 {
            self.lazily_resize(res, index, codec)?;
            self.deduplicate(index)?;
        }

        self.metadata[index].offset[Resolution::Orig.index()] = orig_offset;

        let slot = &self.metadata[index];
        let (offset, size) = (slot.offset[res.index()], slot.size[res.index()]);
        io::read_image(&mut self.file, offset, size)
    }

    /// Deletes the picture with id `pict_id`.
    ///
    /// The slot is flipped to empty and persisted; payload bytes, aliased
    /// or not, stay in the data region until garbage collection.
    pub fn delete(&mut self, pict_id: &str) -> Result<()> {
        if pict_id.is_empty() || pict_id.len() > MAX_PIC_ID {
            return Err(Error::InvalidPictId(pict_id.to_owned()));
        }
        let index = self
            .find_index(pict_id)
            .ok_or_else(|| Error::InvalidPictId(pict_id.to_owned()))?;

        self.metadata[index].is_valid = EMPTY;
        io::write_metadata(&mut self.file, index, &self.metadata[index])?;
        io::write_header(&mut self.file, &mut self.header, -1, true)?;
        debug!(pict_id, index, "picture deleted");
        Ok(())
    }

    /// Rebuilds the database into `temp_path`, keeping only surviving
    /// pictures and their materialised variants, then atomically replaces
    /// the file at `original_path`.
    ///
    /// The handle is consumed; the rebuilt file carries the source's name
    /// and version.
    pub fn gc(
        mut self,
        original_path: impl AsRef<Path>,
        temp_path: impl AsRef<Path>,
        codec: &dyn Codec,
    ) -> Result<()> {
        let cfg = CreateConfig {
            max_files: self.header.max_files,
            thumb_res: self.header.thumb_res,
            small_res: self.header.small_res,
        };
        let mut fresh = Self::create(temp_path.as_ref(), cfg)?;

        let mut copied = 0usize;
        for index in 0..self.metadata.len() {
            if !self.metadata[index].is_used() {
                continue;
            }
            let pict_id = self.metadata[index].pict_id.clone();
            let bytes = self.read(&pict_id, Resolution::Orig, codec)?;
            fresh.insert(&bytes, &pict_id, codec)?;

            for res in Resolution::ALL {
                if self.metadata[index].offset[res.index()] != 0 {
                    fresh.lazily_resize(res, copied, codec)?;
                }
            }
            copied += 1;
        }

        fresh.header.db_name = self.header.db_name.clone();
        fresh.header.db_version = self.header.db_version;
        io::write_header(&mut fresh.file, &mut fresh.header, 0, false)?;
        debug!(survivors = copied, "garbage collection rebuilt database");

        drop(fresh);
        drop(self.file);

        fs::remove_file(original_path.as_ref())?;
        fs::rename(temp_path.as_ref(), original_path.as_ref())?;
        Ok(())
    }

    /// Byte offset of the first payload in the data region.
    pub const fn data_start(&self) -> u64 {
        HEADER_SIZE + self.header.max_files as u64 * METADATA_SIZE
    }
}
