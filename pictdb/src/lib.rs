//! Single-file image database with content-addressed deduplication.
//!
//! A `pictdb` database is one file holding a fixed header, a fixed-size
//! metadata table, and an append-only data region of JPEG payloads. Each
//! picture is keyed by a user-supplied id and stored at up to three
//! resolutions — thumbnail, small, original — with the smaller variants
//! materialised lazily on first read. Identical originals are detected by
//! SHA-256 digest and stored once; deleted payloads are reclaimed by
//! rebuilding the file through [`PictDb::gc`].
//!
//! # Quick start
//!
//! ```no_run
//! use pictdb::{CreateConfig, ListMode, PictDb};
//!
//! let db = PictDb::create("pics.pdb", CreateConfig::default())?;
//! println!("{}", db.list(ListMode::Text));
//! # Ok::<(), pictdb::Error>(())
//! ```
//!
//! Operations that decode or derive image content ([`PictDb::insert`],
//! [`PictDb::read`], [`PictDb::gc`]) take a [`Codec`]; the `pictdb-image`
//! crate provides the JPEG implementation.

mod codec;
mod db;
mod dedup;
mod error;
mod io;
mod layout;
mod list;
mod resize;

pub use codec::Codec;
pub use db::{CreateConfig, PictDb};
pub use dedup::DedupOutcome;
pub use error::{Error, Result};
pub use layout::{
    DEF_MAX_FILES, DEF_SMALL_RES, DEF_THUMB_RES, EMPTY, HEADER_SIZE, Header, MAX_DB_NAME,
    MAX_MAX_FILES, MAX_PIC_ID, MAX_SMALL_RES, MAX_THUMB_RES, METADATA_SIZE, Metadata, NB_RES,
    NON_EMPTY, Resolution, SHA_LEN, save_name,
};
pub use list::ListMode;
