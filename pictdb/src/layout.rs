//! On-disk layout: header and metadata slot encoding.
//!
//! A database file holds three contiguous regions:
//!
//! ```text
//! offset 0                 — header, 64 bytes
//! offset 64                — metadata table, max_files × 208 bytes
//! offset 64 + n × 208      — data region, JPEG payloads appended in
//!                            insertion order, never rewritten
//! ```
//!
//! All multi-byte integers are little-endian.
//!
//! Header (64 bytes):
//!
//! | Field         | Offset | Width | Contents                                |
//! |---------------|--------|-------|-----------------------------------------|
//! | `db_name`     | 0      | 32    | NUL-terminated name, at most 31 bytes   |
//! | `db_version`  | 32     | 4     | bumped on insert / delete / create      |
//! | `num_files`   | 36     | 4     | count of occupied slots                 |
//! | `max_files`   | 40     | 4     | slot count, immutable after creation    |
//! | `res_resized` | 44     | 8     | thumb_w, thumb_h, small_w, small_h      |
//! | reserved      | 52     | 12    | zero                                    |
//!
//! Metadata slot (208 bytes):
//!
//! | Field      | Offset | Width | Contents                                   |
//! |------------|--------|-------|--------------------------------------------|
//! | `pict_id`  | 0      | 128   | NUL-terminated id, at most 127 bytes       |
//! | `sha`      | 128    | 32    | SHA-256 of the original payload            |
//! | `res_orig` | 160    | 8     | original width, height                     |
//! | `size`     | 168    | 12    | byte sizes of thumb, small, orig; 0=absent |
//! | `offset`   | 180    | 24    | payload offsets of thumb, small, orig      |
//! | `is_valid` | 204    | 2     | 0 = empty slot, 1 = occupied               |
//! | reserved   | 206    | 2     | zero                                       |

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Maximum database name length in bytes, excluding the terminator.
pub const MAX_DB_NAME: usize = 31;
/// Maximum picture id length in bytes, excluding the terminator.
pub const MAX_PIC_ID: usize = 127;
/// Upper bound on the number of metadata slots in a database.
pub const MAX_MAX_FILES: u32 = 100_000;
/// Maximum thumbnail resolution per axis.
pub const MAX_THUMB_RES: u16 = 128;
/// Maximum small-variant resolution per axis.
pub const MAX_SMALL_RES: u16 = 512;

/// Default number of metadata slots.
pub const DEF_MAX_FILES: u32 = 10;
/// Default thumbnail resolution per axis.
pub const DEF_THUMB_RES: u16 = 64;
/// Default small-variant resolution per axis.
pub const DEF_SMALL_RES: u16 = 256;

/// `is_valid` tag of an unoccupied metadata slot.
pub const EMPTY: u16 = 0;
/// `is_valid` tag of an occupied metadata slot.
pub const NON_EMPTY: u16 = 1;

/// Number of stored resolutions per picture.
pub const NB_RES: usize = 3;
/// Length of the content digest in bytes.
pub const SHA_LEN: usize = 32;

/// Encoded header size in bytes.
pub const HEADER_SIZE: u64 = 64;
/// Encoded metadata slot size in bytes.
pub const METADATA_SIZE: u64 = 208;

/// One of the three stored resolutions of a picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Thumbnail variant.
    Thumb = 0,
    /// Small variant.
    Small = 1,
    /// Original payload as inserted.
    Orig = 2,
}

impl Resolution {
    /// All resolutions, in on-disk array order.
    pub const ALL: [Self; NB_RES] = [Self::Thumb, Self::Small, Self::Orig];

    /// Index of this resolution into the per-slot `size`/`offset` arrays.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// File-name suffix used when saving a retrieved payload.
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Thumb => "thumb",
            Self::Small => "small",
            Self::Orig => "orig",
        }
    }
}

impl FromStr for Resolution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "thumb" | "thumbnail" => Ok(Self::Thumb),
            "small" => Ok(Self::Small),
            "orig" | "original" => Ok(Self::Orig),
            _ => Err(Error::Resolutions(s.to_owned())),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Builds the save-file name for a retrieved payload:
/// `<pict_id>_<suffix>.jpg`, with the id truncated at 127 bytes.
pub fn save_name(pict_id: &str, res: Resolution) -> String {
    let mut id = pict_id;
    if id.len() > MAX_PIC_ID {
        let mut cut = MAX_PIC_ID;
        while !id.is_char_boundary(cut) {
            cut -= 1;
        }
        id = &id[..cut];
    }
    format!("{id}_{}.jpg", res.suffix())
}

/// In-memory mirror of the 64-byte database header.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Header {
    /// Database name, at most 31 bytes.
    pub db_name: String,
    /// Version counter, bumped on each versioned mutation.
    pub db_version: u32,
    /// Number of occupied metadata slots.
    pub num_files: u32,
    /// Total number of metadata slots.
    pub max_files: u32,
    /// Thumbnail target resolution (width, height).
    pub thumb_res: (u16, u16),
    /// Small-variant target resolution (width, height).
    pub small_res: (u16, u16),
}

impl Header {
    /// Target resolution for a resized variant; `None` for the original.
    pub const fn target_res(&self, res: Resolution) -> Option<(u16, u16)> {
        match res {
            Resolution::Thumb => Some(self.thumb_res),
            Resolution::Small => Some(self.small_res),
            Resolution::Orig => None,
        }
    }

    /// Encodes the header into its on-disk form.
    pub fn encode(&self) -> [u8; HEADER_SIZE as usize] {
        let mut buf = [0u8; HEADER_SIZE as usize];
        put_str(&mut buf, 0, MAX_DB_NAME, &self.db_name);
        put_u32(&mut buf, 32, self.db_version);
        put_u32(&mut buf, 36, self.num_files);
        put_u32(&mut buf, 40, self.max_files);
        put_u16(&mut buf, 44, self.thumb_res.0);
        put_u16(&mut buf, 46, self.thumb_res.1);
        put_u16(&mut buf, 48, self.small_res.0);
        put_u16(&mut buf, 50, self.small_res.1);
        buf
    }

    /// Decodes a header from its on-disk form.
    ///
    /// `buf` must hold at least [`HEADER_SIZE`] bytes.
    pub fn decode(buf: &[u8]) -> Self {
        Self {
            db_name: get_str(buf, 0, MAX_DB_NAME + 1),
            db_version: get_u32(buf, 32),
            num_files: get_u32(buf, 36),
            max_files: get_u32(buf, 40),
            thumb_res: (get_u16(buf, 44), get_u16(buf, 46)),
            small_res: (get_u16(buf, 48), get_u16(buf, 50)),
        }
    }
}

/// In-memory mirror of one 208-byte metadata slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metadata {
    /// Picture id, at most 127 bytes; unique among occupied slots.
    pub pict_id: String,
    /// SHA-256 digest of the original payload.
    pub sha: [u8; SHA_LEN],
    /// Original resolution (width, height).
    pub res_orig: (u32, u32),
    /// Byte sizes of the three variants; 0 where absent.
    pub size: [u32; NB_RES],
    /// Data-region offsets of the three variants; 0 where absent.
    pub offset: [u64; NB_RES],
    /// Slot tag: [`EMPTY`] or [`NON_EMPTY`].
    pub is_valid: u16,
    /// Reserved, zero.
    pub reserved: u16,
}

impl Metadata {
    /// Whether the slot holds a live picture.
    pub const fn is_used(&self) -> bool {
        self.is_valid == NON_EMPTY
    }

    /// Encodes the slot into its on-disk form.
    pub fn encode(&self) -> [u8; METADATA_SIZE as usize] {
        let mut buf = [0u8; METADATA_SIZE as usize];
        put_str(&mut buf, 0, MAX_PIC_ID, &self.pict_id);
        buf[128..128 + SHA_LEN].copy_from_slice(&self.sha);
        put_u32(&mut buf, 160, self.res_orig.0);
        put_u32(&mut buf, 164, self.res_orig.1);
        for (i, size) in self.size.iter().enumerate() {
            put_u32(&mut buf, 168 + 4 * i, *size);
        }
        for (i, offset) in self.offset.iter().enumerate() {
            put_u64(&mut buf, 180 + 8 * i, *offset);
        }
        put_u16(&mut buf, 204, self.is_valid);
        put_u16(&mut buf, 206, self.reserved);
        buf
    }

    /// Decodes a slot from its on-disk form.
    ///
    /// `buf` must hold at least [`METADATA_SIZE`] bytes.
    pub fn decode(buf: &[u8]) -> Self {
        let mut sha = [0u8; SHA_LEN];
        sha.copy_from_slice(&buf[128..128 + SHA_LEN]);
        let mut size = [0u32; NB_RES];
        let mut offset = [0u64; NB_RES];
        for i in 0..NB_RES {
            size[i] = get_u32(buf, 168 + 4 * i);
            offset[i] = get_u64(buf, 180 + 8 * i);
        }
        Self {
            pict_id: get_str(buf, 0, MAX_PIC_ID + 1),
            sha,
            res_orig: (get_u32(buf, 160), get_u32(buf, 164)),
            size,
            offset,
            is_valid: get_u16(buf, 204),
            reserved: get_u16(buf, 206),
        }
    }
}

/// Writes a NUL-padded string field of `max` name bytes at `off`.
///
/// Bytes beyond `max` are dropped; the field is one byte longer than `max`
/// so a full-length name still carries its terminator.
fn put_str(buf: &mut [u8], off: usize, max: usize, s: &str) {
    let bytes = s.as_bytes();
    let n = bytes.len().min(max);
    buf[off..off + n].copy_from_slice(&bytes[..n]);
}

/// Reads a NUL-terminated string field of `width` bytes at `off`.
fn get_str(buf: &[u8], off: usize, width: usize) -> String {
    let field = &buf[off..off + width];
    let end = field.iter().position(|&b| b == 0).unwrap_or(width);
    String::from_utf8_lossy(&field[..end]).into_owned()
}

/// Writes a little-endian `u16` at `off`.
fn put_u16(buf: &mut [u8], off: usize, val: u16) {
    buf[off..off + 2].copy_from_slice(&val.to_le_bytes());
}

/// Writes a little-endian `u32` at `off`.
fn put_u32(buf: &mut [u8], off: usize, val: u32) {
    buf[off..off + 4].copy_from_slice(&val.to_le_bytes());
}

/// Writes a little-endian `u64` at `off`.
fn put_u64(buf: &mut [u8], off: usize, val: u64) {
    buf[off..off + 8].copy_from_slice(&val.to_le_bytes());
}

/// Reads a little-endian `u16` at `off`.
fn get_u16(buf: &[u8], off: usize) -> u16 {
    u16::from_le_bytes([buf[off], buf[off + 1]])
}

/// Reads a little-endian `u32` at `off`.
fn get_u32(buf: &[u8], off: usize) -> u32 {
    u32::from_le_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]])
}

/// Reads a little-endian `u64` at `off`.
fn get_u64(buf: &[u8], off: usize) -> u64 {
    u64::from_le_bytes([
        buf[off],
        buf[off + 1],
        buf[off + 2],
        buf[off + 3],
        buf[off + 4],
        buf[off + 5],
        buf[off + 6],
        buf[off + 7],
    ])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn header_field_positions() {
        let header = Header {
            db_name: "pics.pdb".to_owned(),
            db_version: 7,
            num_files: 2,
            max_files: 100,
            thumb_res: (64, 48),
            small_res: (256, 192),
        };
        let buf = header.encode();

        assert_eq!(&buf[..8], b"pics.pdb");
        assert_eq!(buf[8], 0, "name is NUL-terminated");
        assert_eq!(u32::from_le_bytes(buf[32..36].try_into().unwrap()), 7);
        assert_eq!(u32::from_le_bytes(buf[36..40].try_into().unwrap()), 2);
        assert_eq!(u32::from_le_bytes(buf[40..44].try_into().unwrap()), 100);
        assert_eq!(u16::from_le_bytes(buf[44..46].try_into().unwrap()), 64);
        assert_eq!(u16::from_le_bytes(buf[46..48].try_into().unwrap()), 48);
        assert_eq!(u16::from_le_bytes(buf[48..50].try_into().unwrap()), 256);
        assert_eq!(u16::from_le_bytes(buf[50..52].try_into().unwrap()), 192);
        assert!(buf[52..].iter().all(|&b| b == 0), "reserved tail is zero");
    }

    #[test]
    fn header_roundtrip() {
        let header = Header {
            db_name: "x".repeat(MAX_DB_NAME),
            db_version: u32::MAX,
            num_files: 3,
            max_files: MAX_MAX_FILES,
            thumb_res: (128, 128),
            small_res: (512, 512),
        };
        assert_eq!(Header::decode(&header.encode()), header);
    }

    #[test]
    fn metadata_field_positions() {
        let meta = Metadata {
            pict_id: "pic1".to_owned(),
            sha: [0xab; SHA_LEN],
            res_orig: (1920, 1080),
            size: [10, 20, 30],
            offset: [100, 200, 300],
            is_valid: NON_EMPTY,
            reserved: 0,
        };
        let buf = meta.encode();

        assert_eq!(&buf[..4], b"pic1");
        assert_eq!(buf[4], 0);
        assert!(buf[128..160].iter().all(|&b| b == 0xab));
        assert_eq!(u32::from_le_bytes(buf[160..164].try_into().unwrap()), 1920);
        assert_eq!(u32::from_le_bytes(buf[164..168].try_into().unwrap()), 1080);
        assert_eq!(u32::from_le_bytes(buf[168..172].try_into().unwrap()), 10);
        assert_eq!(u32::from_le_bytes(buf[176..180].try_into().unwrap()), 30);
        assert_eq!(u64::from_le_bytes(buf[180..188].try_into().unwrap()), 100);
        assert_eq!(u64::from_le_bytes(buf[196..204].try_into().unwrap()), 300);
        assert_eq!(u16::from_le_bytes(buf[204..206].try_into().unwrap()), 1);
    }

    #[test]
    fn metadata_roundtrip() {
        let meta = Metadata {
            pict_id: "p".repeat(MAX_PIC_ID),
            sha: [0x5a; SHA_LEN],
            res_orig: (4000, 3000),
            size: [1, 2, u32::MAX],
            offset: [u64::MAX, 0, 64 + 10 * 208],
            is_valid: NON_EMPTY,
            reserved: 0,
        };
        assert_eq!(Metadata::decode(&meta.encode()), meta);
    }

    #[test]
    fn empty_slot_encodes_to_zeros() {
        assert!(Metadata::default().encode().iter().all(|&b| b == 0));
    }

    #[test]
    fn resolution_tokens() {
        assert_eq!("thumb".parse::<Resolution>().unwrap(), Resolution::Thumb);
        assert_eq!(
            "thumbnail".parse::<Resolution>().unwrap(),
            Resolution::Thumb
        );
        assert_eq!("small".parse::<Resolution>().unwrap(), Resolution::Small);
        assert_eq!("orig".parse::<Resolution>().unwrap(), Resolution::Orig);
        assert_eq!("original".parse::<Resolution>().unwrap(), Resolution::Orig);
        assert!("medium".parse::<Resolution>().is_err());
    }

    #[test]
    fn save_name_appends_suffix() {
        assert_eq!(save_name("pic1", Resolution::Thumb), "pic1_thumb.jpg");
        assert_eq!(save_name("pic1", Resolution::Orig), "pic1_orig.jpg");
    }

    #[test]
    fn save_name_truncates_long_ids() {
        let long = "a".repeat(200);
        let name = save_name(&long, Resolution::Small);
        assert_eq!(name, format!("{}_small.jpg", "a".repeat(MAX_PIC_ID)));
    }
}
