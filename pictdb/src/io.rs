//! Positioned reads and writes of the header, metadata slots, and payloads.
//!
//! Every primitive seeks to a fixed position derived from the layout
//! constants, then transfers whole records with `read_exact`/`write_all`.
//! Short transfers surface as [`Error::Io`]; nothing reports partial
//! progress.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

use crate::error::{Error, Result};
use crate::layout::{HEADER_SIZE, Header, METADATA_SIZE, Metadata};

/// Reads the header record from offset 0.
pub(crate) fn read_header(file: &mut File) -> Result<Header> {
    file.seek(SeekFrom::Start(0))?;
    let mut buf = [0u8; HEADER_SIZE as usize];
    file.read_exact(&mut buf)?;
    Ok(Header::decode(&buf))
}

/// Applies `delta_num_files` and the optional version bump to the in-memory
/// header, then writes it back to offset 0.
///
/// Callers are responsible for validating `num_files` bounds beforehand.
pub(crate) fn write_header(
    file: &mut File,
    header: &mut Header,
    delta_num_files: i32,
    bump_version: bool,
) -> Result<()> {
    if bump_version {
        header.db_version += 1;
    }
    header.num_files = header.num_files.saturating_add_signed(delta_num_files);

    file.seek(SeekFrom::Start(0))?;
    file.write_all(&header.encode())?;
    Ok(())
}

/// Reads the whole metadata table starting right after the header.
pub(crate) fn read_metadata_table(file: &mut File, max_files: u32) -> Result<Vec<Metadata>> {
    let count = max_files as usize;
    let bytes = count * METADATA_SIZE as usize;

    let mut buf = Vec::new();
    buf.try_reserve_exact(bytes).map_err(|_| Error::OutOfMemory)?;
    buf.resize(bytes, 0);

    file.seek(SeekFrom::Start(HEADER_SIZE))?;
    file.read_exact(&mut buf)?;

    Ok(buf
        .chunks_exact(METADATA_SIZE as usize)
        .map(Metadata::decode)
        .collect())
}

/// Writes the metadata slot at `index` to its fixed table position.
pub(crate) fn write_metadata(file: &mut File, index: usize, meta: &Metadata) -> Result<()> {
    file.seek(SeekFrom::Start(HEADER_SIZE + index as u64 * METADATA_SIZE))?;
    file.write_all(&meta.encode())?;
    Ok(())
}

/// Reads `size` payload bytes at `offset` in the data region.
pub(crate) fn read_image(file: &mut File, offset: u64, size: u32) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(size as usize)
        .map_err(|_| Error::OutOfMemory)?;
    buf.resize(size as usize, 0);

    file.seek(SeekFrom::Start(offset))?;
    file.read_exact(&mut buf)?;
    Ok(buf)
}

/// Appends a payload at end-of-file and returns the offset it landed at.
pub(crate) fn append_image(file: &mut File, bytes: &[u8]) -> Result<u64> {
    let offset = file.seek(SeekFrom::End(0))?;
    file.write_all(bytes)?;
    Ok(offset)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn scratch_file() -> (tempfile::TempDir, File) {
        let dir = tempfile::tempdir().unwrap();
        let file = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(dir.path().join("scratch.pdb"))
            .unwrap();
        (dir, file)
    }

    #[test]
    fn header_write_read_roundtrip() {
        let (_dir, mut file) = scratch_file();
        let mut header = Header {
            db_name: "scratch.pdb".to_owned(),
            max_files: 4,
            thumb_res: (64, 64),
            small_res: (256, 256),
            ..Header::default()
        };

        write_header(&mut file, &mut header, 0, true).unwrap();
        assert_eq!(header.db_version, 1);
        assert_eq!(read_header(&mut file).unwrap(), header);
    }

    #[test]
    fn header_delta_applies_before_write() {
        let (_dir, mut file) = scratch_file();
        let mut header = Header {
            num_files: 5,
            max_files: 8,
            ..Header::default()
        };

        write_header(&mut file, &mut header, -1, false).unwrap();
        let on_disk = read_header(&mut file).unwrap();
        assert_eq!(on_disk.num_files, 4);
        assert_eq!(on_disk.db_version, 0);
    }

    #[test]
    fn metadata_slot_lands_at_table_position() {
        let (_dir, mut file) = scratch_file();
        let mut header = Header {
            max_files: 4,
            ..Header::default()
        };
        write_header(&mut file, &mut header, 0, false).unwrap();
        for i in 0..4 {
            write_metadata(&mut file, i, &Metadata::default()).unwrap();
        }

        let meta = Metadata {
            pict_id: "slot2".to_owned(),
            is_valid: crate::layout::NON_EMPTY,
            ..Metadata::default()
        };
        write_metadata(&mut file, 2, &meta).unwrap();

        let table = read_metadata_table(&mut file, 4).unwrap();
        assert_eq!(table[2], meta);
        assert!(!table[0].is_used());
        assert!(!table[3].is_used());
    }

    #[test]
    fn append_returns_end_of_file_offset() {
        let (_dir, mut file) = scratch_file();
        file.write_all(&[0u8; 100]).unwrap();

        let first = append_image(&mut file, b"payload one").unwrap();
        let second = append_image(&mut file, b"payload two!").unwrap();
        assert_eq!(first, 100);
        assert_eq!(second, 100 + 11);

        assert_eq!(read_image(&mut file, first, 11).unwrap(), b"payload one");
        assert_eq!(read_image(&mut file, second, 12).unwrap(), b"payload two!");
    }

    #[test]
    fn short_read_is_an_io_error() {
        let (_dir, mut file) = scratch_file();
        file.write_all(b"tiny").unwrap();
        assert!(matches!(
            read_image(&mut file, 0, 100),
            Err(Error::Io(_))
        ));
    }
}
