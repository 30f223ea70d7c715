//! Human-readable and JSON renderings of the database contents.

use std::fmt;
use std::fmt::Write as _;

use crate::db::PictDb;
use crate::layout::{Header, Metadata, Resolution, SHA_LEN};

/// Output mode for [`PictDb::list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    /// Header banner plus one block per occupied slot.
    Text,
    /// `{"Pictures":[…]}` with ids in ascending slot order.
    Json,
}

/// Lowercase hex rendering of a content digest.
fn sha_hex(sha: &[u8; SHA_LEN]) -> String {
    let mut out = String::with_capacity(2 * SHA_LEN);
    for byte in sha {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "*****************************************")?;
        writeln!(f, "**********DATABASE HEADER START**********")?;
        writeln!(f, "DB NAME: {:>31}", self.db_name)?;
        writeln!(f, "VERSION: {}", self.db_version)?;
        writeln!(
            f,
            "IMAGE COUNT: {}\t\tMAX IMAGES: {}",
            self.num_files, self.max_files
        )?;
        writeln!(
            f,
            "THUMBNAIL: {} x {}\tSMALL: {} x {}",
            self.thumb_res.0, self.thumb_res.1, self.small_res.0, self.small_res.1
        )?;
        writeln!(f, "***********DATABASE HEADER END***********")?;
        writeln!(f, "*****************************************")
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PICTURE ID: {}", self.pict_id)?;
        writeln!(f, "SHA: {:>31}", sha_hex(&self.sha))?;
        writeln!(f, "VALID: {}", self.is_valid)?;
        writeln!(f, "UNUSED: {}", self.reserved)?;
        writeln!(
            f,
            "OFFSET ORIG. : {}\t\tSIZE ORIG. : {}",
            self.offset[Resolution::Orig.index()],
            self.size[Resolution::Orig.index()]
        )?;
        writeln!(
            f,
            "OFFSET THUMB.: {}\t\tSIZE THUMB.: {}",
            self.offset[Resolution::Thumb.index()],
            self.size[Resolution::Thumb.index()]
        )?;
        writeln!(
            f,
            "OFFSET SMALL : {}\t\tSIZE SMALL : {}",
            self.offset[Resolution::Small.index()],
            self.size[Resolution::Small.index()]
        )?;
        writeln!(f, "ORIGINAL: {} x {}", self.res_orig.0, self.res_orig.1)?;
        writeln!(f, "*****************************************")
    }
}

impl PictDb {
    /// Renders the database contents in the requested mode.
    pub fn list(&self, mode: ListMode) -> String {
        match mode {
            ListMode::Text => {
                let mut out = self.header.to_string();
                if self.header.num_files == 0 {
                    out.push_str("<< empty database >>\n");
                } else {
                    for meta in self.metadata.iter().filter(|m| m.is_used()) {
                        let _ = write!(out, "{meta}");
                    }
                }
                out
            }
            ListMode::Json => {
                let ids: Vec<&str> = self
                    .metadata
                    .iter()
                    .filter(|m| m.is_used())
                    .map(|m| m.pict_id.as_str())
                    .collect();
                serde_json::json!({ "Pictures": ids }).to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_renders_as_lowercase_hex() {
        let mut sha = [0u8; SHA_LEN];
        sha[0] = 0x0f;
        sha[31] = 0xa0;
        let hex = sha_hex(&sha);
        assert_eq!(hex.len(), 64);
        assert!(hex.starts_with("0f"));
        assert!(hex.ends_with("a0"));
    }

    #[test]
    fn header_banner_shape() {
        let header = Header {
            db_name: "db.pdb".to_owned(),
            db_version: 1,
            num_files: 0,
            max_files: 10,
            thumb_res: (64, 64),
            small_res: (256, 256),
        };
        let text = header.to_string();
        assert!(text.contains("**********DATABASE HEADER START**********"));
        assert!(text.contains("IMAGE COUNT: 0"));
        assert!(text.contains("MAX IMAGES: 10"));
        assert!(text.contains("THUMBNAIL: 64 x 64"));
    }
}
