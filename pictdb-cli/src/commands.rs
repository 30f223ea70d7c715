//! Subcommand arguments and handlers.

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use pictdb::{
    CreateConfig, Error, ListMode, MAX_MAX_FILES, MAX_SMALL_RES, MAX_THUMB_RES, PictDb,
    Resolution, save_name,
};
use pictdb_image::JpegCodec;

/// Arguments for `pictdb list`.
#[derive(clap::Args)]
pub struct ListArgs {
    /// Database file.
    pub db: PathBuf,
}

/// Arguments for `pictdb create`.
#[derive(clap::Args)]
pub struct CreateArgs {
    /// Database file to create.
    pub db: PathBuf,

    /// Maximum number of pictures (1..=100000).
    #[arg(long, default_value_t = pictdb::DEF_MAX_FILES)]
    pub max_files: u32,

    /// Thumbnail resolution, width and height (each 1..=128).
    #[arg(long, num_args = 2, value_names = ["X", "Y"])]
    pub thumb_res: Option<Vec<u16>>,

    /// Small resolution, width and height (each 1..=512).
    #[arg(long, num_args = 2, value_names = ["X", "Y"])]
    pub small_res: Option<Vec<u16>>,
}

/// Arguments for `pictdb read`.
#[derive(clap::Args)]
pub struct ReadArgs {
    /// Database file.
    pub db: PathBuf,

    /// Picture id.
    pub pict_id: String,

    /// Resolution: thumb, thumbnail, small, orig, or original.
    #[arg(default_value = "original")]
    pub resolution: String,
}

/// Arguments for `pictdb insert`.
#[derive(clap::Args)]
pub struct InsertArgs {
    /// Database file.
    pub db: PathBuf,

    /// Picture id.
    pub pict_id: String,

    /// JPEG file to insert.
    pub file: PathBuf,
}

/// Arguments for `pictdb delete`.
#[derive(clap::Args)]
pub struct DeleteArgs {
    /// Database file.
    pub db: PathBuf,

    /// Picture id.
    pub pict_id: String,
}

/// Arguments for `pictdb gc`.
#[derive(clap::Args)]
pub struct GcArgs {
    /// Database file to collect.
    pub db: PathBuf,

    /// Temporary database file used during the rebuild.
    pub tmp_db: PathBuf,
}

pub fn list(args: ListArgs) -> Result<()> {
    let db = PictDb::open(&args.db, "rb")?;
    print!("{}", db.list(ListMode::Text));
    Ok(())
}

/// Turns an optional `X Y` pair into a resolution tuple, enforcing the
/// per-axis bound.
fn parse_res(pair: Option<Vec<u16>>, default: u16, max: u16) -> Result<(u16, u16)> {
    let Some(pair) = pair else {
        return Ok((default, default));
    };
    for axis in &pair {
        if *axis == 0 || *axis > max {
            return Err(Error::Resolutions(format!("{axis} not in 1..={max}")).into());
        }
    }
    Ok((pair[0], pair[1]))
}

pub fn create(args: CreateArgs) -> Result<()> {
    if args.max_files == 0 || args.max_files > MAX_MAX_FILES {
        return Err(Error::MaxFiles(args.max_files).into());
    }
    let cfg = CreateConfig {
        max_files: args.max_files,
        thumb_res: parse_res(args.thumb_res, pictdb::DEF_THUMB_RES, MAX_THUMB_RES)?,
        small_res: parse_res(args.small_res, pictdb::DEF_SMALL_RES, MAX_SMALL_RES)?,
    };

    println!("Create");
    let db = PictDb::create(&args.db, cfg)?;
    println!("{} item(s) written", db.header().max_files + 1);
    Ok(())
}

pub fn read(args: ReadArgs) -> Result<()> {
    let res: Resolution = args.resolution.parse()?;
    let mut db = PictDb::open(&args.db, "r+b")?;
    let bytes = db.read(&args.pict_id, res, &JpegCodec)?;

    let name = save_name(&args.pict_id, res);
    fs::write(&name, &bytes).map_err(Error::from)?;
    Ok(())
}

pub fn insert(args: InsertArgs) -> Result<()> {
    let bytes = fs::read(&args.file).map_err(Error::from)?;
    let mut db = PictDb::open(&args.db, "r+b")?;
    db.insert(&bytes, &args.pict_id, &JpegCodec)?;
    Ok(())
}

pub fn delete(args: DeleteArgs) -> Result<()> {
    let mut db = PictDb::open(&args.db, "rb+")?;
    db.delete(&args.pict_id)?;
    Ok(())
}

pub fn gc(args: GcArgs) -> Result<()> {
    let db = PictDb::open(&args.db, "rb")?;
    db.gc(&args.db, &args.tmp_db, &JpegCodec)?;
    Ok(())
}
