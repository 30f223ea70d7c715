//! Command-line manager for pictdb image databases.

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::missing_docs_in_private_items
)]

mod commands;

use anyhow::Result;
use clap::Parser;

#[derive(Parser)]
#[command(
    name = "pictdb",
    version,
    about = "Picture database management tool"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// List the contents of a database.
    List(commands::ListArgs),

    /// Create a new database.
    Create(commands::CreateArgs),

    /// Read a picture and save it to `<pict_id>_<resolution>.jpg`.
    Read(commands::ReadArgs),

    /// Insert a new picture into a database.
    Insert(commands::InsertArgs),

    /// Delete a picture from a database.
    Delete(commands::DeleteArgs),

    /// Garbage-collect a database into a temporary file, then swap it in.
    Gc(commands::GcArgs),
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if err.kind() == clap::error::ErrorKind::InvalidSubcommand => {
            let attempted = std::env::args().nth(1).unwrap_or_default();
            eprintln!("ERROR: {}", pictdb::Error::InvalidCommand(attempted));
            std::process::exit(1);
        }
        Err(err) => err.exit(),
    };

    if let Err(e) = cli.dispatch() {
        eprintln!("ERROR: {e}");
        std::process::exit(1);
    }
}

impl Cli {
    fn dispatch(self) -> Result<()> {
        match self.command {
            Command::List(args) => commands::list(args),
            Command::Create(args) => commands::create(args),
            Command::Read(args) => commands::read(args),
            Command::Insert(args) => commands::insert(args),
            Command::Delete(args) => commands::delete(args),
            Command::Gc(args) => commands::gc(args),
        }
    }
}
