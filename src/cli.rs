use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::options::DEFAULT_CHUNK_SIZE;

#[derive(Parser, Debug)]
#[command(name = "ziptree")]
#[command(version)]
#[command(about = "Stream directory trees into ZIP archives and back", long_about = None)]
#[command(after_help = "Examples:\n  \
  ziptree archive photos backup/photos.zip   pack the contents of photos\n  \
  ziptree extract backup/photos.zip -d out   unpack into out\n  \
  ziptree list -v backup/photos.zip          show sizes and timestamps")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Quiet mode (-qq => quieter)
    #[arg(short = 'q', global = true, action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// Size of the streaming buffer in bytes
    #[arg(long, global = true, value_name = "BYTES", default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Pack the contents of a directory into an archive
    Archive {
        /// Directory whose contents are archived
        #[arg(value_name = "SOURCE_DIR")]
        source: PathBuf,

        /// Archive file to create (parent directories are created)
        #[arg(value_name = "ARCHIVE")]
        archive: PathBuf,
    },

    /// Unpack an archive into a directory
    Extract {
        /// Archive file to read
        #[arg(value_name = "ARCHIVE")]
        archive: PathBuf,

        /// Extract files into exdir
        #[arg(short = 'd', value_name = "DIR", default_value = ".")]
        extract_dir: PathBuf,
    },

    /// List archive entries
    List {
        /// Archive file to read
        #[arg(value_name = "ARCHIVE")]
        archive: PathBuf,

        /// List verbosely
        #[arg(short = 'v')]
        verbose: bool,
    },
}

impl Cli {
    pub fn is_quiet(&self) -> bool {
        self.quiet > 0
    }

    pub fn is_very_quiet(&self) -> bool {
        self.quiet > 1
    }
}
