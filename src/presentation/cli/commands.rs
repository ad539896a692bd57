//! CLI commands using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ntfs-reach - live NTFS volume extraction
///
/// Reads files straight off a raw NTFS volume or disk image, bypassing the
/// operating system's file API entirely.
#[derive(Parser)]
#[command(name = "ntfs-reach")]
#[command(version = "0.1.0")]
#[command(about = "Extract files from a live NTFS volume or image", long_about = None)]
pub struct Cli {
    /// Enable verbose (info-level) output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Copy a file, wildcard match, or directory off the volume
    Copy {
        /// Device or image path to read the volume from (e.g. \\.\C:, /dev/sda1, disk.img)
        #[arg(short = 's', long)]
        source_device: String,

        /// Source path on the volume, e.g. C:\Windows\System32\*.dll
        #[arg(short = 'p', long)]
        source_path: String,

        /// Directory under which extracted files are placed
        #[arg(short, long, default_value = "./extracted")]
        output: PathBuf,

        /// Directory for the persistent path cache (omit to disable on-disk caching)
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Start from an empty cache and skip persisting it at the end
        #[arg(long)]
        ignore_cache: bool,

        /// Recurse into child directories when the source path names one
        #[arg(short, long)]
        recursive: bool,

        /// Overwrite files that already exist at the destination
        #[arg(long)]
        overwrite: bool,
    },
}
