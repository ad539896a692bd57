//! ntfs-reach - live NTFS volume extraction
//!
//! Reads files straight off a raw NTFS volume or disk image, bypassing the
//! operating system's file API entirely.

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use ntfs_reach::application::dto::CopyOptions;
use ntfs_reach::application::{copy_files, Session};
use ntfs_reach::domain::entities::CacheTree;
use ntfs_reach::domain::repositories::{BlockReader, CacheStore};
use ntfs_reach::domain::services::EngineError;
use ntfs_reach::infrastructure::block_device::{LinuxBlockDevice, MmapBlockDevice};
#[cfg(windows)]
use ntfs_reach::infrastructure::block_device::WindowsBlockDevice;
use ntfs_reach::infrastructure::cache::FileCacheStore;
use ntfs_reach::infrastructure::ntfs::Volume;
use ntfs_reach::infrastructure::output::MirroredWriter;
use ntfs_reach::presentation::cli::{Cli, Commands, ProgressReporter};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(level))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            eprintln!("Error: {err:#}");
            ExitCode::from(exit_code_for(&err))
        }
    }
}

/// Maps the top-level error to a distinct non-zero exit code per
/// `EngineError` variant family, falling back to a generic I/O code for
/// errors raised outside the engine (argument parsing, device open).
fn exit_code_for(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<EngineError>() {
        Some(EngineError::BadVolume(_)) => 2,
        Some(EngineError::NotFound(_)) => 3,
        Some(EngineError::ReadShort(_)) => 4,
        Some(EngineError::CorruptRecord { .. }) => 4,
        Some(EngineError::BadCache(_)) => 5,
        Some(EngineError::CacheLocked) => 6,
        Some(EngineError::OutputIo(_)) => 7,
        None => 1,
    }
}

fn open_reader(path: &str) -> Result<Arc<dyn BlockReader>> {
    #[cfg(windows)]
    {
        return Ok(Arc::new(WindowsBlockDevice::open(path).context(
            "failed to open device. Make sure you're running elevated.",
        )?));
    }

    #[cfg(not(windows))]
    {
        if path.starts_with("/dev/") {
            Ok(Arc::new(LinuxBlockDevice::open(path).context(
                "failed to open device. Make sure you have read permissions (try sudo).",
            )?))
        } else {
            Ok(Arc::new(MmapBlockDevice::open(path).context(
                "failed to open image file",
            )?))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Copy {
            source_device,
            source_path,
            output,
            cache_dir,
            ignore_cache,
            recursive,
            overwrite,
        } => run_copy(
            &source_device,
            &source_path,
            CopyOptions::new(output)
                .with_cache_dir(cache_dir)
                .with_ignore_cache(ignore_cache)
                .with_recursive(recursive)
                .with_overwrite(overwrite),
        ),
    }
}

fn run_copy(source_device: &str, source_path: &str, options: CopyOptions) -> Result<()> {
    info!(source_device, source_path, "opening volume");

    let reader = open_reader(source_device)?;
    let volume = Volume::open(reader.as_ref()).context("failed to open NTFS volume")?;

    let mut cache_store = match &options.cache_dir {
        Some(dir) if !options.ignore_cache => {
            let mut store = FileCacheStore::new(dir)?;
            store.lock().map_err(EngineError::from)?;
            Some(store)
        }
        _ => None,
    };

    let mut cache = match &cache_store {
        Some(store) => store.load().map_err(EngineError::from)?,
        None => CacheTree::new(),
    };

    let session = Session::new(
        volume.boot_sector,
        reader,
        volume.locator,
        options.output_root.clone(),
        options.ignore_cache,
    );

    let writer = MirroredWriter::new(&options.output_root, options.overwrite)?;

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        ctrlc::set_handler(move || {
            cancel.store(true, Ordering::Relaxed);
        })
        .context("failed to install Ctrl-C handler")?;
    }

    let progress = ProgressReporter::for_copy();
    let outcome = copy_files(
        &session,
        &mut cache,
        source_path,
        options.recursive,
        &writer,
        &cancel,
    )?;
    progress.finish("Copy complete");

    println!("{}", outcome.summary());

    if let Some(store) = &mut cache_store {
        store.save(&cache).map_err(EngineError::from)?;
    }

    if outcome.files_failed() > 0 && outcome.files_copied == 0 {
        return Err(EngineError::NotFound(source_path.to_string()).into());
    }

    Ok(())
}
