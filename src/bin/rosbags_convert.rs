// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # rosbags-convert
//!
//! Converts between rosbag1 (`.bag` file) and rosbag2 (sqlite directory)
//! containers.
//!
//! ## Usage
//!
//! ```sh
//! # rosbag1 -> rosbag2, destination directory derived from the source stem
//! rosbags-convert input.bag
//!
//! # rosbag2 -> rosbag1, explicit destination
//! rosbags-convert recorded_bag --dst recorded.bag
//! ```

use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use robocodec::convert::{convert, ConvertOptions};

/// Convert between rosbag1 and rosbag2 containers.
#[derive(Parser)]
#[command(name = "rosbags-convert")]
#[command(about = "Convert between rosbag1 (.bag) and rosbag2 (directory) containers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Source bag: a `.bag` file (rosbag1) or a directory (rosbag2)
    source: PathBuf,

    /// Destination path. Defaults to a sibling of `source` with the
    /// opposite container shape (`.bag` file <-> directory).
    #[arg(long = "dst", value_name = "PATH")]
    dst: Option<PathBuf>,
}

/// Derive a destination path from `source`'s stem when `--dst` is absent.
fn default_destination(source: &Path) -> anyhow::Result<PathBuf> {
    let stem = source
        .file_stem()
        .ok_or_else(|| anyhow::anyhow!("source path '{}' has no file stem", source.display()))?;
    let parent = source.parent().filter(|p| !p.as_os_str().is_empty());
    let parent = parent.unwrap_or_else(|| Path::new("."));

    Ok(if source.is_dir() {
        parent.join(stem).with_extension("bag")
    } else {
        parent.join(stem)
    })
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let dst = match cli.dst {
        Some(dst) => dst,
        None => default_destination(&cli.source)?,
    };

    convert(&cli.source, &dst, &ConvertOptions::default()).with_context(|| {
        format!(
            "converting '{}' to '{}'",
            cli.source.display(),
            dst.display()
        )
    })?;

    println!("wrote {}", dst.display());
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
