use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use btkit::metainfo::Torrent;

#[derive(Debug, Parser)]
#[command(version, about = "Rename torrent files after their info.name")]
struct Args {
    /// Torrent files to rename
    #[arg(required = true)]
    torrents: Vec<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut failed = false;

    for torrent in &args.torrents {
        if let Err(error) = process(torrent) {
            eprintln!("{}: {error:#}", torrent.display());
            failed = true;
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn process(path: &Path) -> Result<()> {
    let torrent = Torrent::load(path).context("loading torrent")?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let target = dir.join(format!("{}.torrent", torrent.name()));

    if path.file_name() == target.file_name() {
        return Ok(());
    }
    if target.exists() {
        bail!("{} already exists", target.display());
    }

    fs::rename(path, &target)
        .with_context(|| format!("renaming to {}", target.display()))?;
    println!("{} -> {}", path.display(), target.display());

    Ok(())
}
