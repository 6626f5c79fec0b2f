use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use btkit::metainfo::Torrent;

#[derive(Debug, Parser)]
#[command(
    version,
    about = "Create the zero-length files a torrent declares, where missing"
)]
struct Args {
    /// Torrent files to process
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
    let root = PathBuf::from(torrent.name());

    for file in torrent.files() {
        if file.length != 0 {
            continue;
        }

        let target = if torrent.is_multifile() {
            root.join(&file.path)
        } else {
            root.clone()
        };

        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        // Exclusive create: an existing file, empty or not, is left alone.
        match OpenOptions::new().write(true).create_new(true).open(&target) {
            Ok(_) => println!("created {}", target.display()),
            Err(error) if error.kind() == ErrorKind::AlreadyExists => {}
            Err(error) => {
                return Err(error).with_context(|| format!("creating {}", target.display()))
            }
        }
    }

    Ok(())
}
