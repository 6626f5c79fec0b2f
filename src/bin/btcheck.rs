use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use btkit::metainfo::Torrent;
use btkit::verify::{verify, PieceNote, PieceReport, PieceStatus, VerifyOptions};

#[derive(Debug, Parser)]
#[command(version, about = "Verify torrent content against its piece hashes")]
struct Args {
    /// Path to the .torrent file
    torrent: PathBuf,

    /// File or directory to check (defaults to the torrent's name)
    checkee: Option<PathBuf>,

    /// Do not print per-piece progress
    #[arg(short, long)]
    quiet: bool,

    /// Stop at the first piece with an error
    #[arg(short, long)]
    fail_fast: bool,

    /// Resolve the content root relative to the torrent file's directory
    #[arg(short, long)]
    relative: bool,

    /// Mirror progress into the terminal title
    #[arg(short, long)]
    title: bool,

    /// Write valid pieces into this directory, one file per piece index
    #[arg(short = 'x', long, value_name = "DIR")]
    extract: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<bool> {
    let torrent = Torrent::load(&args.torrent)
        .with_context(|| format!("loading {}", args.torrent.display()))?;
    let root = content_root(args, &torrent);
    let piece_count = torrent.piece_count();

    let options = VerifyOptions {
        fail_fast: args.fail_fast,
        extract_dir: args.extract.clone(),
    };

    let summary = verify(&torrent, &root, &options, |report| {
        if args.title {
            print!(
                "\x1b]0;{} {}/{}\x07",
                torrent.name(),
                report.piece.index + 1,
                piece_count
            );
            let _ = std::io::stdout().flush();
        }
        if !args.quiet {
            println!("{}", progress_line(report, piece_count));
        }
        for note in &report.notes {
            eprintln!("piece {}: {}", report.piece.index, note_line(note));
        }
    })?;

    println!("{}/{} pieces valid", summary.valid_pieces, summary.piece_count);
    for extra in &summary.extra_files {
        println!("extra file: {}", extra.display());
    }

    Ok(!summary.errors_detected)
}

fn content_root(args: &Args, torrent: &Torrent) -> PathBuf {
    let base = args
        .checkee
        .clone()
        .unwrap_or_else(|| PathBuf::from(torrent.name()));
    if args.relative {
        if let Some(dir) = args.torrent.parent().filter(|d| !d.as_os_str().is_empty()) {
            return dir.join(base);
        }
    }
    base
}

fn progress_line(report: &PieceReport<'_>, piece_count: u32) -> String {
    let status = match report.status {
        PieceStatus::Ok => "ok",
        PieceStatus::HashMismatch => "hash mismatch",
        PieceStatus::AcquisitionFailed => "read failed",
    };

    // A fragment that covers its file completely is shown bare; partial
    // coverage is decorated with leading/trailing "...".
    let fragments: Vec<String> = report
        .piece
        .fragments
        .iter()
        .map(|f| {
            let mut desc = String::new();
            if f.range.start > 0 {
                desc.push_str("...");
            }
            desc.push_str(&f.path.display().to_string());
            if f.range.end < f.file_length {
                desc.push_str("...");
            }
            desc
        })
        .collect();

    format!(
        "piece {}/{} {}: {}",
        report.piece.index + 1,
        piece_count,
        status,
        fragments.join(", ")
    )
}

fn note_line(note: &PieceNote) -> String {
    match note {
        PieceNote::OpenFailed { path, error } => {
            format!("cannot open {}: {}", path.display(), error)
        }
        PieceNote::SizeMismatch {
            path,
            expected,
            actual,
        } => format!(
            "{}: size is {} bytes, torrent declares {}",
            path.display(),
            actual,
            expected
        ),
        PieceNote::ReadFailed { path, error } => {
            format!("short read from {}: {}", path.display(), error)
        }
        PieceNote::ExtractFailed { path, error } => {
            format!("cannot extract to {}: {}", path.display(), error)
        }
    }
}
