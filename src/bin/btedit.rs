use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use clap::{ArgGroup, Parser};
use tracing_subscriber::EnvFilter;

use btkit::bencode::{decode, Value};
use btkit::edit::{write_atomic, Selector};
use btkit::emit::{atom, jsonify, pretty};

#[derive(Debug, Parser)]
#[command(version, about = "Select, print, and rewrite entries of a bencoded file")]
#[command(group(ArgGroup::new("mutator").multiple(false).conflicts_with_all(["json", "atom"])))]
#[command(group(ArgGroup::new("format").multiple(false)))]
struct Args {
    /// Bencoded file to operate on
    file: PathBuf,

    /// Whitespace-separated path into the tree; omitted selects the root
    selector: Option<String>,

    /// Store an integer at the selected path (with --timestamp also accepts
    /// YYYY-MM-DDTHH:MM:SS, stored as Unix seconds)
    #[arg(long, value_name = "N", group = "mutator")]
    set_int: Option<String>,

    /// Store a string at the selected path
    #[arg(long, value_name = "S", group = "mutator")]
    set_str: Option<String>,

    /// Store an empty dictionary at the selected path
    #[arg(long, group = "mutator")]
    dict: bool,

    /// Store an empty list at the selected path
    #[arg(long, group = "mutator")]
    list: bool,

    /// Remove the selected path (with an empty selector: delete the file)
    #[arg(long, group = "mutator")]
    rm: bool,

    /// Write the result here instead of replacing the input
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Print the selected value as JSON
    #[arg(long, group = "format")]
    json: bool,

    /// Print the selected value as a bare atom
    #[arg(long, group = "format")]
    atom: bool,

    /// Render or parse integers as Unix timestamps
    #[arg(long)]
    timestamp: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let data = fs::read(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let mut root = decode(&data)
        .with_context(|| format!("decoding {}", args.file.display()))?;

    let selector = Selector::parse(args.selector.as_deref().unwrap_or(""));

    if args.rm {
        if selector.is_null() {
            fs::remove_file(&args.file)
                .with_context(|| format!("removing {}", args.file.display()))?;
            return Ok(());
        }
        selector.delete(&mut root)?;
        return write_back(args, &root);
    }

    if let Some(value) = new_value(args)? {
        if selector.is_null() {
            root = value;
        } else {
            selector.set(&mut root, value)?;
        }
        return write_back(args, &root);
    }

    let selected = selector.select(&root)?;
    if args.json {
        println!("{}", jsonify(selected)?);
    } else if args.atom {
        std::io::stdout().write_all(&atom(selected, args.timestamp)?)?;
    } else {
        println!("{}", pretty(selected));
    }

    Ok(())
}

fn new_value(args: &Args) -> Result<Option<Value>> {
    if let Some(text) = &args.set_int {
        return Ok(Some(Value::Integer(parse_integer(text, args.timestamp)?)));
    }
    if let Some(text) = &args.set_str {
        return Ok(Some(Value::string(text)));
    }
    if args.dict {
        return Ok(Some(Value::Dict(BTreeMap::new())));
    }
    if args.list {
        return Ok(Some(Value::List(Vec::new())));
    }
    Ok(None)
}

fn parse_integer(text: &str, timestamp: bool) -> Result<i64> {
    if timestamp {
        if let Ok(instant) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
            return Ok(instant.and_utc().timestamp());
        }
    }
    text.parse()
        .with_context(|| format!("{text:?} is not an integer"))
}

fn write_back(args: &Args, root: &Value) -> Result<()> {
    let target = args.output.as_ref().unwrap_or(&args.file);
    write_atomic(target, root)
        .with_context(|| format!("writing {}", target.display()))?;
    Ok(())
}
