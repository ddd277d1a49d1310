use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use shiken::sample::{DEFAULT_CHAPTERS, DEFAULT_SEED, write_bank};

#[derive(Parser)]
#[command(about = "Write a synthetic question bank for trying out the CLI")]
struct Args {
    #[arg(default_value = "sample-bank")]
    dir: PathBuf,

    #[arg(long, default_value_t = DEFAULT_CHAPTERS)]
    chapters: usize,

    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let store = write_bank(&args.dir, args.chapters, args.seed)?;

    let mut files: Vec<_> = fs::read_dir(store.base_dir())?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("json"))
        .collect();
    files.sort_by_key(|e| e.file_name());
    for entry in &files {
        let len = entry.metadata().map(|m| m.len()).unwrap_or(0);
        println!("Wrote {} ({len} bytes)", entry.path().display());
    }

    println!("\nGenerated a {}-chapter bank in {}.", args.chapters, args.dir.display());
    Ok(())
}
