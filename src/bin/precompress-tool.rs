//! Operator tool for checking the dictionary shared with HTML storage.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::{Parser, Subcommand};

use html_precompressor::compression::{compress, DEFAULT_LEVEL};
use html_precompressor::Dictionary;

#[derive(Parser)]
#[command(name = "precompress-tool")]
#[command(about = "Compress and inspect HTML with the precompressor's zstd dictionary", long_about = None)]
struct Cli {
    /// Path to Zstd dictionary file
    #[arg(short = 'z', long, global = true, default_value = "./zstd_dict")]
    dictionary: PathBuf,

    /// Zstd compression level
    #[arg(short, long, global = true, default_value_t = DEFAULT_LEVEL)]
    level: i32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress HTML and print the base64 body as it would be relayed
    Compress {
        /// Input file (stdin when omitted)
        input: Option<PathBuf>,
    },
    /// Decode a base64 relayed body back into HTML
    Decompress {
        /// Input file (stdin when omitted)
        input: Option<PathBuf>,
    },
    /// Show dictionary size and id
    Inspect,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let dictionary = Dictionary::from_file(&cli.dictionary, cli.level)?;

    match cli.command {
        Commands::Compress { input } => {
            let html = read_input(input.as_deref())?;
            let frame = compress(&html, &dictionary)?;
            println!("{}", STANDARD.encode(frame));
        }
        Commands::Decompress { input } => {
            let encoded = read_input(input.as_deref())?;
            let frame = STANDARD.decode(encoded.trim())?;
            let html = dictionary.decompress(&frame)?;
            io::stdout().write_all(html.as_bytes())?;
        }
        Commands::Inspect => {
            println!("path:  {}", cli.dictionary.display());
            println!("size:  {} bytes", dictionary.size());
            println!("level: {}", dictionary.level());
            match dictionary.id() {
                Some(id) => println!("id:    {}", id),
                None => println!("id:    none (raw content)"),
            }
        }
    }

    Ok(())
}

fn read_input(path: Option<&Path>) -> io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}
