// CLI binary — panicking on unrecoverable errors is standard for CLI tools.
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use lumiscene::codegen;
use lumiscene::{parse_csv, ParsedDocument};

#[derive(Parser)]
#[command(name = "lumiscene-cli", about = "Lighting spreadsheet converter", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a spreadsheet CSV export into scene/schedule JSON
    Parse {
        /// CSV file to read
        file: PathBuf,
        /// Process each cabinet (TỦ ĐIỆN section) separately
        #[arg(long)]
        cabinets: bool,
    },
    /// Generate controller initialization code from a CSV export or a saved
    /// JSON document
    Generate {
        /// Input file (CSV, or JSON with --from-json)
        file: PathBuf,
        /// Process each cabinet separately (CSV input only)
        #[arg(long)]
        cabinets: bool,
        /// Treat the input as a previously exported JSON document
        #[arg(long)]
        from_json: bool,
        /// Write the generated code here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn load_document(file: &PathBuf, cabinets: bool, from_json: bool) -> ParsedDocument {
    let content = fs::read_to_string(file).unwrap_or_else(|e| {
        eprintln!("[Lumiscene] cannot read {}: {e}", file.display());
        process::exit(1);
    });
    let result = if from_json {
        serde_json::from_str(&content).map_err(|e| e.to_string())
    } else {
        parse_csv(&content, cabinets).map_err(|e| e.to_string())
    };
    result.unwrap_or_else(|e| {
        eprintln!("[Lumiscene] {e}");
        process::exit(1);
    })
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { file, cabinets } => {
            let doc = load_document(&file, cabinets, false);
            println!("{}", serde_json::to_string_pretty(&doc).unwrap());
        }
        Commands::Generate {
            file,
            cabinets,
            from_json,
            output,
        } => {
            let doc = load_document(&file, cabinets, from_json);
            let generated = codegen::render_document(&doc);
            for notice in &generated.notices {
                eprintln!(
                    "[Lumiscene] scene \"{}\" exceeds {} entries and was split into {} parts",
                    notice.scene,
                    codegen::SCENE_CAPACITY,
                    notice.parts
                );
            }
            match output {
                Some(path) => {
                    fs::write(&path, &generated.code).unwrap_or_else(|e| {
                        eprintln!("[Lumiscene] cannot write {}: {e}", path.display());
                        process::exit(1);
                    });
                }
                None => print!("{}", generated.code),
            }
        }
    }
}
