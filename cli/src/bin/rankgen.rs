//! Standalone hand-rank table generator (§4.1).
//!
//! Runs the evaluator's table-generation pipeline once and writes the
//! resulting binary file to disk. This is the off-line production path; the
//! `oracle` driver falls back to generating the same tables in memory when
//! no file is found, so running this binary is an optimization, not a
//! prerequisite.

use clap::Parser;
use oracle_engine::ranks::RankTables;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rankgen")]
#[command(about = "Generate the 7-card hand-rank lookup tables and write them to disk")]
struct Args {
    /// Output path for the generated table file.
    #[arg(short, long, default_value = "handranks.dat")]
    output: PathBuf,

    /// Raise the log level to debug.
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    log::info!("generating rank tables");
    let tables = match RankTables::generate() {
        Ok(t) => t,
        Err(e) => {
            eprintln!("rankgen: table generation failed: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = tables.write_to_file(&args.output) {
        eprintln!("rankgen: could not write {}: {e}", args.output.display());
        std::process::exit(1);
    }

    log::info!("wrote rank tables to {}", args.output.display());
}
