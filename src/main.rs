//! Xode - XPP-style ODE model front end
//!
//! Parses a model file, inlines constants and function calls, and prints
//! the resulting definitions.
//!
//! # Usage
//!
//! ```bash
//! xode model.ode
//! xode --json model.ode > model.json
//! RUST_LOG=trace xode model.ode
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use xode_core::{
    dsl::{self, ParseConfig},
    error::Result,
    Model, ModelConfig,
};

/// XPP-style ODE model front end
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the model file (.ode)
    #[arg(value_name = "MODEL_FILE")]
    model_file: PathBuf,

    /// Print the expanded symbol table as JSON
    #[arg(long)]
    json: bool,

    /// Also print the definitions before substitution
    #[arg(long)]
    raw: bool,

    /// Skip the operand check of the expanded expressions
    #[arg(long)]
    no_validate: bool,

    /// Directory for lookup-table files (defaults to the model's directory)
    #[arg(long, value_name = "DIR")]
    table_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let table_dir = match &args.table_dir {
        Some(dir) => dir.clone(),
        None => args
            .model_file
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    let config = ParseConfig::new().with_table_dir(table_dir);

    // Extract the definitions
    let parsed = dsl::parse_file_with_config(&args.model_file, &config)?;
    if args.raw {
        println!("# before substitution");
        print!("{}", parsed.symbols.summary());
        println!("# after substitution");
    }

    // Inline constants and function calls
    let model_config = ModelConfig::new().with_validate_operands(!args.no_validate);
    let model = Model::with_config(parsed, model_config)?;

    if args.json {
        println!("{}", model.to_json()?);
    } else {
        print!("{}", model.summary());
    }

    Ok(())
}
