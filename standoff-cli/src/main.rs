use std::process::ExitCode;

use clap::Parser;

use standoff_cli::commands::Commands;

/// Converte corpora standoff (brat) no formato JSON do SpERT.
#[derive(Debug, Parser)]
#[command(name = "standoff2spert", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("erro: {err:#}");
            ExitCode::FAILURE
        }
    }
}
