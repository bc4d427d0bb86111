//! Subcomandos da CLI

use anyhow::Result;
use clap::Subcommand;

pub mod convert;
pub mod list;
pub mod stats;

/// Subcomandos disponíveis
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Converte diretórios ou arquivos de anotação para JSON (SpERT)
    Convert(convert::ConvertArgs),

    /// Lista as regras e políticas disponíveis
    List {
        #[command(subcommand)]
        subcommand: list::ListCommands,
    },

    /// Conta as relações por tipo em uma saída JSON já gerada
    Stats(stats::StatsArgs),
}

impl Commands {
    pub fn execute(&self) -> Result<()> {
        match self {
            Commands::Convert(args) => args.execute(),
            Commands::List { subcommand } => subcommand.execute(),
            Commands::Stats(args) => args.execute(),
        }
    }
}
