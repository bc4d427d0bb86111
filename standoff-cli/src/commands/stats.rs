//! Subcomando `stats`

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use standoff_core::DocumentRecord;

use crate::output::{relation_counts, write_stats_csv, write_stats_file};

/// Argumentos do subcomando `stats`
#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Saída JSON de um `convert` anterior
    #[arg(value_name = "JSON")]
    pub input: PathBuf,

    /// Grava o CSV neste arquivo (padrão: stdout)
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl StatsArgs {
    pub fn execute(&self) -> Result<()> {
        let content = fs::read_to_string(&self.input)
            .with_context(|| format!("falha ao ler {}", self.input.display()))?;
        let records: Vec<DocumentRecord> = serde_json::from_str(&content)
            .with_context(|| format!("JSON inválido em {}", self.input.display()))?;

        let counts = relation_counts(&records);
        match &self.output {
            Some(path) => write_stats_file(path, &counts),
            None => write_stats_csv(io::stdout().lock(), &counts),
        }
    }
}
