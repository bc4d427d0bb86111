//! Subcomando `list`

use std::io::{self, Write};

use anyhow::Result;
use clap::Subcommand;

use standoff_core::{DiscontRule, OverlapRule, TokenizationPolicy};

/// O que listar
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ListCommands {
    /// Regras para anotações descontínuas
    DiscontRules,
    /// Regras para anotações sobrepostas
    OverlapRules,
    /// Políticas de tokenização
    Tokenizers,
}

impl ListCommands {
    /// Nomes aceitos pelas flags, o padrão primeiro.
    pub fn names(&self) -> Vec<&'static str> {
        match self {
            ListCommands::DiscontRules => with_default_first(
                DiscontRule::all().iter().map(DiscontRule::name),
                DiscontRule::default().name(),
            ),
            ListCommands::OverlapRules => with_default_first(
                OverlapRule::all().iter().map(OverlapRule::name),
                OverlapRule::default().name(),
            ),
            ListCommands::Tokenizers => with_default_first(
                TokenizationPolicy::all().iter().map(TokenizationPolicy::name),
                TokenizationPolicy::default().name(),
            ),
        }
    }

    pub fn execute(&self) -> Result<()> {
        let mut out = io::stdout().lock();
        for (i, name) in self.names().into_iter().enumerate() {
            if i == 0 {
                writeln!(out, "{name} (padrão)")?;
            } else {
                writeln!(out, "{name}")?;
            }
        }
        Ok(())
    }
}

fn with_default_first(
    names: impl Iterator<Item = &'static str>,
    default: &'static str,
) -> Vec<&'static str> {
    let mut names: Vec<&'static str> = names.collect();
    names.sort_by_key(|n| *n != default);
    names
}
