//! Arquivo de configuração (TOML)
//!
//! ```toml
//! [conversion]
//! discont_rule = "span-to-first"
//! overlap_rule = "keep-all"
//! tokenization = "fine"
//! type_exclude = ["Negation"]
//!
//! [output]
//! pretty = true
//! error_log = "errors.txt"
//! ```
//!
//! Flags de linha de comando têm precedência sobre o arquivo.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use standoff_core::ConversionConfig;

/// Configuração completa da CLI
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CliConfig {
    /// Regras da conversão
    pub conversion: ConversionConfig,
    /// Destinos de saída
    pub output: OutputConfig,
}

/// Opções de saída
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// JSON indentado
    pub pretty: bool,
    /// Arquivo para as linhas `documento: motivo`
    pub error_log: Option<PathBuf>,
    /// CSV com a contagem de relações por tipo
    pub stats: Option<PathBuf>,
}

impl CliConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("falha ao ler a configuração {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("configuração inválida em {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
