//! Descoberta dos arquivos de anotação
//!
//! Cada argumento pode ser:
//! - um **diretório**: seus arquivos `.ann`/`.a1` (sem recursão);
//! - um **arquivo**: usado como está;
//! - um **padrão glob** (`corpus/*/*.ann`): expandido, mantendo só arquivos de anotação.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;
use tracing::warn;

use standoff_core::batch::is_standoff_file;

/// Arquivos de anotação de um diretório, sem descer em subdiretórios.
pub fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("falha ao listar {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("falha ao listar {}", dir.display()))?
            .path();
        if path.is_file() && is_standoff_file(&path) {
            files.push(path);
        }
    }
    if files.is_empty() {
        warn!(dir = %dir.display(), "nenhum arquivo standoff no diretório");
    }
    Ok(files)
}

/// Arquivos de anotação designados por um único argumento.
pub fn expand_input(input: &str) -> Result<Vec<PathBuf>> {
    let path = Path::new(input);
    if path.is_dir() {
        return scan_directory(path);
    }
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    let paths = glob(input).with_context(|| format!("padrão glob inválido: {input}"))?;
    for path_result in paths {
        let path = path_result.with_context(|| format!("erro ao resolver o padrão: {input}"))?;
        if path.is_file() && is_standoff_file(&path) {
            files.push(path);
        }
    }
    if files.is_empty() {
        warn!(input, "entrada não corresponde a nenhum arquivo");
    }
    Ok(files)
}

/// Resolve os argumentos de entrada em uma lista ordenada e sem repetições.
pub fn resolve_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        files.extend(expand_input(input)?);
    }

    if files.is_empty() {
        anyhow::bail!("nenhum arquivo de anotação encontrado nas entradas informadas");
    }

    files.sort();
    files.dedup();
    Ok(files)
}
