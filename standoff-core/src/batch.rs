//! # Conversão em Lote
//!
//! Cada arquivo de anotações (`.ann` ou `.a1`) é pareado com o `.txt` de
//! mesmo nome no mesmo diretório e convertido de forma independente. Os
//! documentos são processados em paralelo com Rayon (uma tarefa por
//! documento, sem estado compartilhado além da configuração imutável) e os
//! resultados são ordenados pelo caminho do arquivo, então a saída não
//! depende do agendamento das threads.
//!
//! Falhas de um documento (texto ausente, arquivo ilegível, encoding
//! inválido) não interrompem o lote: viram um [`DocumentFailure`] no
//! [`BatchReport`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::ConversionConfig;
use crate::document::DocumentRecord;
use crate::error::{ConvertError, Result};
use crate::pipeline::{Conversion, Converter};
use crate::report::{BatchReport, DocumentFailure};

/// Extensões reconhecidas como arquivos de anotação.
pub const ANNOTATION_EXTENSIONS: [&str; 2] = ["ann", "a1"];

/// Registros de todos os documentos (em ordem de caminho) e o relatório agregado.
#[derive(Debug, Clone, Default)]
pub struct BatchOutput {
    pub records: Vec<DocumentRecord>,
    pub report: BatchReport,
}

pub fn is_standoff_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| ANNOTATION_EXTENSIONS.contains(&e))
}

/// Caminho do `.txt` pareado com um arquivo de anotações.
pub fn text_path_for(annotations: &Path) -> PathBuf {
    annotations.with_extension("txt")
}

/// Identificador do documento: o nome do arquivo sem extensão.
pub fn document_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn read_utf8(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| ConvertError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|e| ConvertError::Encoding {
        path: path.to_path_buf(),
        reason: e.utf8_error().to_string(),
    })
}

/// Lê e converte um único documento.
pub fn convert_document(annotations: &Path, converter: &Converter) -> Result<Conversion> {
    let text_path = text_path_for(annotations);
    let text = match read_utf8(&text_path) {
        Err(ConvertError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            return Err(ConvertError::MissingText {
                annotations: annotations.to_path_buf(),
                text: text_path,
            });
        }
        other => other?,
    };
    let ann = read_utf8(annotations)?;

    let doc_id = document_id(annotations);
    Ok(converter.convert(Some(&doc_id), &text, &ann))
}

/// Converte todos os documentos em paralelo.
pub fn convert_paths(paths: &[PathBuf], config: &ConversionConfig) -> BatchOutput {
    convert_paths_with_progress(paths, config, |_| {})
}

/// Como [`convert_paths`], chamando `on_document` ao fim de cada documento
/// (de qualquer thread do pool).
pub fn convert_paths_with_progress<F>(
    paths: &[PathBuf],
    config: &ConversionConfig,
    on_document: F,
) -> BatchOutput
where
    F: Fn(&Path) + Sync,
{
    let converter = Converter::new(config.clone());

    let mut results: Vec<(&PathBuf, Result<Conversion>)> = paths
        .par_iter()
        .map(|path| {
            let result = convert_document(path, &converter);
            on_document(path);
            (path, result)
        })
        .collect();
    results.sort_by(|a, b| a.0.cmp(b.0));

    let mut output = BatchOutput::default();
    for (path, result) in results {
        match result {
            Ok(conversion) => {
                debug!(
                    path = %path.display(),
                    records = conversion.records.len(),
                    "documento concluído"
                );
                output.records.extend(conversion.records);
                output.report.documents.push(conversion.report);
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "documento ignorado");
                output.report.failures.push(DocumentFailure {
                    document: path.display().to_string(),
                    reason: err.to_string(),
                });
            }
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_path_helpers() {
        assert!(is_standoff_file(Path::new("a/doc.ann")));
        assert!(is_standoff_file(Path::new("a/doc.a1")));
        assert!(!is_standoff_file(Path::new("a/doc.txt")));
        assert_eq!(text_path_for(Path::new("a/doc.a1")), PathBuf::from("a/doc.txt"));
        assert_eq!(document_id(Path::new("a/PMID-123.ann")), "PMID-123");
    }

    #[test]
    fn test_missing_text_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let ann = write(dir.path(), "orphan.ann", "T1\tX 0 1\ta\n");
        let out = convert_paths(&[ann], &ConversionConfig::default());
        assert!(out.records.is_empty());
        assert_eq!(out.report.failures.len(), 1);
        assert!(out.report.failures[0].reason.contains("orphan.txt"));
    }

    #[test]
    fn test_invalid_utf8_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.txt"), [0xff, 0xfe, 0x00]).unwrap();
        let ann = write(dir.path(), "bad.ann", "");
        let out = convert_paths(&[ann], &ConversionConfig::default());
        assert_eq!(out.report.failures.len(), 1);
        assert!(out.report.failures[0].reason.contains("encoding"));
    }

    #[test]
    fn test_output_sorted_by_path() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.txt", "Bravo.");
        write(dir.path(), "a.txt", "Alpha.");
        let b = write(dir.path(), "b.ann", "T1\tX 0 5\tBravo\n");
        let a = write(dir.path(), "a.ann", "T1\tX 0 5\tAlpha\n");

        let config = ConversionConfig {
            include_docid: true,
            ..Default::default()
        };
        let counter = AtomicUsize::new(0);
        let out = convert_paths_with_progress(&[b, a], &config, |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(counter.load(Ordering::SeqCst), 2);
        let ids: Vec<&str> = out.records.iter().filter_map(|r| r.orig_id.as_deref()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(out.report.converted(), 2);
    }
}
