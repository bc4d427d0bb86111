//! Gravação das saídas: JSON do SpERT, CSV de estatísticas e log de erros

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use standoff_core::DocumentRecord;

/// Grava os registros como um array JSON.
pub fn write_records<W: Write>(writer: W, records: &[DocumentRecord], pretty: bool) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    if pretty {
        serde_json::to_writer_pretty(&mut writer, records)?;
    } else {
        serde_json::to_writer(&mut writer, records)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

pub fn write_records_to_file(path: &Path, records: &[DocumentRecord], pretty: bool) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("falha ao criar a saída {}", path.display()))?;
    write_records(file, records, pretty)
        .with_context(|| format!("falha ao gravar {}", path.display()))
}

/// Contagem de relações por tipo, da mais frequente para a menos frequente
/// (empates em ordem alfabética).
pub fn relation_counts(records: &[DocumentRecord]) -> Vec<(String, usize)> {
    let mut counter: HashMap<&str, usize> = HashMap::new();
    for record in records {
        for relation in &record.relations {
            *counter.entry(relation.label.as_str()).or_default() += 1;
        }
    }
    let mut counts: Vec<(String, usize)> = counter
        .into_iter()
        .map(|(label, n)| (label.to_string(), n))
        .collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

/// CSV `type,count`.
pub fn write_stats_csv<W: Write>(mut writer: W, counts: &[(String, usize)]) -> Result<()> {
    writeln!(writer, "type,count")?;
    for (label, n) in counts {
        writeln!(writer, "{},{n}", csv_field(label))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_stats_file(path: &Path, counts: &[(String, usize)]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("falha ao criar {}", path.display()))?;
    write_stats_csv(BufWriter::new(file), counts)
        .with_context(|| format!("falha ao gravar {}", path.display()))
}

/// Uma linha `documento: motivo` por falha.
pub fn write_error_log(path: &Path, lines: &[String]) -> Result<()> {
    let mut file = File::create(path)
        .with_context(|| format!("falha ao criar o log de erros {}", path.display()))?;
    for line in lines {
        writeln!(file, "{line}")?;
    }
    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use standoff_core::RecordRelation;

    fn record(labels: &[&str]) -> DocumentRecord {
        DocumentRecord {
            tokens: vec!["a".into(), "b".into()],
            entities: vec![],
            relations: labels
                .iter()
                .map(|l| RecordRelation {
                    label: l.to_string(),
                    head: 0,
                    tail: 1,
                })
                .collect(),
            orig_id: None,
        }
    }

    #[test]
    fn test_relation_counts_sorted_descending() {
        let records = [record(&["WORKS_AT", "MET"]), record(&["MET", "AGE_OF"])];
        assert_eq!(
            relation_counts(&records),
            vec![
                ("MET".to_string(), 2),
                ("AGE_OF".to_string(), 1),
                ("WORKS_AT".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_stats_csv_format() {
        let mut buf = Vec::new();
        write_stats_csv(&mut buf, &[("MET".into(), 2), ("A,B".into(), 1)]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "type,count\nMET,2\n\"A,B\",1\n");
    }

    #[test]
    fn test_write_records_compact() {
        let mut buf = Vec::new();
        write_records(&mut buf, &[record(&[])], false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("[{\"tokens\":[\"a\",\"b\"]"));
        assert!(text.ends_with("]\n"));
    }
}
