//! # Montagem dos Registros por Sentença
//!
//! Último estágio do pipeline: distribui as entidades alinhadas e suas
//! relações entre as sentenças e emite um [`DocumentRecord`] por sentença,
//! em ordem de documento.
//!
//! - Cada entidade pertence à sentença que contém seu **primeiro** token; os
//!   índices de token são renumerados localmente (subtraindo o primeiro token
//!   global da sentença).
//! - Uma entidade que atravessa o fim da sentença é truncada no último token
//!   dela e gera um aviso [`Issue::Boundary`].
//! - Uma relação só existe se cabeça e cauda sobreviveram e estão na mesma
//!   sentença; caso contrário é descartada e contada.
//!
//! ## Formato de Saída (SpERT)
//!
//! ```json
//! {
//!   "tokens": ["John", "met", "Mary", "."],
//!   "entities": [{"type": "PERSON", "start": 0, "end": 1},
//!                {"type": "PERSON", "start": 2, "end": 3}],
//!   "relations": [{"type": "MET", "head": 0, "tail": 1}],
//!   "orig_id": "doc1"
//! }
//! ```
//!
//! No JSON, `end` é **exclusivo** (convenção do SpERT); em memória,
//! [`RecordEntity`] guarda o par inclusivo `(start_token, end_token)`.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::align::Alignment;
use crate::annotation::RawRelation;
use crate::config::ConversionConfig;
use crate::report::{DocumentReport, Issue};
use crate::sentence::Sentence;
use crate::span::ResolvedEntity;
use crate::tokenizer::Token;

/// Entidade resolvida e alinhada (índices de token globais).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedEntity {
    pub entity: ResolvedEntity,
    pub alignment: Alignment,
}

/// Entidade dentro de um registro (índices locais à sentença, fim inclusivo).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "SpertEntity", from = "SpertEntity")]
pub struct RecordEntity {
    pub label: String,
    pub start_token: usize,
    pub end_token: usize,
    pub char_start: Option<usize>,
    pub char_end: Option<usize>,
}

/// Representação no fio: `end` exclusivo.
#[derive(Serialize, Deserialize)]
struct SpertEntity {
    #[serde(rename = "type")]
    label: String,
    start: usize,
    end: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    char_start: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    char_end: Option<usize>,
}

impl From<RecordEntity> for SpertEntity {
    fn from(e: RecordEntity) -> Self {
        SpertEntity {
            label: e.label,
            start: e.start_token,
            end: e.end_token + 1,
            char_start: e.char_start,
            char_end: e.char_end,
        }
    }
}

impl From<SpertEntity> for RecordEntity {
    fn from(e: SpertEntity) -> Self {
        RecordEntity {
            label: e.label,
            start_token: e.start,
            end_token: e.end.saturating_sub(1).max(e.start),
            char_start: e.char_start,
            char_end: e.char_end,
        }
    }
}

/// Relação dentro de um registro: índices em `entities` do mesmo registro.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordRelation {
    #[serde(rename = "type")]
    pub label: String,
    pub head: usize,
    pub tail: usize,
}

/// Unidade de saída: uma sentença com suas entidades e relações.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub tokens: Vec<String>,
    pub entities: Vec<RecordEntity>,
    pub relations: Vec<RecordRelation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orig_id: Option<String>,
}

/// Índice da sentença que contém o token global `token`.
fn sentence_of(sentences: &[Sentence], token: usize) -> Option<usize> {
    let idx = sentences.partition_point(|s| s.end_token <= token);
    sentences.get(idx).filter(|s| s.contains(token)).map(|_| idx)
}

/// Distribui entidades e relações entre as sentenças.
pub fn assemble(
    doc_id: Option<&str>,
    tokens: &[Token],
    sentences: &[Sentence],
    entities: &[AlignedEntity],
    relations: &[RawRelation],
    config: &ConversionConfig,
    report: &mut DocumentReport,
) -> Vec<DocumentRecord> {
    let orig_id = if config.include_docid {
        doc_id.map(str::to_string)
    } else {
        None
    };

    let mut records: Vec<DocumentRecord> = sentences
        .iter()
        .map(|s| DocumentRecord {
            tokens: tokens[s.range()].iter().map(|t| t.text.clone()).collect(),
            entities: Vec::new(),
            relations: Vec::new(),
            orig_id: orig_id.clone(),
        })
        .collect();

    let mut ordered: Vec<&AlignedEntity> = entities.iter().collect();
    ordered.sort_by(|a, b| {
        (a.alignment.first_token, a.alignment.last_token, &a.entity.id)
            .cmp(&(b.alignment.first_token, b.alignment.last_token, &b.entity.id))
    });

    // id da entidade → (sentença, índice local em `entities`)
    let mut placement: HashMap<&str, (usize, usize)> = HashMap::new();

    for aligned in ordered {
        let Some(s_idx) = sentence_of(sentences, aligned.alignment.first_token) else {
            // O alinhamento sempre produz índices válidos; um token fora das
            // sentenças só ocorreria com um segmentador que viole a partição.
            report.push(Issue::Boundary {
                id: aligned.entity.id.clone(),
            });
            continue;
        };
        let sentence = sentences[s_idx];

        let mut last = aligned.alignment.last_token;
        if last >= sentence.end_token {
            report.push(Issue::Boundary {
                id: aligned.entity.id.clone(),
            });
            last = sentence.end_token - 1;
        }

        let (char_start, char_end) = if config.char_offsets {
            (Some(aligned.entity.span.start), Some(aligned.entity.span.end))
        } else {
            (None, None)
        };

        let record = &mut records[s_idx];
        placement.insert(aligned.entity.id.as_str(), (s_idx, record.entities.len()));
        record.entities.push(RecordEntity {
            label: config.output_label(&aligned.entity.label).to_string(),
            start_token: aligned.alignment.first_token - sentence.start_token,
            end_token: last - sentence.start_token,
            char_start,
            char_end,
        });
    }

    let mut seen: HashSet<(usize, RecordRelation)> = HashSet::new();
    for rel in relations {
        let head = placement.get(rel.head.as_str());
        let tail = placement.get(rel.tail.as_str());
        let (head, tail) = match (head, tail) {
            (Some(h), Some(t)) => (*h, *t),
            (None, _) => {
                report.push(Issue::RelationDropped {
                    id: rel.id.clone(),
                    reason: format!("entidade {} ausente ou descartada", rel.head),
                });
                continue;
            }
            (_, None) => {
                report.push(Issue::RelationDropped {
                    id: rel.id.clone(),
                    reason: format!("entidade {} ausente ou descartada", rel.tail),
                });
                continue;
            }
        };

        if head.0 != tail.0 {
            report.push(Issue::RelationDropped {
                id: rel.id.clone(),
                reason: "cabeça e cauda em sentenças diferentes".to_string(),
            });
            continue;
        }

        let relation = RecordRelation {
            label: rel.label.clone(),
            head: head.1,
            tail: tail.1,
        };
        if !seen.insert((head.0, relation.clone())) {
            report.push(Issue::DuplicateRelation { id: rel.id.clone() });
            continue;
        }
        records[head.0].relations.push(relation);
    }

    report.entities = records.iter().map(|r| r.entities.len()).sum();
    report.relations = records.iter().map(|r| r.relations.len()).sum();
    records
}
