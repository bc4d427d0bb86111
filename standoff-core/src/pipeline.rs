//! # Pipeline de Conversão: Orquestrador com Eventos Observáveis
//!
//! O pipeline coordena todos os estágios (normalização, tokenização,
//! segmentação, resolução de spans e sobreposições, alinhamento e montagem)
//! e emite um evento a cada passo via um canal Rust (`mpsc`), permitindo que
//! o servidor WebSocket transmita o progresso em tempo real para o cliente.
//!
//! ```text
//! texto ──► normalize ──► tokenize ──► segment ─────────────┐
//!                                                          ▼
//! .ann ──► parse ──► span (descontínuos) ──► filtro de tipos ──► overlap ──► align ──► assemble
//! ```
//!
//! Cada estágio consome a saída imutável do anterior; a configuração é um
//! único valor imutável compartilhado por referência.

use std::sync::mpsc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::align::{align, AlignmentFailure, TokenIndex};
use crate::annotation::{parse_annotations, CharRange, TextBound};
use crate::config::ConversionConfig;
use crate::document::{assemble, AlignedEntity, DocumentRecord};
use crate::normalize::{normalize, Normalized};
use crate::overlap::resolve_overlaps;
use crate::report::{DocumentReport, Issue};
use crate::sentence::{NoSplit, RuleBasedSplitter, Sentence, SentenceSplitter};
use crate::span::resolve_discontinuous;
use crate::tokenizer::{tokenize, Token};

/// Eventos emitidos pelo pipeline durante a conversão de um documento.
///
/// Permitem que a UI visualize cada decisão do conversor passo a passo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PipelineEvent {
    /// **Passo 1**: Texto normalizado.
    Normalized {
        asciified: bool,
        original_chars: usize,
        normalized_bytes: usize,
    },
    /// **Passo 2**: Tokenização concluída.
    TokenizationDone { tokens: Vec<Token>, total: usize },
    /// **Passo 3**: Sentenças delimitadas (intervalos de token).
    SentencesSegmented { sentences: Vec<Sentence> },
    /// **Passo 4**: Arquivo de anotações interpretado.
    AnnotationsParsed {
        text_bounds: usize,
        relations: usize,
        errors: usize,
        ignored: usize,
    },
    /// **Passo 5**: Uma anotação foi reduzida a um span contíguo (`None` = rejeitada).
    SpanResolved {
        id: String,
        fragments: Vec<CharRange>,
        span: Option<CharRange>,
    },
    /// **Passo 6**: Sobreposições resolvidas.
    OverlapResolved { kept: Vec<String>, dropped: Vec<String> },
    /// **Passo 7**: Uma entidade foi alinhada aos tokens.
    EntityAligned {
        id: String,
        label: String,
        first_token: usize,
        last_token: usize,
        expanded: bool,
    },
    /// Um aviso foi registrado no relatório.
    Warning { issue: Issue },
    /// **Conclusão**: registros por sentença e relatório final.
    Done {
        records: Vec<DocumentRecord>,
        report: DocumentReport,
        processing_ms: u64,
    },
}

/// Resultado da conversão de um documento.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversion {
    pub records: Vec<DocumentRecord>,
    pub report: DocumentReport,
}

/// O conversor principal.
///
/// Guarda a configuração e o segmentador escolhidos uma única vez; pode ser
/// compartilhado entre threads (o lote usa uma instância para todos os
/// documentos).
///
/// # Modos de Uso
/// - **Sync**: [`Converter::convert`] para o lote e chamadas diretas.
/// - **Streaming**: [`Converter::convert_streaming`] para UIs reativas (via WebSocket).
pub struct Converter {
    config: ConversionConfig,
    splitter: Box<dyn SentenceSplitter + Send + Sync>,
}

impl Converter {
    pub fn new(config: ConversionConfig) -> Self {
        let splitter: Box<dyn SentenceSplitter + Send + Sync> = if config.sentence_split {
            Box::new(RuleBasedSplitter::new())
        } else {
            Box::new(NoSplit)
        };
        Self { config, splitter }
    }

    /// Substitui o segmentador de sentenças.
    pub fn with_splitter<S>(mut self, splitter: S) -> Self
    where
        S: SentenceSplitter + Send + Sync + 'static,
    {
        self.splitter = Box::new(splitter);
        self
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Converte um documento de forma síncrona, sem montar eventos.
    pub fn convert(&self, doc_id: Option<&str>, text: &str, annotations: &str) -> Conversion {
        self.run(doc_id, text, annotations, &Events(None))
    }

    /// Executa a conversão enviando eventos de progresso pelo canal `tx`.
    ///
    /// # Fluxo de Eventos
    /// 1. `Normalized`, `TokenizationDone`, `SentencesSegmented`.
    /// 2. `AnnotationsParsed`.
    /// 3. `SpanResolved` (uma por text-bound).
    /// 4. `OverlapResolved`.
    /// 5. `EntityAligned` (uma por entidade alinhada).
    /// 6. `Done`.
    ///
    /// `Warning` pode aparecer entre quaisquer passos.
    pub fn convert_streaming(
        &self,
        doc_id: Option<&str>,
        text: &str,
        annotations: &str,
        tx: mpsc::Sender<PipelineEvent>,
    ) {
        let start = Instant::now();
        let Conversion { records, report } =
            self.run(doc_id, text, annotations, &Events(Some(&tx)));
        let _ = tx.send(PipelineEvent::Done {
            records,
            report,
            processing_ms: start.elapsed().as_millis() as u64,
        });
    }

    fn run(
        &self,
        doc_id: Option<&str>,
        text: &str,
        annotations: &str,
        events: &Events<'_>,
    ) -> Conversion {
        let config = &self.config;
        let mut report = DocumentReport::new(doc_id.map(str::to_string));

        // === Passo 1: Normalização ===
        let original = normalize(text, false);
        let asciified = config.asciify.then(|| normalize(text, true));
        let normalized = asciified.as_ref().unwrap_or(&original);
        events.emit(|| PipelineEvent::Normalized {
            asciified: config.asciify,
            original_chars: normalized.original_len(),
            normalized_bytes: normalized.text.len(),
        });

        // === Passo 2: Tokenização ===
        let tokens: Vec<Token> = tokenize(&normalized.text, config.tokenization).collect();
        debug!(doc = ?doc_id, tokens = tokens.len(), policy = %config.tokenization, "tokenização");
        events.emit(|| PipelineEvent::TokenizationDone {
            tokens: tokens.clone(),
            total: tokens.len(),
        });

        // === Passo 3: Sentenças ===
        let sentences = self.splitter.split(&normalized.text, &tokens);
        debug!(doc = ?doc_id, sentences = sentences.len(), "segmentação");
        events.emit(|| PipelineEvent::SentencesSegmented {
            sentences: sentences.clone(),
        });

        // === Passo 4: Anotações ===
        let parsed = parse_annotations(annotations);
        report.ignored_lines = parsed.ignored;
        events.emit(|| PipelineEvent::AnnotationsParsed {
            text_bounds: parsed.text_bounds.len(),
            relations: parsed.relations.len(),
            errors: parsed.errors.len(),
            ignored: parsed.ignored,
        });
        for err in &parsed.errors {
            warn_issue(&mut report, events, Issue::from(err));
        }

        for tb in &parsed.text_bounds {
            if let Some(issue) = check_consistency(tb, &original) {
                warn_issue(&mut report, events, issue);
            }
        }

        // === Passo 5: Descontínuos e filtro de tipos ===
        let mut resolved = Vec::with_capacity(parsed.text_bounds.len());
        for tb in &parsed.text_bounds {
            let entity = resolve_discontinuous(tb, config.discont_rule);
            events.emit(|| PipelineEvent::SpanResolved {
                id: tb.id.clone(),
                fragments: tb.fragments.clone(),
                span: entity.as_ref().map(|e| e.span),
            });

            let Some(entity) = entity else {
                warn_issue(&mut report, events, Issue::Rejected { id: tb.id.clone() });
                continue;
            };
            if entity.was_discontinuous() {
                report.discontinuous_resolved += 1;
            }
            if !config.accepts_label(&entity.label) {
                warn_issue(
                    &mut report,
                    events,
                    Issue::Filtered {
                        id: entity.id,
                        label: entity.label,
                    },
                );
                continue;
            }
            // Offsets além do texto não disputam sobreposição
            if normalized.char_span_to_bytes(entity.span).is_none() {
                warn_issue(
                    &mut report,
                    events,
                    Issue::AlignmentFailed {
                        id: entity.id,
                        reason: AlignmentFailure::OutOfBounds,
                    },
                );
                continue;
            }
            resolved.push(entity);
        }

        // === Passo 6: Sobreposições ===
        let outcome = resolve_overlaps(&resolved, config.overlap_rule);
        debug!(
            doc = ?doc_id,
            kept = outcome.kept.len(),
            dropped = outcome.dropped.len(),
            rule = %config.overlap_rule,
            "sobreposições"
        );
        events.emit(|| PipelineEvent::OverlapResolved {
            kept: outcome.kept.iter().map(|e| e.id.clone()).collect(),
            dropped: outcome.dropped.iter().map(|e| e.id.clone()).collect(),
        });
        for e in &outcome.dropped {
            warn_issue(&mut report, events, Issue::Overlap { id: e.id.clone() });
        }

        // === Passo 7: Alinhamento ===
        let index = TokenIndex::new(&tokens);
        let mut aligned = Vec::with_capacity(outcome.kept.len());
        for entity in outcome.kept {
            let result = normalized
                .char_span_to_bytes(entity.span)
                .ok_or(AlignmentFailure::OutOfBounds)
                .and_then(|bytes| align(bytes, &index));
            match result {
                Ok(alignment) => {
                    if alignment.expanded {
                        warn_issue(
                            &mut report,
                            events,
                            Issue::AlignmentExpanded {
                                id: entity.id.clone(),
                            },
                        );
                    }
                    events.emit(|| PipelineEvent::EntityAligned {
                        id: entity.id.clone(),
                        label: entity.label.clone(),
                        first_token: alignment.first_token,
                        last_token: alignment.last_token,
                        expanded: alignment.expanded,
                    });
                    aligned.push(AlignedEntity { entity, alignment });
                }
                Err(reason) => warn_issue(
                    &mut report,
                    events,
                    Issue::AlignmentFailed {
                        id: entity.id,
                        reason,
                    },
                ),
            }
        }

        // === Passo 8: Montagem ===
        let issues_before = report.issues.len();
        let records = assemble(
            doc_id,
            &tokens,
            &sentences,
            &aligned,
            &parsed.relations,
            config,
            &mut report,
        );
        for issue in &report.issues[issues_before..] {
            events.emit(|| PipelineEvent::Warning {
                issue: issue.clone(),
            });
        }
        report.tokens = tokens.len();
        report.sentences = sentences.len();

        debug!(
            doc = ?doc_id,
            records = records.len(),
            entities = report.entities,
            relations = report.relations,
            issues = report.issues.len(),
            "documento convertido"
        );

        Conversion { records, report }
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ConversionConfig::default())
    }
}

/// Destino dos eventos. Sem canal, os payloads nem chegam a ser montados.
struct Events<'a>(Option<&'a mpsc::Sender<PipelineEvent>>);

impl Events<'_> {
    fn emit(&self, event: impl FnOnce() -> PipelineEvent) {
        if let Some(tx) = self.0 {
            let _ = tx.send(event());
        }
    }
}

fn warn_issue(report: &mut DocumentReport, events: &Events<'_>, issue: Issue) {
    events.emit(|| PipelineEvent::Warning {
        issue: issue.clone(),
    });
    report.push(issue);
}

/// Compara o texto literal da anotação com o texto dos seus fragmentos.
///
/// A comparação é feita por sequência de palavras (separadas por espaço em
/// branco), com os fragmentos unidos por um espaço. Fragmentos fora do texto
/// são ignorados aqui; o alinhamento os reporta.
fn check_consistency(tb: &TextBound, original: &Normalized) -> Option<Issue> {
    let expected = tb.text.as_deref()?;
    let mut pieces = Vec::with_capacity(tb.fragments.len());
    for fragment in &tb.fragments {
        let (start, end) = original.char_span_to_bytes(*fragment)?;
        pieces.push(&original.text[start..end]);
    }
    let found = pieces.join(" ");

    if expected.split_whitespace().eq(found.split_whitespace()) {
        None
    } else {
        Some(Issue::Consistency {
            id: tb.id.clone(),
            expected: expected.to_string(),
            found,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlap::OverlapRule;
    use crate::span::DiscontRule;

    const TEXT: &str = "John met Mary.";
    const ANN: &str = "T1\tPERSON 0 4\tJohn\nT2\tPERSON 9 13\tMary\nR1\tMET Arg1:T1 Arg2:T2\n";

    #[test]
    fn test_basic_conversion() {
        let out = Converter::default().convert(Some("doc1"), TEXT, ANN);
        assert_eq!(out.records.len(), 1);
        let record = &out.records[0];
        assert_eq!(record.tokens, ["John", "met", "Mary", "."]);
        assert_eq!(record.entities.len(), 2);
        assert_eq!((record.entities[1].start_token, record.entities[1].end_token), (2, 2));
        assert_eq!(record.relations.len(), 1);
        assert_eq!((record.relations[0].head, record.relations[0].tail), (0, 1));
        assert!(out.report.issues.is_empty());
    }

    #[test]
    fn test_empty_document() {
        let out = Converter::default().convert(None, "", "");
        assert!(out.records.is_empty());
        assert_eq!(out.report.tokens, 0);
    }

    #[test]
    fn test_events_streaming_order() {
        let (tx, rx) = mpsc::channel();
        Converter::default().convert_streaming(Some("doc1"), TEXT, ANN, tx);
        let events: Vec<PipelineEvent> = rx.try_iter().collect();

        assert!(
            matches!(&events[0], PipelineEvent::Normalized { .. }),
            "Primeiro evento deve ser Normalized"
        );
        assert!(
            matches!(events.last(), Some(PipelineEvent::Done { .. })),
            "Último evento deve ser Done"
        );
        let aligned = events
            .iter()
            .filter(|e| matches!(e, PipelineEvent::EntityAligned { .. }))
            .count();
        assert_eq!(aligned, 2);
    }

    #[test]
    fn test_consistency_warning_is_not_fatal() {
        let ann = "T1\tPERSON 0 4\tJohnny\n";
        let out = Converter::default().convert(None, TEXT, ann);
        assert_eq!(out.report.counts().consistency, 1);
        assert_eq!(out.records[0].entities.len(), 1);
    }

    #[test]
    fn test_discontinuous_consistency_joins_fragments() {
        let text = "lung (minor) cancer";
        let ann = "T1\tDISEASE 0 4;13 19\tlung cancer\n";
        let out = Converter::default().convert(None, text, ann);
        assert_eq!(out.report.counts().consistency, 0);
        assert_eq!(out.report.discontinuous_resolved, 1);
        let e = &out.records[0].entities[0];
        assert_eq!((e.start_token, e.end_token), (0, 4));
    }

    #[test]
    fn test_discard_drops_relations() {
        let text = "lung (minor) cancer kills";
        let ann = "T1\tDISEASE 0 4;13 19\tlung cancer\nT2\tEVENT 20 25\tkills\nR1\tCAUSE Arg1:T1 Arg2:T2\n";
        let config = ConversionConfig {
            discont_rule: DiscontRule::Discard,
            ..Default::default()
        };
        let out = Converter::new(config).convert(None, text, ann);
        let counts = out.report.counts();
        assert_eq!(counts.rejected, 1);
        assert_eq!(counts.relations_dropped, 1);
        assert_eq!(out.records[0].entities.len(), 1);
    }

    #[test]
    fn test_type_filter_and_singletype() {
        let ann = "T1\tPERSON 0 4\tJohn\nT2\tORG 9 13\tMary\n";
        let config = ConversionConfig {
            type_exclude: Some(vec!["ORG".into()]),
            singletype: Some("ENTITY".into()),
            ..Default::default()
        };
        let out = Converter::new(config).convert(None, TEXT, ann);
        assert_eq!(out.report.counts().filtered, 1);
        let labels: Vec<&str> = out.records[0].entities.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["ENTITY"]);
    }

    #[test]
    fn test_out_of_bounds_offsets() {
        let ann = "T1\tPERSON 10 40\tfoo\n";
        let out = Converter::default().convert(None, TEXT, ann);
        assert_eq!(
            out.report.issues,
            vec![Issue::AlignmentFailed {
                id: "T1".into(),
                reason: AlignmentFailure::OutOfBounds,
            }]
        );
    }

    #[test]
    fn test_out_of_bounds_entity_does_not_win_overlap() {
        let ann = "T1\tPERSON 0 4\tJohn\nT2\tJUNK 0 400\tJohn\n";
        let out = Converter::default().convert(None, TEXT, ann);
        assert_eq!(out.records[0].entities.len(), 1);
        assert_eq!(out.records[0].entities[0].label, "PERSON");
        assert_eq!(out.report.counts().overlap_dropped, 0);
        assert_eq!(
            out.report.issues,
            vec![Issue::AlignmentFailed {
                id: "T2".into(),
                reason: AlignmentFailure::OutOfBounds,
            }]
        );
    }

    #[test]
    fn test_sync_matches_streaming_result() {
        let ann = "T1\tPERSON 0 4\tJohnny\nT2\tPERSON 0 8\tJohn met\n";
        let sync = Converter::default().convert(Some("doc1"), TEXT, ann);

        let (tx, rx) = mpsc::channel();
        Converter::default().convert_streaming(Some("doc1"), TEXT, ann, tx);
        let Some(PipelineEvent::Done { records, report, .. }) = rx.try_iter().last() else {
            panic!("streaming deve terminar com Done");
        };
        assert_eq!(sync.records, records);
        assert_eq!(sync.report, report);
    }

    #[test]
    fn test_asciify_keeps_original_char_offsets() {
        let text = "Café Müller";
        let ann = "T1\tPERSON 5 11\tMüller\n";
        let config = ConversionConfig {
            asciify: true,
            char_offsets: true,
            ..Default::default()
        };
        let out = Converter::new(config).convert(None, text, ann);
        let record = &out.records[0];
        assert_eq!(record.tokens, ["Cafe", "Muller"]);
        assert_eq!(record.entities[0].start_token, 1);
        assert_eq!(record.entities[0].char_start, Some(5));
        assert_eq!(record.entities[0].char_end, Some(11));
    }

    #[test]
    fn test_keep_all_allows_overlapping_entities() {
        let ann = "T1\tPERSON 0 4\tJohn\nT2\tPHRASE 0 8\tJohn met\n";
        let config = ConversionConfig {
            overlap_rule: OverlapRule::KeepAll,
            ..Default::default()
        };
        let out = Converter::new(config).convert(None, TEXT, ann);
        assert_eq!(out.records[0].entities.len(), 2);
        assert_eq!(out.report.counts().overlap_dropped, 0);
    }

    #[test]
    fn test_no_sentence_split() {
        let text = "John slept. Mary ran.";
        let split = Converter::default().convert(None, text, "");
        assert_eq!(split.records.len(), 2);

        let config = ConversionConfig {
            sentence_split: false,
            ..Default::default()
        };
        let single = Converter::new(config).convert(None, text, "");
        assert_eq!(single.records.len(), 1);
    }
}
