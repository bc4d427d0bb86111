//! # Relatório de Conversão
//!
//! Nada é descartado em silêncio: cada anotação rejeitada, filtrada,
//! expandida ou desalinhada, e cada relação perdida, vira um [`Issue`] no
//! [`DocumentReport`] do documento. O [`BatchReport`] agrega os relatórios de
//! todos os documentos e as falhas fatais por documento (`documento, motivo`),
//! que formam a superfície de erro visível ao usuário.

use serde::{Deserialize, Serialize};

use crate::align::AlignmentFailure;
use crate::error::ParseError;

/// Um aviso ou descarte registrado durante a conversão de um documento.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Issue {
    /// Linha malformada no `.ann`.
    Parse { line: usize, reason: String },
    /// Anotação descontínua rejeitada pela regra `discard`.
    Rejected { id: String },
    /// Entidade removida pelos filtros de tipo.
    Filtered { id: String, label: String },
    /// Entidade descartada pela regra de sobreposição.
    Overlap { id: String },
    /// Span expandido até a borda do token.
    AlignmentExpanded { id: String },
    /// Entidade sem nenhum token correspondente (descartada).
    AlignmentFailed { id: String, reason: AlignmentFailure },
    /// Texto literal da anotação difere do texto do span calculado.
    Consistency { id: String, expected: String, found: String },
    /// Relação descartada (entidade ausente, descartada ou em outra sentença).
    RelationDropped { id: String, reason: String },
    /// Relação repetida (mesmo tipo, cabeça e cauda).
    DuplicateRelation { id: String },
    /// Entidade atravessa o fim da sentença onde começa (foi truncada nela).
    Boundary { id: String },
}

impl From<&ParseError> for Issue {
    fn from(err: &ParseError) -> Self {
        Issue::Parse {
            line: err.line,
            reason: err.reason.clone(),
        }
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Issue::Parse { line, reason } => write!(f, "linha {line} ignorada: {reason}"),
            Issue::Rejected { id } => write!(f, "{id}: anotação descontínua rejeitada"),
            Issue::Filtered { id, label } => write!(f, "{id}: tipo '{label}' filtrado"),
            Issue::Overlap { id } => write!(f, "{id}: descartada por sobreposição"),
            Issue::AlignmentExpanded { id } => write!(f, "{id}: span expandido até a borda do token"),
            Issue::AlignmentFailed { id, reason } => write!(f, "{id}: alinhamento falhou ({reason})"),
            Issue::Consistency { id, expected, found } => {
                write!(f, "{id}: texto anotado '{expected}' difere do texto '{found}'")
            }
            Issue::RelationDropped { id, reason } => write!(f, "{id}: relação descartada ({reason})"),
            Issue::DuplicateRelation { id } => write!(f, "{id}: relação duplicada"),
            Issue::Boundary { id } => write!(f, "{id}: entidade atravessa fronteira de sentença"),
        }
    }
}

/// Contadores e avisos de um documento.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentReport {
    pub document: Option<String>,
    pub tokens: usize,
    pub sentences: usize,
    /// Entidades emitidas na saída
    pub entities: usize,
    /// Relações emitidas na saída
    pub relations: usize,
    /// Linhas de tipos não convertidos (eventos, atributos, notas...)
    pub ignored_lines: usize,
    /// Anotações descontínuas resolvidas para um span contíguo
    pub discontinuous_resolved: usize,
    pub issues: Vec<Issue>,
}

/// Visão resumida dos avisos por categoria.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCounts {
    pub parse_errors: usize,
    pub rejected: usize,
    pub filtered: usize,
    pub overlap_dropped: usize,
    pub alignment_expanded: usize,
    pub alignment_failed: usize,
    pub consistency: usize,
    pub relations_dropped: usize,
    pub duplicate_relations: usize,
    pub boundary_violations: usize,
}

impl IssueCounts {
    fn add(&mut self, other: &IssueCounts) {
        self.parse_errors += other.parse_errors;
        self.rejected += other.rejected;
        self.filtered += other.filtered;
        self.overlap_dropped += other.overlap_dropped;
        self.alignment_expanded += other.alignment_expanded;
        self.alignment_failed += other.alignment_failed;
        self.consistency += other.consistency;
        self.relations_dropped += other.relations_dropped;
        self.duplicate_relations += other.duplicate_relations;
        self.boundary_violations += other.boundary_violations;
    }
}

impl DocumentReport {
    pub fn new(document: Option<String>) -> Self {
        Self {
            document,
            ..Default::default()
        }
    }

    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn counts(&self) -> IssueCounts {
        let mut c = IssueCounts::default();
        for issue in &self.issues {
            match issue {
                Issue::Parse { .. } => c.parse_errors += 1,
                Issue::Rejected { .. } => c.rejected += 1,
                Issue::Filtered { .. } => c.filtered += 1,
                Issue::Overlap { .. } => c.overlap_dropped += 1,
                Issue::AlignmentExpanded { .. } => c.alignment_expanded += 1,
                Issue::AlignmentFailed { .. } => c.alignment_failed += 1,
                Issue::Consistency { .. } => c.consistency += 1,
                Issue::RelationDropped { .. } => c.relations_dropped += 1,
                Issue::DuplicateRelation { .. } => c.duplicate_relations += 1,
                Issue::Boundary { .. } => c.boundary_violations += 1,
            }
        }
        c
    }
}

/// Falha fatal de um documento (o documento foi pulado).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFailure {
    pub document: String,
    pub reason: String,
}

/// Agregado de uma execução em lote.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub documents: Vec<DocumentReport>,
    pub failures: Vec<DocumentFailure>,
}

impl BatchReport {
    /// Documentos convertidos com sucesso.
    pub fn converted(&self) -> usize {
        self.documents.len()
    }

    pub fn totals(&self) -> IssueCounts {
        let mut total = IssueCounts::default();
        for doc in &self.documents {
            total.add(&doc.counts());
        }
        total
    }

    /// Linhas `documento: motivo` para o log de erros.
    pub fn error_lines(&self) -> Vec<String> {
        self.failures
            .iter()
            .map(|f| format!("{}: {}", f.document, f.reason))
            .collect()
    }
}
