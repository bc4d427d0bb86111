//! # Leitura de Anotações Standoff (formato brat)
//!
//! O arquivo `.ann` é orientado a linhas, com campos separados por TAB:
//!
//! ```text
//! T1	PERSON 0 4	John
//! T2	DISEASE 0 4;10 14	lung cancer
//! R1	MET Arg1:T1 Arg2:T3
//! #1	AnnotatorNotes T1	comentário livre
//! ```
//!
//! - **T** (text-bound): identificador, tipo, um ou mais intervalos
//!   `início fim` separados por `;` (anotação **descontínua** quando há mais
//!   de um) e o texto literal anotado.
//! - **R** (relação): tipo e dois argumentos, `Arg1` (cabeça) e `Arg2` (cauda).
//! - **E, A, M, N, #, \***: eventos, atributos, normalizações, notas e
//!   equivalências. São reconhecidos e ignorados (contados em `ignored`).
//!
//! Os offsets são índices de **caractere** (não de byte) no texto original.
//! Uma linha malformada gera um [`ParseError`] apenas para ela; as demais
//! anotações continuam válidas.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// Intervalo semiaberto `[start, end)` em offsets de caractere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CharRange {
    pub start: usize,
    pub end: usize,
}

impl CharRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Dois intervalos conflitam se compartilham ao menos um caractere.
    /// Intervalos vazios nunca conflitam.
    pub fn intersects(&self, other: &CharRange) -> bool {
        !self.is_empty() && !other.is_empty() && self.start < other.end && other.start < self.end
    }
}

/// Anotação text-bound (linha `T`), imutável após o parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBound {
    pub id: String,
    pub label: String,
    /// Fragmentos ordenados por início e sem sobreposição entre si.
    pub fragments: Vec<CharRange>,
    /// Texto literal gravado pelo anotador (usado só para validação).
    pub text: Option<String>,
}

impl TextBound {
    pub fn is_discontinuous(&self) -> bool {
        self.fragments.len() > 1
    }
}

/// Relação binária entre duas anotações (linha `R`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRelation {
    pub id: String,
    pub label: String,
    /// Identificador da entidade `Arg1`
    pub head: String,
    /// Identificador da entidade `Arg2`
    pub tail: String,
}

/// Resultado do parse de um arquivo de anotações.
#[derive(Debug, Clone, Default)]
pub struct AnnotationSet {
    /// Text-bounds na ordem do arquivo
    pub text_bounds: Vec<TextBound>,
    /// Relações na ordem do arquivo
    pub relations: Vec<RawRelation>,
    /// Linhas descartadas por erro de formato
    pub errors: Vec<ParseError>,
    /// Linhas de tipos reconhecidos mas não convertidos (E, A, N, #, ...)
    pub ignored: usize,
}

/// Interpreta o conteúdo completo de um arquivo `.ann`.
pub fn parse_annotations(source: &str) -> AnnotationSet {
    let mut set = AnnotationSet::default();
    let mut seen_ids: HashSet<String> = HashSet::new();

    for (i, raw_line) in source.lines().enumerate() {
        let line_no = i + 1;
        let line = raw_line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            continue;
        }

        let parsed = match line.chars().next() {
            Some('T') => parse_text_bound(line, line_no).map(Parsed::TextBound),
            Some('R') => parse_relation(line, line_no).map(Parsed::Relation),
            Some('E' | 'A' | 'M' | 'N' | '#' | '*') => Ok(Parsed::Ignored),
            _ => Err(ParseError::new(line_no, "tipo de anotação desconhecido")),
        };

        match parsed {
            Ok(Parsed::TextBound(tb)) => {
                if !seen_ids.insert(tb.id.clone()) {
                    set.errors
                        .push(ParseError::new(line_no, format!("identificador duplicado '{}'", tb.id)));
                } else {
                    set.text_bounds.push(tb);
                }
            }
            Ok(Parsed::Relation(rel)) => {
                if !seen_ids.insert(rel.id.clone()) {
                    set.errors
                        .push(ParseError::new(line_no, format!("identificador duplicado '{}'", rel.id)));
                } else {
                    set.relations.push(rel);
                }
            }
            Ok(Parsed::Ignored) => set.ignored += 1,
            Err(e) => set.errors.push(e),
        }
    }

    set
}

enum Parsed {
    TextBound(TextBound),
    Relation(RawRelation),
    Ignored,
}

fn parse_text_bound(line: &str, line_no: usize) -> Result<TextBound, ParseError> {
    let mut fields = line.splitn(3, '\t');
    let id = fields.next().unwrap_or_default().trim();
    let body = fields
        .next()
        .ok_or_else(|| ParseError::new(line_no, "text-bound sem tipo e offsets"))?;
    let text = fields.next().map(str::to_string);

    if id.len() < 2 {
        return Err(ParseError::new(line_no, format!("identificador inválido '{id}'")));
    }

    let (label, offsets) = body
        .trim()
        .split_once(' ')
        .ok_or_else(|| ParseError::new(line_no, format!("text-bound sem offsets: '{body}'")))?;

    let mut fragments = Vec::new();
    for fragment in offsets.split(';') {
        let mut parts = fragment.split_whitespace();
        let (Some(s), Some(e), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(ParseError::new(
                line_no,
                format!("fragmento malformado '{}'", fragment.trim()),
            ));
        };
        let start = parse_offset(s, line_no)?;
        let end = parse_offset(e, line_no)?;
        if start > end {
            return Err(ParseError::new(
                line_no,
                format!("fragmento invertido {start} > {end}"),
            ));
        }
        fragments.push(CharRange::new(start, end));
    }

    fragments.sort();
    let mut solid = fragments.iter().filter(|f| !f.is_empty());
    let overlapping = solid.next().is_some_and(|first| {
        let mut reach = first.end;
        solid.any(|f| {
            let clash = f.start < reach;
            reach = reach.max(f.end);
            clash
        })
    });
    if overlapping {
        return Err(ParseError::new(line_no, "fragmentos sobrepostos na mesma anotação"));
    }

    Ok(TextBound {
        id: id.to_string(),
        label: label.to_string(),
        fragments,
        text,
    })
}

fn parse_offset(s: &str, line_no: usize) -> Result<usize, ParseError> {
    s.parse::<usize>()
        .map_err(|_| ParseError::new(line_no, format!("offset inválido '{s}'")))
}

fn parse_relation(line: &str, line_no: usize) -> Result<RawRelation, ParseError> {
    let mut fields = line.split('\t');
    let id = fields.next().unwrap_or_default().trim();
    let body = fields
        .next()
        .ok_or_else(|| ParseError::new(line_no, "relação sem corpo"))?;

    let mut parts = body.split_whitespace();
    let label = parts
        .next()
        .ok_or_else(|| ParseError::new(line_no, "relação sem tipo"))?;

    let mut head = None;
    let mut tail = None;
    for arg in parts {
        match arg.split_once(':') {
            Some(("Arg1", target)) if !target.is_empty() => head = Some(target),
            Some(("Arg2", target)) if !target.is_empty() => tail = Some(target),
            _ => {
                return Err(ParseError::new(
                    line_no,
                    format!("argumento de relação inválido '{arg}'"),
                ))
            }
        }
    }

    match (head, tail) {
        (Some(head), Some(tail)) => Ok(RawRelation {
            id: id.to_string(),
            label: label.to_string(),
            head: head.to_string(),
            tail: tail.to_string(),
        }),
        _ => Err(ParseError::new(line_no, "relação precisa de Arg1 e Arg2")),
    }
}
