//! # Segmentação de Sentenças
//!
//! Agrupa a sequência de tokens de um documento em sentenças. A única
//! garantia exigida de qualquer segmentador é a de **partição exata**: as
//! sentenças, concatenadas em ordem, reproduzem a sequência completa de
//! tokens, sem lacunas e sem sobreposição.
//!
//! A heurística de detecção de fronteiras é substituível (trait
//! [`SentenceSplitter`]). Implementações incluídas:
//!
//! - [`RuleBasedSplitter`]: fronteiras candidatas do algoritmo Unicode UAX #29
//!   (que já quebra após quebras de linha), suprimindo as que seguem uma
//!   abreviação conhecida ("Dr.", "e.g.") ou uma inicial ("J.").
//! - [`NoSplit`]: o documento inteiro é uma única sentença.
//!
//! As fronteiras são calculadas em offsets de byte do texto e depois
//! "encaixadas" nos tokens: cada token pertence ao segmento que contém seu
//! início. Isso garante a partição mesmo quando uma fronteira cai no meio de
//! um token.

use std::collections::HashSet;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::tokenizer::Token;

/// Fatia contígua `[start_token, end_token)` da sequência de tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub start_token: usize,
    pub end_token: usize,
}

impl Sentence {
    pub fn len(&self) -> usize {
        self.end_token - self.start_token
    }

    pub fn is_empty(&self) -> bool {
        self.end_token == self.start_token
    }

    pub fn contains(&self, token: usize) -> bool {
        (self.start_token..self.end_token).contains(&token)
    }

    pub fn range(&self) -> Range<usize> {
        self.start_token..self.end_token
    }
}

/// Estratégia de segmentação.
pub trait SentenceSplitter {
    /// Particiona `tokens` (extraídos de `text`) em sentenças.
    fn split(&self, text: &str, tokens: &[Token]) -> Vec<Sentence>;
}

/// Sem segmentação: uma única sentença com todos os tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSplit;

impl SentenceSplitter for NoSplit {
    fn split(&self, _text: &str, tokens: &[Token]) -> Vec<Sentence> {
        if tokens.is_empty() {
            return Vec::new();
        }
        vec![Sentence {
            start_token: 0,
            end_token: tokens.len(),
        }]
    }
}

/// Abreviações que não encerram sentença (comparadas em minúsculas, sem o ponto final)
const ABBREVIATIONS: &[&str] = &[
    "dr", "dra", "mr", "mrs", "ms", "prof", "profa", "sr", "sra", "jr", "vs", "etc",
    "approx", "dept", "inc", "ltd", "corp", "cf", "pág", "e.g", "i.e",
];

/// Abreviações que também são palavras comuns: só suprimem a fronteira
/// quando o próximo segmento começa com um número ("No. 5", "Fig. 3").
const NUMBERED_ABBREVIATIONS: &[&str] = &[
    "no", "nos", "vol", "fig", "figs", "eq", "eqs", "ref", "refs", "ca", "pp",
];

/// Segmentador baseado em regras (UAX #29 + supressão de abreviações).
#[derive(Debug, Clone)]
pub struct RuleBasedSplitter {
    abbreviations: HashSet<&'static str>,
    numbered: HashSet<&'static str>,
}

impl RuleBasedSplitter {
    pub fn new() -> Self {
        Self {
            abbreviations: ABBREVIATIONS.iter().copied().collect(),
            numbered: NUMBERED_ABBREVIATIONS.iter().copied().collect(),
        }
    }

    /// Offsets de byte onde uma nova sentença começa (exceto o 0), em ordem.
    pub fn boundaries(&self, text: &str) -> Vec<usize> {
        let segments: Vec<(usize, &str)> = text.split_sentence_bound_indices().collect();
        segments
            .windows(2)
            .filter(|pair| !self.is_suppressed(pair[0].1, pair[1].1))
            .map(|pair| pair[1].0)
            .collect()
    }

    /// Uma fronteira é suprimida quando o segmento anterior termina em
    /// abreviação ou inicial. Quebras de linha nunca são suprimidas.
    fn is_suppressed(&self, previous: &str, next: &str) -> bool {
        let without_spaces = previous.trim_end_matches([' ', '\t']);
        if without_spaces.ends_with(['\n', '\r', '\u{2029}', '\u{2028}']) {
            return false;
        }
        let trimmed = without_spaces.trim_end();
        let Some(body) = trimmed.strip_suffix('.') else {
            return false;
        };
        let mut words = body.rsplit(char::is_whitespace);
        let word = words
            .next()
            .unwrap_or("")
            .trim_start_matches(|c: char| !c.is_alphanumeric());
        if word.is_empty() {
            return false;
        }

        let mut chars = word.chars();
        let is_initial = matches!((chars.next(), chars.next()), (Some(c), None) if c.is_uppercase());
        if is_initial {
            return true;
        }

        let lower = word.to_lowercase();
        if self.abbreviations.contains(lower.as_str()) {
            return true;
        }
        // "et al."
        if lower == "al" {
            return words.next().is_some_and(|w| w.eq_ignore_ascii_case("et"));
        }
        self.numbered.contains(lower.as_str())
            && next.trim_start().starts_with(|c: char| c.is_ascii_digit())
    }
}

impl Default for RuleBasedSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl SentenceSplitter for RuleBasedSplitter {
    fn split(&self, text: &str, tokens: &[Token]) -> Vec<Sentence> {
        snap_to_tokens(&self.boundaries(text), tokens)
    }
}

/// Converte fronteiras em bytes para sentenças sobre índices de token.
///
/// Um token inicia nova sentença quando alguma fronteira fica entre o início
/// do token anterior (exclusive) e o seu próprio início (inclusive).
pub fn snap_to_tokens(bounds: &[usize], tokens: &[Token]) -> Vec<Sentence> {
    let mut sentences = Vec::new();
    let mut current_start = 0;
    let mut b = 0;

    for (i, token) in tokens.iter().enumerate() {
        let mut crossed = false;
        while b < bounds.len() && bounds[b] <= token.start {
            b += 1;
            crossed = true;
        }
        if crossed && i > current_start {
            sentences.push(Sentence {
                start_token: current_start,
                end_token: i,
            });
            current_start = i;
        }
    }

    if current_start < tokens.len() {
        sentences.push(Sentence {
            start_token: current_start,
            end_token: tokens.len(),
        });
    }

    sentences
}

/// Segmenta usando o modo configurado: regras quando `sentence_split`, senão [`NoSplit`].
pub fn segment(text: &str, tokens: &[Token], sentence_split: bool) -> Vec<Sentence> {
    if sentence_split {
        RuleBasedSplitter::new().split(text, tokens)
    } else {
        NoSplit.split(text, tokens)
    }
}
