//! # Alinhamento Span → Tokens
//!
//! Mapeia um span (em bytes do texto normalizado) para o par
//! `(primeiro_token, último_token)` que o cobre.
//!
//! - **Primeiro token**: o primeiro cujo fim é maior que o início do span.
//! - **Último token**: o último cujo início é menor que o fim do span.
//!
//! Se o span começa ou termina **dentro** de um token, o token inteiro é
//! incluído (o span é expandido, nunca truncado) e o alinhamento é marcado
//! como `expanded`, o que vira um aviso no relatório. Espaço em branco nas
//! bordas do span não conta como expansão.
//!
//! Spans vazios, ou que só cobrem espaço em branco, não tocam nenhum token e
//! o alinhamento falha.
//!
//! As buscas usam `partition_point` sobre os inícios e fins dos tokens, que
//! são estritamente crescentes: custo `O(log n)` por entidade.

use serde::{Deserialize, Serialize};

use crate::tokenizer::Token;

/// Índice de busca binária sobre os tokens de um documento.
#[derive(Debug, Clone, Default)]
pub struct TokenIndex {
    starts: Vec<usize>,
    ends: Vec<usize>,
}

impl TokenIndex {
    pub fn new(tokens: &[Token]) -> Self {
        Self {
            starts: tokens.iter().map(|t| t.start).collect(),
            ends: tokens.iter().map(|t| t.end).collect(),
        }
    }
}

/// Alinhamento bem-sucedido (índices globais, `last_token` inclusivo).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    pub first_token: usize,
    pub last_token: usize,
    /// O span começou ou terminou no meio de um token.
    pub expanded: bool,
}

/// Motivo de uma falha de alinhamento.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentFailure {
    /// Span de tamanho zero.
    EmptySpan,
    /// Nenhum token intersecta o span (ex: só espaço em branco).
    NoTokens,
    /// Offsets além do fim do texto.
    OutOfBounds,
}

impl std::fmt::Display for AlignmentFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            AlignmentFailure::EmptySpan => "span vazio",
            AlignmentFailure::NoTokens => "nenhum token no span",
            AlignmentFailure::OutOfBounds => "offsets fora do texto",
        };
        f.write_str(msg)
    }
}

/// Alinha um span `[start, end)` de bytes aos tokens.
pub fn align(span: (usize, usize), index: &TokenIndex) -> Result<Alignment, AlignmentFailure> {
    let (start, end) = span;
    if start >= end {
        return Err(AlignmentFailure::EmptySpan);
    }

    let first = index.ends.partition_point(|&e| e <= start);
    let after_last = index.starts.partition_point(|&s| s < end);
    if first >= after_last {
        return Err(AlignmentFailure::NoTokens);
    }
    let last = after_last - 1;

    let expanded = index.starts[first] < start || index.ends[last] > end;
    Ok(Alignment {
        first_token: first,
        last_token: last,
        expanded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::{tokenize, TokenizationPolicy};

    fn index(text: &str) -> TokenIndex {
        let tokens: Vec<Token> = tokenize(text, TokenizationPolicy::Default).collect();
        TokenIndex::new(&tokens)
    }

    #[test]
    fn test_exact_alignment() {
        let idx = index("John met Mary.");
        let a = align((9, 13), &idx).unwrap();
        assert_eq!((a.first_token, a.last_token), (2, 2));
        assert!(!a.expanded);
    }

    #[test]
    fn test_multi_token_alignment() {
        let idx = index("John met Mary.");
        let a = align((0, 13), &idx).unwrap();
        assert_eq!((a.first_token, a.last_token), (0, 2));
    }

    #[test]
    fn test_span_inside_token_is_expanded() {
        let idx = index("unbelievable news");
        let a = align((2, 6), &idx).unwrap();
        assert_eq!((a.first_token, a.last_token), (0, 0));
        assert!(a.expanded);
    }

    #[test]
    fn test_surrounding_whitespace_is_not_expansion() {
        let idx = index("John  met");
        let a = align((4, 9), &idx).unwrap();
        assert_eq!((a.first_token, a.last_token), (1, 1));
        assert!(!a.expanded);
    }

    #[test]
    fn test_zero_length_fails() {
        let idx = index("John met Mary.");
        assert_eq!(align((3, 3), &idx), Err(AlignmentFailure::EmptySpan));
    }

    #[test]
    fn test_whitespace_only_fails() {
        let idx = index("John   met");
        assert_eq!(align((5, 6), &idx), Err(AlignmentFailure::NoTokens));
    }

    #[test]
    fn test_empty_document() {
        assert_eq!(align((0, 3), &TokenIndex::default()), Err(AlignmentFailure::NoTokens));
    }
}
