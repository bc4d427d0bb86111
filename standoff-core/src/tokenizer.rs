//! # Tokenizador por Expressões Regulares
//!
//! Divide o texto normalizado em tokens. Cada token preserva sua posição
//! (offsets de byte) no texto normalizado, o que permite alinhar as anotações
//! standoff aos tokens depois.
//!
//! ## Políticas Disponíveis
//!
//! O registro é fixo e selecionado por nome:
//!
//! | Nome      | Regex                      | Exemplo: `"IL-2 (10mg)"`                 |
//! |-----------|----------------------------|------------------------------------------|
//! | `default` | `[^\W_]+\|\S`              | `IL` `-` `2` `(` `10mg` `)`              |
//! | `fine`    | `[0-9]+\|[^\W0-9_]+\|\S`   | `IL` `-` `2` `(` `10` `mg` `)`           |
//! | `space`   | `\S+`                      | `IL-2` `(10mg)`                          |
//!
//! Espaços em branco nunca viram tokens. Texto vazio produz uma sequência
//! vazia.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use standoff_core::tokenizer::{tokenize, TokenizationPolicy};
//!
//! let tokens: Vec<_> = tokenize("John met Mary.", TokenizationPolicy::Default).collect();
//! let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
//! assert_eq!(texts, ["John", "met", "Mary", "."]);
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConvertError;

/// Um token extraído do texto normalizado.
///
/// `start` e `end` são offsets de byte no texto normalizado (`end` exclusivo),
/// sempre com `start < end`. Tokens de um documento são produzidos em ordem
/// estritamente crescente e sem sobreposição.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    /// O texto do token (ex: "John", ",", "met").
    pub text: String,
    /// Índice de byte inicial (inclusive).
    pub start: usize,
    /// Índice de byte final (exclusivo).
    pub end: usize,
    /// Índice sequencial do token no documento (0, 1, 2...).
    pub index: usize,
}

/// Políticas de tokenização disponíveis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizationPolicy {
    /// **Padrão**: sequências alfanuméricas ficam inteiras; todo o resto é um
    /// token de um caractere (estilo NERsuite).
    #[default]
    Default,
    /// **Fino**: como o padrão, mas separa letras de dígitos ("10mg" → "10", "mg").
    Fine,
    /// **Espaço**: divide apenas em espaços em branco.
    Space,
}

static DEFAULT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\W_]+|\S").unwrap());
static FINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+|[^\W0-9_]+|\S").unwrap());
static SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\S+").unwrap());

impl TokenizationPolicy {
    /// Todas as políticas do registro, na ordem de exibição.
    pub fn all() -> [TokenizationPolicy; 3] {
        [
            TokenizationPolicy::Default,
            TokenizationPolicy::Fine,
            TokenizationPolicy::Space,
        ]
    }

    /// Nome da política (usado na CLI e na configuração)
    pub fn name(&self) -> &'static str {
        match self {
            TokenizationPolicy::Default => "default",
            TokenizationPolicy::Fine => "fine",
            TokenizationPolicy::Space => "space",
        }
    }

    /// Busca uma política pelo nome.
    pub fn from_name(name: &str) -> Result<Self, ConvertError> {
        Self::all()
            .into_iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| ConvertError::UnknownPolicy {
                kind: "política de tokenização",
                name: name.to_string(),
            })
    }

    fn regex(&self) -> &'static Regex {
        match self {
            TokenizationPolicy::Default => &DEFAULT_RE,
            TokenizationPolicy::Fine => &FINE_RE,
            TokenizationPolicy::Space => &SPACE_RE,
        }
    }
}

impl std::fmt::Display for TokenizationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Sequência preguiçosa de tokens.
///
/// É finita e pode ser reiniciada: basta clonar o iterador (ou chamar
/// [`tokenize`] de novo) para percorrer o texto outra vez do início.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    text: &'a str,
    regex: &'static Regex,
    pos: usize,
    index: usize,
}

impl Iterator for Tokens<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.pos >= self.text.len() {
            return None;
        }
        let m = self.regex.find_at(self.text, self.pos)?;
        self.pos = m.end();
        let token = Token {
            text: m.as_str().to_string(),
            start: m.start(),
            end: m.end(),
            index: self.index,
        };
        self.index += 1;
        Some(token)
    }
}

/// Tokeniza o texto normalizado com a política informada.
pub fn tokenize(text: &str, policy: TokenizationPolicy) -> Tokens<'_> {
    Tokens {
        text,
        regex: policy.regex(),
        pos: 0,
        index: 0,
    }
}
