//! # Resolução de Spans Descontínuos
//!
//! Uma anotação brat pode cobrir vários intervalos disjuntos de texto
//! (ex: em "lung (minor) cancer", a doença "lung … cancer" salta o
//! parêntese). O formato de saída só aceita spans contíguos, então toda
//! anotação descontínua é reduzida a **um** intervalo por uma regra global:
//!
//! | Regra           | `[0,4] + [10,14]` vira | Observação                         |
//! |-----------------|------------------------|------------------------------------|
//! | `span-to-first` | `[0,4]`                | descarta os demais fragmentos      |
//! | `span-to-last`  | `[10,14]`              | mantém apenas o último             |
//! | `span-to-whole` | `[0,14]`               | inclui o texto da lacuna           |
//! | `discard`       | (nada)                 | a anotação é rejeitada             |
//!
//! Anotações de um único intervalo passam inalteradas por qualquer regra, o
//! que torna a resolução idempotente.

use serde::{Deserialize, Serialize};

use crate::annotation::{CharRange, TextBound};
use crate::error::ConvertError;

/// Regra de resolução de anotações descontínuas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscontRule {
    /// Mantém apenas o primeiro fragmento.
    SpanToFirst,
    /// Mantém apenas o último fragmento.
    SpanToLast,
    /// Do menor início ao maior fim, incluindo as lacunas.
    #[default]
    SpanToWhole,
    /// Rejeita a anotação inteira.
    Discard,
}

impl DiscontRule {
    pub fn all() -> [DiscontRule; 4] {
        [
            DiscontRule::SpanToFirst,
            DiscontRule::SpanToLast,
            DiscontRule::SpanToWhole,
            DiscontRule::Discard,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            DiscontRule::SpanToFirst => "span-to-first",
            DiscontRule::SpanToLast => "span-to-last",
            DiscontRule::SpanToWhole => "span-to-whole",
            DiscontRule::Discard => "discard",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, ConvertError> {
        Self::all()
            .into_iter()
            .find(|r| r.name() == name)
            .ok_or_else(|| ConvertError::UnknownPolicy {
                kind: "regra de descontinuidade",
                name: name.to_string(),
            })
    }

    /// Reduz uma lista ordenada de fragmentos a um único intervalo.
    ///
    /// Retorna `None` quando a regra rejeita (ou quando não há fragmentos).
    pub fn apply(&self, fragments: &[CharRange]) -> Option<CharRange> {
        let (first, last) = (fragments.first()?, fragments.last()?);
        if fragments.len() == 1 {
            return Some(*first);
        }
        match self {
            DiscontRule::SpanToFirst => Some(*first),
            DiscontRule::SpanToLast => Some(*last),
            DiscontRule::SpanToWhole => {
                let start = fragments.iter().map(|f| f.start).min()?;
                let end = fragments.iter().map(|f| f.end).max()?;
                Some(CharRange::new(start, end))
            }
            DiscontRule::Discard => None,
        }
    }
}

impl std::fmt::Display for DiscontRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Entidade com um único span contíguo, derivada de um [`TextBound`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEntity {
    pub id: String,
    pub label: String,
    /// Span contíguo em offsets de caractere do texto original.
    pub span: CharRange,
    /// Número de fragmentos da anotação de origem.
    pub fragment_count: usize,
}

impl ResolvedEntity {
    pub fn was_discontinuous(&self) -> bool {
        self.fragment_count > 1
    }
}

/// Aplica a regra a uma anotação. `None` significa rejeição.
pub fn resolve_discontinuous(annotation: &TextBound, rule: DiscontRule) -> Option<ResolvedEntity> {
    let span = rule.apply(&annotation.fragments)?;
    Some(ResolvedEntity {
        id: annotation.id.clone(),
        label: annotation.label.clone(),
        span,
        fragment_count: annotation.fragments.len(),
    })
}
