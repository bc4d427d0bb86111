//! # Resolução de Sobreposições
//!
//! Duas entidades **conflitam** quando seus spans de caractere compartilham
//! ao menos um caractere (sobreposição parcial ou contenção). Formatos de
//! treino baseados em tokens costumam exigir um conjunto sem conflitos, então
//! uma regra global seleciona quais entidades sobrevivem.
//!
//! ## Determinismo
//!
//! Antes de qualquer regra a entrada é ordenada por `(início, -tamanho, id)`.
//! A saída, portanto, não depende da ordem em que as anotações aparecem no
//! arquivo.
//!
//! ## Clusters
//!
//! As regras `keep-longer` e `keep-first` operam sobre **clusters maximais**:
//! componentes conexos do grafo de conflitos. Com a entrada ordenada por
//! início, um cluster é simplesmente uma sequência de entidades cujo início
//! fica antes do maior fim visto até ali, e pode ser extraído numa única
//! varredura.
//!
//! ```text
//! [0 ........ 10)
//!      [5 ......... 15)        ← mesmo cluster
//!                        [20 .. 25)   ← outro cluster
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ConvertError;
use crate::span::ResolvedEntity;

/// Regra de resolução de sobreposições.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapRule {
    /// Por cluster, mantém o span mais longo (empate: início mais cedo).
    #[default]
    KeepLonger,
    /// Por cluster, mantém o span que começa primeiro (empate: mais longo).
    KeepFirst,
    /// Não resolve: mantém tudo, mesmo sobreposto.
    KeepAll,
    /// Subconjunto máximo de spans sem sobreposição, varrendo da esquerda.
    SplitNonoverlapping,
}

impl OverlapRule {
    pub fn all() -> [OverlapRule; 4] {
        [
            OverlapRule::KeepLonger,
            OverlapRule::KeepFirst,
            OverlapRule::KeepAll,
            OverlapRule::SplitNonoverlapping,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            OverlapRule::KeepLonger => "keep-longer",
            OverlapRule::KeepFirst => "keep-first",
            OverlapRule::KeepAll => "keep-all",
            OverlapRule::SplitNonoverlapping => "split-nonoverlapping",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, ConvertError> {
        Self::all()
            .into_iter()
            .find(|r| r.name() == name)
            .ok_or_else(|| ConvertError::UnknownPolicy {
                kind: "regra de sobreposição",
                name: name.to_string(),
            })
    }
}

impl std::fmt::Display for OverlapRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Resultado da resolução: entidades mantidas (em ordem de offset) e descartadas.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlapOutcome {
    pub kept: Vec<ResolvedEntity>,
    pub dropped: Vec<ResolvedEntity>,
}

/// Chave de ordenação canônica: `(início, -tamanho, id)`.
fn canonical_order(a: &ResolvedEntity, b: &ResolvedEntity) -> std::cmp::Ordering {
    a.span
        .start
        .cmp(&b.span.start)
        .then_with(|| b.span.len().cmp(&a.span.len()))
        .then_with(|| a.id.cmp(&b.id))
}

/// Seleciona um subconjunto de `entities` segundo `rule`.
pub fn resolve_overlaps(entities: &[ResolvedEntity], rule: OverlapRule) -> OverlapOutcome {
    let mut sorted = entities.to_vec();
    sorted.sort_by(canonical_order);

    let keep = match rule {
        OverlapRule::KeepAll => vec![true; sorted.len()],
        OverlapRule::KeepLonger => pick_per_cluster(&sorted, |a, b| {
            // maior tamanho; depois a ordem canônica já desempata por início e id
            b.span.len().cmp(&a.span.len()).then_with(|| canonical_order(a, b))
        }),
        OverlapRule::KeepFirst => pick_per_cluster(&sorted, canonical_order),
        OverlapRule::SplitNonoverlapping => max_nonoverlapping(&sorted),
    };

    let mut outcome = OverlapOutcome::default();
    for (entity, kept) in sorted.into_iter().zip(keep) {
        if kept {
            outcome.kept.push(entity);
        } else {
            outcome.dropped.push(entity);
        }
    }
    outcome
}

/// Clusters maximais (índices na lista ordenada por início).
///
/// Spans vazios não conflitam com nada e ficam fora de qualquer cluster.
fn clusters(sorted: &[ResolvedEntity]) -> Vec<Vec<usize>> {
    let mut result: Vec<Vec<usize>> = Vec::new();
    let mut max_end = 0;
    for (i, entity) in sorted.iter().enumerate() {
        if entity.span.is_empty() {
            continue;
        }
        match result.last_mut() {
            Some(current) if entity.span.start < max_end => {
                current.push(i);
                max_end = max_end.max(entity.span.end);
            }
            _ => {
                result.push(vec![i]);
                max_end = entity.span.end;
            }
        }
    }
    result
}

/// Mantém exatamente um representante por cluster: o menor segundo `better`.
fn pick_per_cluster<F>(sorted: &[ResolvedEntity], better: F) -> Vec<bool>
where
    F: Fn(&ResolvedEntity, &ResolvedEntity) -> std::cmp::Ordering,
{
    let mut keep: Vec<bool> = sorted.iter().map(|e| e.span.is_empty()).collect();
    for cluster in clusters(sorted) {
        if let Some(&winner) = cluster
            .iter()
            .min_by(|&&a, &&b| better(&sorted[a], &sorted[b]))
        {
            keep[winner] = true;
        }
    }
    keep
}

/// Seleção gulosa de cardinalidade máxima (escalonamento de intervalos):
/// percorre os candidatos por fim crescente e aceita todo span que não
/// conflita com o último aceito.
fn max_nonoverlapping(sorted: &[ResolvedEntity]) -> Vec<bool> {
    let mut by_end: Vec<usize> = (0..sorted.len()).collect();
    by_end.sort_by(|&a, &b| {
        sorted[a]
            .span
            .end
            .cmp(&sorted[b].span.end)
            .then_with(|| canonical_order(&sorted[a], &sorted[b]))
    });

    let mut keep = vec![false; sorted.len()];
    let mut last_end = 0;
    let mut has_last = false;
    for i in by_end {
        let span = sorted[i].span;
        if span.is_empty() || !has_last || span.start >= last_end {
            keep[i] = true;
            if !span.is_empty() {
                last_end = span.end;
                has_last = true;
            }
        }
    }
    keep
}
