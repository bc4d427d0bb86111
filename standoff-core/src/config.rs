//! # Configuração da Conversão
//!
//! Um único valor imutável, [`ConversionConfig`], carrega todas as escolhas de
//! política de uma execução. Ele é passado por referência para cada estágio
//! do pipeline; nenhum estágio mantém estado global.
//!
//! A struct é (de)serializável com `serde`, o que permite carregá-la de um
//! arquivo TOML na CLI ou recebê-la em JSON no servidor web. Campos ausentes
//! assumem os valores padrão.

use serde::{Deserialize, Serialize};

use crate::overlap::OverlapRule;
use crate::span::DiscontRule;
use crate::tokenizer::TokenizationPolicy;

/// Configuração completa de uma execução.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Regra aplicada a anotações descontínuas.
    pub discont_rule: DiscontRule,
    /// Regra aplicada a anotações sobrepostas.
    pub overlap_rule: OverlapRule,
    /// Se `false`, o documento inteiro vira uma única sentença.
    pub sentence_split: bool,
    /// Política de tokenização (registro fixo).
    pub tokenization: TokenizationPolicy,
    /// Translitera o texto para ASCII antes de tokenizar.
    pub asciify: bool,
    /// Inclui `char_start`/`char_end` (offsets originais) em cada entidade.
    pub char_offsets: bool,
    /// Inclui `orig_id` (identificador do documento) em cada registro.
    pub include_docid: bool,
    /// Se presente, apenas estes tipos de entidade são mantidos.
    pub type_filter: Option<Vec<String>>,
    /// Tipos de entidade a descartar.
    pub type_exclude: Option<Vec<String>>,
    /// Substitui o tipo de toda entidade por este rótulo.
    pub singletype: Option<String>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            discont_rule: DiscontRule::default(),
            overlap_rule: OverlapRule::default(),
            sentence_split: true,
            tokenization: TokenizationPolicy::default(),
            asciify: false,
            char_offsets: false,
            include_docid: false,
            type_filter: None,
            type_exclude: None,
            singletype: None,
        }
    }
}

impl ConversionConfig {
    /// Decide se uma entidade com este rótulo passa pelos filtros de tipo.
    ///
    /// A lista de exclusão tem precedência sobre a lista de inclusão.
    pub fn accepts_label(&self, label: &str) -> bool {
        if let Some(exclude) = &self.type_exclude {
            if exclude.iter().any(|t| t == label) {
                return false;
            }
        }
        match &self.type_filter {
            Some(allowed) => allowed.iter().any(|t| t == label),
            None => true,
        }
    }

    /// Rótulo final emitido para uma entidade (aplica `singletype`).
    pub fn output_label<'a>(&'a self, label: &'a str) -> &'a str {
        self.singletype.as_deref().unwrap_or(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConversionConfig::default();
        assert_eq!(config.discont_rule, DiscontRule::SpanToWhole);
        assert_eq!(config.overlap_rule, OverlapRule::KeepLonger);
        assert!(config.sentence_split);
        assert_eq!(config.tokenization, TokenizationPolicy::Default);
        assert!(config.accepts_label("PERSON"));
    }

    #[test]
    fn test_type_filters() {
        let config = ConversionConfig {
            type_filter: Some(vec!["PERSON".into(), "ORG".into()]),
            type_exclude: Some(vec!["ORG".into()]),
            ..Default::default()
        };
        assert!(config.accepts_label("PERSON"));
        assert!(!config.accepts_label("ORG"));
        assert!(!config.accepts_label("DISEASE"));
    }

    #[test]
    fn test_singletype_overrides_label() {
        let config = ConversionConfig {
            singletype: Some("ENTITY".into()),
            ..Default::default()
        };
        assert_eq!(config.output_label("PERSON"), "ENTITY");
        assert_eq!(ConversionConfig::default().output_label("PERSON"), "PERSON");
    }

    #[test]
    fn test_deserialize_partial_json() {
        let json = r#"{"overlap_rule": "keep-all", "asciify": true}"#;
        let config: ConversionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.overlap_rule, OverlapRule::KeepAll);
        assert!(config.asciify);
        assert!(config.sentence_split);
    }
}
