//! # standoff-core: Conversão de Anotações Standoff para Registros por Sentença
//!
//! Este crate converte corpora anotados no formato standoff do brat (`.txt`
//! + `.ann`/`.a1`) em registros alinhados a tokens, um por sentença, no
//! formato JSON usado para treinar extratores conjuntos de entidades e
//! relações (SpERT).
//!
//! O trabalho de verdade é a **reconciliação** entre anotações em offsets de
//! caractere e uma tokenização que ignora essas fronteiras.
//!
//! ## Arquitetura do Sistema
//!
//! 1.  **Normalização** ([`normalize`]): transliteração opcional para ASCII, com
//!     mapa de offsets de volta ao texto original.
//! 2.  **Tokenização** ([`tokenizer`]): registro fixo de políticas por regex.
//! 3.  **Sentenças** ([`sentence`]): UAX #29 com supressão de abreviações,
//!     ajustado às fronteiras de token.
//! 4.  **Anotações** ([`annotation`]): leitura linha a linha do `.ann`.
//! 5.  **Descontínuos** ([`span`]) e **Sobreposições** ([`overlap`]): regras
//!     globais de resolução de conflitos.
//! 6.  **Alinhamento** ([`align`]): busca binária span → tokens.
//! 7.  **Montagem** ([`document`]): um [`DocumentRecord`] por sentença.
//!
//! O [`pipeline`] conecta os estágios e emite eventos; o [`batch`] processa
//! diretórios inteiros em paralelo. Tudo que é descartado fica registrado no
//! [`report`].
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use standoff_core::{ConversionConfig, Converter};
//!
//! let converter = Converter::new(ConversionConfig::default());
//! let ann = "T1\tPERSON 0 4\tJohn\nT2\tPERSON 9 13\tMary\nR1\tMET Arg1:T1 Arg2:T2\n";
//! let out = converter.convert(Some("doc1"), "John met Mary.", ann);
//!
//! assert_eq!(out.records[0].tokens, ["John", "met", "Mary", "."]);
//! assert_eq!(out.records[0].relations.len(), 1);
//! ```

pub mod align;
pub mod annotation;
pub mod batch;
pub mod config;
pub mod document;
pub mod error;
pub mod normalize;
pub mod overlap;
pub mod pipeline;
pub mod report;
pub mod sentence;
pub mod span;
pub mod tokenizer;

pub use batch::{convert_paths, BatchOutput};
pub use config::ConversionConfig;
pub use document::{DocumentRecord, RecordEntity, RecordRelation};
pub use error::{ConvertError, ParseError};
pub use overlap::OverlapRule;
pub use pipeline::{Conversion, Converter, PipelineEvent};
pub use report::{BatchReport, DocumentReport, Issue};
pub use span::DiscontRule;
pub use tokenizer::{Token, TokenizationPolicy};
