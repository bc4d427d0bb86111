//! # Tipos de Erro
//!
//! Erros em duas camadas:
//!
//! - [`ParseError`]: uma linha do arquivo `.ann` que não pôde ser interpretada.
//!   Afeta apenas aquela anotação; o documento segue sendo processado.
//! - [`ConvertError`]: falha no nível do documento (arquivo de texto ausente,
//!   encoding inválido, política desconhecida). O documento é pulado, mas o
//!   lote continua.
//!
//! Avisos não fatais (alinhamento expandido, texto divergente, relações
//! descartadas) não são erros: ficam registrados em [`crate::report::Issue`].

use std::path::PathBuf;

use thiserror::Error;

/// Falha ao interpretar uma linha do arquivo de anotações.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("linha {line}: {reason}")]
pub struct ParseError {
    /// Número da linha (1-based) no arquivo `.ann`.
    pub line: usize,
    /// Descrição legível do problema.
    pub reason: String,
}

impl ParseError {
    pub fn new(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}

/// Falha que impede a conversão de um documento inteiro.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// O `.txt` pareado com o arquivo de anotações não existe.
    #[error("arquivo de texto ausente para {}: {}", annotations.display(), text.display())]
    MissingText {
        /// Arquivo de anotações que originou a busca
        annotations: PathBuf,
        /// Caminho esperado do texto
        text: PathBuf,
    },

    /// Erro de leitura de arquivo
    #[error("erro de I/O em {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Conteúdo não é UTF-8 válido
    #[error("encoding inválido em {}: {reason}", path.display())]
    Encoding { path: PathBuf, reason: String },

    /// Nome de regra ou política fora do registro fixo
    #[error("{kind} desconhecida: '{name}'")]
    UnknownPolicy { kind: &'static str, name: String },
}

/// Result para operações em nível de documento
pub type Result<T> = std::result::Result<T, ConvertError>;
