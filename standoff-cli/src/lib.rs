//! # standoff-cli
//!
//! Linha de comando `standoff2spert`: descobre os arquivos de anotação,
//! aplica a configuração (arquivo TOML + flags), converte o lote em paralelo
//! e grava o JSON do SpERT, o CSV de estatísticas e o log de erros.

pub mod commands;
pub mod config;
pub mod input;
pub mod logging;
pub mod output;
pub mod progress;
