//! Subcomando `convert`

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{debug, info, warn};

use standoff_core::batch::convert_paths_with_progress;
use standoff_core::{ConversionConfig, DiscontRule, OverlapRule, TokenizationPolicy};

use crate::config::CliConfig;
use crate::input::resolve_inputs;
use crate::logging::init_logging;
use crate::output::{
    relation_counts, write_error_log, write_records, write_records_to_file, write_stats_file,
};
use crate::progress::ProgressReporter;

/// Argumentos do subcomando `convert`
#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Diretórios, arquivos `.ann`/`.a1` ou padrões glob
    #[arg(value_name = "DIRS/FILES", required = true)]
    pub inputs: Vec<String>,

    /// Substitui o tipo de todas as entidades por TYPE
    #[arg(short = '1', long, value_name = "TYPE")]
    pub singletype: Option<String>,

    /// Translitera o texto para ASCII
    #[arg(short, long)]
    pub asciify: bool,

    /// Inclui offsets de caractere nas entidades
    #[arg(short, long)]
    pub char_offsets: bool,

    /// Não divide o documento em sentenças
    #[arg(short, long)]
    pub no_sentence_split: bool,

    /// Regra para anotações descontínuas
    #[arg(short, long, value_name = "RULE")]
    pub discont_rule: Option<String>,

    /// Inclui o identificador do documento em cada registro
    #[arg(short, long)]
    pub include_docid: bool,

    /// Política de tokenização
    #[arg(short = 'k', long, value_name = "NAME")]
    pub tokenization: Option<String>,

    /// Regra para anotações sobrepostas
    #[arg(short, long, value_name = "RULE")]
    pub overlap_rule: Option<String>,

    /// Mantém apenas estes tipos de entidade (separados por vírgula)
    #[arg(short = 't', long, value_name = "TYPE", value_delimiter = ',')]
    pub types: Option<Vec<String>>,

    /// Descarta estes tipos de entidade (separados por vírgula)
    #[arg(short = 'x', long, value_name = "TYPE", value_delimiter = ',')]
    pub exclude: Option<Vec<String>>,

    /// Arquivo de configuração TOML
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Arquivo de saída (padrão: stdout)
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// JSON indentado
    #[arg(long)]
    pub pretty: bool,

    /// Grava a contagem de relações por tipo em CSV
    #[arg(long, value_name = "FILE")]
    pub stats: Option<PathBuf>,

    /// Grava as falhas por documento (`documento: motivo`)
    #[arg(long, value_name = "FILE")]
    pub error_log: Option<PathBuf>,

    /// Grava o relatório completo do lote em JSON
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Sem barra de progresso e só erros no log
    #[arg(short, long)]
    pub quiet: bool,

    /// Aumenta a verbosidade (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl ConvertArgs {
    pub fn execute(&self) -> Result<()> {
        // o subscriber pode já ter sido instalado
        let _ = init_logging(self.verbose, self.quiet);

        let file_config = match &self.config {
            Some(path) => CliConfig::load(path)?,
            None => CliConfig::default(),
        };
        let config = self.apply_overrides(file_config.conversion.clone())?;
        debug!(?config, "configuração efetiva");

        let paths = resolve_inputs(&self.inputs)?;
        info!(files = paths.len(), "arquivos de anotação encontrados");

        let mut progress = ProgressReporter::new(self.quiet);
        progress.init_files(paths.len() as u64);
        let out = convert_paths_with_progress(&paths, &config, |path| progress.file_completed(path));
        progress.finish();

        let pretty = self.pretty || file_config.output.pretty;
        match &self.output {
            Some(path) => write_records_to_file(path, &out.records, pretty)?,
            None => write_records(io::stdout().lock(), &out.records, pretty)
                .context("falha ao gravar na saída padrão")?,
        }

        if let Some(path) = self.stats.as_ref().or(file_config.output.stats.as_ref()) {
            write_stats_file(path, &relation_counts(&out.records))?;
        }

        let failures = out.report.error_lines();
        if !failures.is_empty() {
            warn!(count = failures.len(), "documentos com falha");
            if let Some(path) = self.error_log.as_ref().or(file_config.output.error_log.as_ref()) {
                write_error_log(path, &failures)?;
            }
        }

        if let Some(path) = &self.report {
            let file = std::fs::File::create(path)
                .with_context(|| format!("falha ao criar {}", path.display()))?;
            serde_json::to_writer_pretty(file, &out.report)
                .with_context(|| format!("falha ao gravar {}", path.display()))?;
        }

        let totals = out.report.totals();
        info!(
            converted = out.report.converted(),
            failed = out.report.failures.len(),
            records = out.records.len(),
            overlap_dropped = totals.overlap_dropped,
            alignment_failed = totals.alignment_failed,
            relations_dropped = totals.relations_dropped,
            "conversão concluída"
        );
        Ok(())
    }

    /// Aplica as flags sobre a configuração vinda do arquivo.
    pub fn apply_overrides(&self, mut config: ConversionConfig) -> Result<ConversionConfig> {
        if let Some(name) = &self.discont_rule {
            config.discont_rule = DiscontRule::from_name(name)?;
        }
        if let Some(name) = &self.overlap_rule {
            config.overlap_rule = OverlapRule::from_name(name)?;
        }
        if let Some(name) = &self.tokenization {
            config.tokenization = TokenizationPolicy::from_name(name)?;
        }
        if self.no_sentence_split {
            config.sentence_split = false;
        }
        if self.asciify {
            config.asciify = true;
        }
        if self.char_offsets {
            config.char_offsets = true;
        }
        if self.include_docid {
            config.include_docid = true;
        }
        if let Some(types) = &self.types {
            config.type_filter = Some(types.clone());
        }
        if let Some(types) = &self.exclude {
            config.type_exclude = Some(types.clone());
        }
        if let Some(label) = &self.singletype {
            config.singletype = Some(label.clone());
        }
        Ok(config)
    }
}
