//! Configuração do servidor: argumentos de linha de comando com fallback
//! para variáveis de ambiente.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use clap::{Parser, ValueEnum};
use reqwest::Url;

/// Endpoint de inferência do modelo BERT fine-tuned para CoNLL-2003.
pub const DEFAULT_REMOTE_URL: &str =
    "https://api-inference.huggingface.co/models/Mehmood-Deshmukh/BERT-Finetuned-NER";

/// Qual tagger alimenta o reconstrutor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TaggerKind {
    /// Gazetteer + WordPiece embutidos (sem rede)
    Lexicon,
    /// Modelo remoto via endpoint de inferência
    Remote,
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "ner-viewer",
    version,
    about = "Web viewer for named entities reconstructed from sub-word tagger output"
)]
pub struct CliArgs {
    /// Endereço de escuta
    #[arg(long, env = "NER_VIEWER_BIND", default_value = "0.0.0.0:3000")]
    pub bind: SocketAddr,

    /// Tagger usado nas análises
    #[arg(long, env = "NER_VIEWER_TAGGER", value_enum, default_value_t = TaggerKind::Lexicon)]
    pub tagger: TaggerKind,

    /// URL do endpoint de inferência (modo remote)
    #[arg(long, env = "NER_VIEWER_REMOTE_URL", default_value = DEFAULT_REMOTE_URL)]
    pub remote_url: String,

    /// Token bearer do endpoint de inferência
    #[arg(long, env = "HF_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Timeout das chamadas ao modelo remoto, em segundos
    #[arg(long, env = "NER_VIEWER_TIMEOUT_SECS", default_value_t = 30)]
    pub timeout_secs: u64,

    /// Tamanho máximo do texto aceito, em bytes
    #[arg(long, env = "NER_VIEWER_MAX_TEXT_BYTES", default_value_t = 20_000)]
    pub max_text_bytes: usize,

    /// Filtro de log (sintaxe do EnvFilter, ex: "debug" ou "ner_spans=debug")
    #[arg(long, env = "NER_VIEWER_LOG")]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub url: Url,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub enum TaggerConfig {
    Lexicon,
    Remote(RemoteConfig),
}

impl TaggerConfig {
    pub fn name(&self) -> &'static str {
        match self {
            TaggerConfig::Lexicon => "lexicon",
            TaggerConfig::Remote(_) => "remote",
        }
    }
}

/// Configuração validada do servidor
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub bind: SocketAddr,
    pub tagger: TaggerConfig,
    pub max_text_bytes: usize,
}

impl ViewerConfig {
    pub fn from_cli(args: CliArgs) -> Result<Self> {
        ensure!(args.max_text_bytes > 0, "max text size must be greater than zero");

        let tagger = match args.tagger {
            TaggerKind::Lexicon => TaggerConfig::Lexicon,
            TaggerKind::Remote => {
                ensure!(args.timeout_secs > 0, "remote timeout must be greater than zero");
                let url = Url::parse(&args.remote_url)
                    .with_context(|| format!("invalid remote tagger URL '{}'", args.remote_url))?;
                TaggerConfig::Remote(RemoteConfig {
                    url,
                    api_token: args.api_token.filter(|t| !t.is_empty()),
                    timeout: Duration::from_secs(args.timeout_secs),
                })
            }
        };

        Ok(Self {
            bind: args.bind,
            tagger,
            max_text_bytes: args.max_text_bytes,
        })
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 3000)),
            tagger: TaggerConfig::Lexicon,
            max_text_bytes: 20_000,
        }
    }
}
