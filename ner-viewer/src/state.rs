//! Estado compartilhado da aplicação

use std::sync::Arc;

use ner_spans::{reconstruct, Analysis, LexiconTagger, NerPipeline};
use tracing::info;

use crate::config::{TaggerConfig, ViewerConfig};
use crate::error::ViewerError;
use crate::remote::RemoteTagger;

/// O tagger ativo. Construído uma vez na inicialização; nenhuma requisição
/// altera seu estado.
pub enum Backend {
    Lexicon(Arc<NerPipeline<LexiconTagger>>),
    Remote(RemoteTagger),
}

pub struct AppState {
    pub backend: Backend,
    pub max_text_bytes: usize,
}

impl AppState {
    pub fn from_config(config: &ViewerConfig) -> Result<Self, ViewerError> {
        let backend = match &config.tagger {
            TaggerConfig::Lexicon => {
                Backend::Lexicon(Arc::new(NerPipeline::new(LexiconTagger::default())))
            }
            TaggerConfig::Remote(remote) => {
                let tagger = RemoteTagger::new(remote)?;
                info!(url = %tagger.url(), "using remote tagger");
                Backend::Remote(tagger)
            }
        };
        Ok(Self {
            backend,
            max_text_bytes: config.max_text_bytes,
        })
    }

    pub fn tagger_name(&self) -> &'static str {
        match self.backend {
            Backend::Lexicon(_) => "lexicon",
            Backend::Remote(_) => "remote",
        }
    }

    /// Rejeita textos acima do limite configurado.
    pub fn check_size(&self, text: &str) -> Result<(), ViewerError> {
        if text.len() > self.max_text_bytes {
            return Err(ViewerError::BadRequest(format!(
                "text has {} bytes, the limit is {}",
                text.len(),
                self.max_text_bytes
            )));
        }
        Ok(())
    }

    /// Analisa um texto com o tagger ativo.
    pub async fn analyze(&self, text: String) -> Result<Analysis, ViewerError> {
        self.check_size(&text)?;
        match &self.backend {
            Backend::Lexicon(pipeline) => {
                // O pipeline é síncrono: roda fora das threads do runtime
                let pipeline = Arc::clone(pipeline);
                Ok(tokio::task::spawn_blocking(move || pipeline.analyze(&text)).await??)
            }
            Backend::Remote(tagger) => {
                let tokens = tagger.tag(&text).await?;
                Ok(reconstruct(&text, tokens)?)
            }
        }
    }

    /// Analisa vários textos; o resultado de cada um é independente, inclusive
    /// a checagem de tamanho.
    pub async fn analyze_many(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Result<Analysis, ViewerError>>, ViewerError> {
        match &self.backend {
            Backend::Lexicon(pipeline) => {
                // `None` marca as posições que vão para o lote paralelo
                let mut slots: Vec<Option<Result<Analysis, ViewerError>>> =
                    Vec::with_capacity(texts.len());
                let mut accepted = Vec::with_capacity(texts.len());
                for text in texts {
                    match self.check_size(&text) {
                        Ok(()) => {
                            accepted.push(text);
                            slots.push(None);
                        }
                        Err(e) => slots.push(Some(Err(e))),
                    }
                }

                let pipeline = Arc::clone(pipeline);
                let mut analysed =
                    tokio::task::spawn_blocking(move || pipeline.analyze_batch(&accepted))
                        .await?
                        .into_iter();

                Ok(slots
                    .into_iter()
                    .map(|slot| match slot {
                        Some(rejected) => rejected,
                        None => match analysed.next() {
                            Some(result) => result.map_err(ViewerError::from),
                            None => Err(ViewerError::Internal("batch result missing".into())),
                        },
                    })
                    .collect())
            }
            Backend::Remote(_) => {
                let mut results = Vec::with_capacity(texts.len());
                for text in texts {
                    results.push(self.analyze(text).await);
                }
                Ok(results)
            }
        }
    }
}
