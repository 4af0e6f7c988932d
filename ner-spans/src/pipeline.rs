//! # Pipeline de reconstrução
//!
//! Orquestra os estágios sobre a saída de um [`Tagger`]:
//!
//! 1. Validação do contrato dos tokens ([`validate_tokens`]).
//! 2. Fusão de fragmentos em palavras ([`merge_fragments`]).
//! 3. Filtragem das palavras `O`.
//! 4. Legenda (palavra, rótulo, nome legível, cor).
//! 5. Destaque guiado por offsets ([`highlight`]).
//! 6. Agrupamento BIO em entidades de várias palavras ([`group_words`]).
//!
//! Tudo é derivado a cada requisição; nenhum estado é compartilhado entre
//! chamadas, então o mesmo [`NerPipeline`] atende várias threads.

use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Result;
use crate::highlight::{highlight, HighlightedDocument};
use crate::merge::{merge_fragments, MergedEntity};
use crate::palette::{color_of, display_name_of};
use crate::span::{group_words, EntitySpan};
use crate::tagger::{Tag, Tagger};
use crate::token::{validate_tokens, Token};

/// Uma linha da legenda de entidades reconhecidas.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub word: String,
    pub label: Tag,
    pub display_name: &'static str,
    pub color: &'static str,
    pub start: usize,
    pub end: usize,
}

/// Resultado completo da análise de um texto.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    /// Tokens sub-palavra como vieram do tagger.
    pub tokens: Vec<Token>,
    /// Palavras reconhecidas como entidade (sem `O`), em ordem.
    pub entities: Vec<MergedEntity>,
    pub legend: Vec<LegendEntry>,
    pub document: HighlightedDocument,
    /// Entidades de múltiplas palavras.
    pub spans: Vec<EntitySpan>,
    pub processing_ms: u64,
}

/// Palavras fundidas que são entidade, com os tokens já validados.
fn entity_words(text: &str, tokens: &[Token]) -> Result<Vec<MergedEntity>> {
    validate_tokens(text, tokens).inspect_err(|e| warn!(error = %e, "rejecting tagger output"))?;
    Ok(merge_fragments(tokens)
        .into_iter()
        .filter(|word| word.label.is_entity())
        .collect())
}

fn legend_for(entities: &[MergedEntity]) -> Result<Vec<LegendEntry>> {
    entities
        .iter()
        .map(|e| {
            let label = e.label.label();
            Ok(LegendEntry {
                word: e.word.clone(),
                label: e.label,
                display_name: display_name_of(&label)?,
                color: color_of(&label),
                start: e.start,
                end: e.end,
            })
        })
        .collect()
}

/// Legenda das entidades reconhecidas (palavras `O` ficam de fora).
///
/// `text` é o texto original; os offsets dos tokens são validados contra ele.
pub fn build_legend(text: &str, tokens: &[Token]) -> Result<Vec<LegendEntry>> {
    legend_for(&entity_words(text, tokens)?)
}

/// O texto original com cada entidade embrulhada em marcação de estilo.
pub fn build_highlighted_document(text: &str, tokens: &[Token]) -> Result<String> {
    Ok(highlight(text, &entity_words(text, tokens)?)?.render())
}

/// Executa todos os estágios sobre tokens já obtidos do tagger.
pub fn reconstruct(text: &str, tokens: Vec<Token>) -> Result<Analysis> {
    let started = Instant::now();

    let entities = entity_words(text, &tokens)?;
    let legend = legend_for(&entities)?;
    let document = highlight(text, &entities)?;
    let spans = group_words(&entities, text);

    debug!(
        tokens = tokens.len(),
        entities = entities.len(),
        spans = spans.len(),
        "text reconstructed"
    );

    Ok(Analysis {
        tokens,
        entities,
        legend,
        document,
        spans,
        processing_ms: started.elapsed().as_millis() as u64,
    })
}

/// O pipeline principal: um tagger injetado + a reconstrução.
///
/// O tagger é o único estágio potencialmente lento; o pipeline não impõe
/// timeout, isso fica a cargo de quem chama.
pub struct NerPipeline<T> {
    tagger: T,
}

impl<T: Tagger> NerPipeline<T> {
    pub fn new(tagger: T) -> Self {
        Self { tagger }
    }

    /// Analisa um texto. Texto vazio não é erro: legenda vazia e documento idêntico.
    pub fn analyze(&self, text: &str) -> Result<Analysis> {
        let started = Instant::now();
        let tokens = self.tagger.tag(text)?;
        let mut analysis = reconstruct(text, tokens)?;
        analysis.processing_ms = started.elapsed().as_millis() as u64;
        Ok(analysis)
    }
}

impl<T: Tagger + Sync> NerPipeline<T> {
    /// Analisa vários textos em paralelo; cada texto tem seu próprio resultado.
    pub fn analyze_batch(&self, texts: &[String]) -> Vec<Result<Analysis>> {
        texts.par_iter().map(|text| self.analyze(text)).collect()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::lexicon::LexiconTagger;
    use proptest::prelude::*;

    proptest! {
        /// Palavras fundidas são disjuntas e estritamente crescentes
        #[test]
        fn merged_ranges_are_monotonic(text in "(Paris|Washington|loves|New York|Google|Amsterdam|é|, )*") {
            let tokens = LexiconTagger::default().tag(&text).unwrap();
            let words = merge_fragments(&tokens);
            for pair in words.windows(2) {
                prop_assert!(pair[0].start < pair[1].start);
                prop_assert!(pair[0].end <= pair[1].start);
            }
        }

        /// O documento destacado sempre reproduz o texto de entrada
        #[test]
        fn reconstruction_is_complete(text in "(Paris|Bundesliga|loves|Zelensky|the| |\\.|ção)*") {
            let analysis = NerPipeline::new(LexiconTagger::default()).analyze(&text).unwrap();
            prop_assert_eq!(analysis.document.plain_text(), text);
        }
    }
}
