//! # Agrupamento BIO de palavras em entidades
//!
//! Depois da fusão de fragmentos, cada palavra tem uma tag BIO. Entidades de
//! várias palavras ("New York", "United Nations") aparecem como `B-X I-X`.
//! Este módulo percorre as palavras como a máquina de estados do esquema BIO:
//!
//! - `B-X` abre uma entidade nova;
//! - `I-X` continua a entidade aberta se ela for da mesma categoria;
//! - `I-X` sem entidade compatível aberta é tratado como `B-X`;
//! - `O` fecha a entidade aberta.
//!
//! O texto de cada entidade é recortado do original pelos offsets.

use serde::{Deserialize, Serialize};

use crate::merge::MergedEntity;
use crate::tagger::{EntityCategory, Tag};

/// Uma entidade possivelmente com várias palavras.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Texto da entidade no original (ex: "New York")
    pub text: String,
    pub category: EntityCategory,
    /// Índice da primeira palavra (na lista de palavras fundidas)
    pub start_word: usize,
    /// Índice da última palavra (inclusivo)
    pub end_word: usize,
    /// Byte inicial no texto original
    pub start: usize,
    /// Byte final no texto original
    pub end: usize,
    /// Confiança média das palavras
    pub confidence: f64,
}

/// Agrupa palavras fundidas em entidades de múltiplas palavras.
///
/// Espera `words` com offsets já validados contra `original_text`.
///
/// # Exemplo
/// `[B-LOC "New", I-LOC "York", O "is", B-PER "Ana"]` → `["New York" (LOC), "Ana" (PER)]`
pub fn group_words(words: &[MergedEntity], original_text: &str) -> Vec<EntitySpan> {
    let mut spans = Vec::new();
    let mut i = 0;

    while i < words.len() {
        let Some(cat) = words[i].label.category() else {
            i += 1;
            continue;
        };

        let start_word = i;
        let mut end_word = i;
        let mut conf_sum = words[i].score;

        // Acumula palavras I-XXX consecutivas da mesma categoria
        let mut j = i + 1;
        while j < words.len() && Tag::is_valid_transition(&words[j - 1].label, &words[j].label) {
            if words[j].label != Tag::Inside(cat) {
                break;
            }
            end_word = j;
            conf_sum += words[j].score;
            j += 1;
        }

        let start = words[start_word].start;
        let end = words[end_word].end;
        let count = end_word - start_word + 1;
        spans.push(EntitySpan {
            text: original_text[start..end].to_string(),
            category: cat,
            start_word,
            end_word,
            start,
            end,
            confidence: conf_sum / count as f64,
        });

        i = j;
    }

    spans
}
