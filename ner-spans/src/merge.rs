//! # Fusão de fragmentos sub-palavra
//!
//! Tokenizers WordPiece quebram palavras raras em pedaços: "Washington" vira
//! `["Wash", "##ington"]`. Este módulo junta cada fragmento líder com as
//! continuações que o seguem, produzindo uma [`MergedEntity`] por palavra.
//!
//! ## Regras
//!
//! 1. Fragmento com `##` colado à palavra corrente: o marcador é removido e o
//!    restante é anexado. Rótulo e `start` **não** mudam; `end` passa a ser o
//!    do fragmento.
//! 2. Fragmento sem `##`: fecha a palavra corrente (se houver) e abre outra
//!    com texto, rótulo e `start` do fragmento.
//! 3. Ao final, a palavra corrente é emitida.
//!
//! O rótulo de uma palavra é sempre o do fragmento líder: no esquema BIO a tag
//! semântica fica no primeiro pedaço, e as continuações apenas repetem ou
//! degradam a tag.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::tagger::Tag;
use crate::token::Token;

/// Prefixo que marca um fragmento de continuação.
pub const CONTINUATION_MARKER: &str = "##";

/// O fragmento continua a palavra anterior?
pub fn is_continuation(fragment: &str) -> bool {
    fragment.starts_with(CONTINUATION_MARKER)
}

/// Remove o marcador de continuação (se presente).
pub fn strip_continuation(fragment: &str) -> &str {
    fragment.strip_prefix(CONTINUATION_MARKER).unwrap_or(fragment)
}

/// Uma palavra inteira reconstruída a partir dos seus fragmentos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedEntity {
    /// Fragmento líder + continuações sem o marcador (ex: "Washington").
    pub word: String,
    /// Rótulo herdado do fragmento líder.
    pub label: Tag,
    /// Byte inicial do fragmento líder.
    pub start: usize,
    /// Byte final do último fragmento do grupo.
    pub end: usize,
    /// Confiança do fragmento líder.
    pub score: f64,
}

impl MergedEntity {
    fn open(token: &Token, word: &str) -> Self {
        Self {
            word: word.to_string(),
            label: token.label,
            start: token.start,
            end: token.end,
            score: token.score,
        }
    }

    /// Intervalo de bytes coberto pela palavra.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// Junta os fragmentos de continuação às suas palavras líderes.
///
/// A saída preserva a ordem dos fragmentos líderes. Uma continuação só se
/// anexa se começar exatamente onde a palavra corrente termina. Uma sequência
/// que começa com continuação, ou uma continuação separada da palavra anterior
/// (saída malformada do tagger), não tem a quem se anexar: o fragmento vira
/// uma palavra nova, com o marcador removido. É um caso com perda conhecida,
/// registrado em `warn`; [`validate_tokens`](crate::token::validate_tokens)
/// rejeita o segundo caso antes da fusão.
pub fn merge_fragments(tokens: &[Token]) -> Vec<MergedEntity> {
    let mut merged = Vec::new();
    let mut current: Option<MergedEntity> = None;

    for token in tokens {
        if is_continuation(&token.fragment) {
            let rest = strip_continuation(&token.fragment);
            if let Some(word) = current.as_mut().filter(|w| w.end == token.start) {
                word.word.push_str(rest);
                word.end = token.end;
                continue;
            }
            match current.take() {
                Some(word) => {
                    warn!(
                        fragment = %token.fragment,
                        start = token.start,
                        previous_end = word.end,
                        "continuation fragment detached from the previous word; starting a new word"
                    );
                    merged.push(word);
                }
                None => warn!(
                    fragment = %token.fragment,
                    start = token.start,
                    "continuation fragment with no preceding word; starting a new word"
                ),
            }
            current = Some(MergedEntity::open(token, rest));
        } else {
            if let Some(word) = current.take() {
                merged.push(word);
            }
            current = Some(MergedEntity::open(token, &token.fragment));
        }
    }

    if let Some(word) = current {
        merged.push(word);
    }

    debug!(tokens = tokens.len(), words = merged.len(), "fragments merged");
    merged
}
