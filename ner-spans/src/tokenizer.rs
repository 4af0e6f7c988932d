//! # Tokenizador WordPiece
//!
//! Reproduz o esquema de tokenização dos modelos BERT para o tagger offline:
//!
//! 1. **Pré-tokenização**: o texto é quebrado nas fronteiras de palavra Unicode
//!    (UAX #29); espaços são descartados e cada sinal de pontuação vira uma
//!    palavra própria.
//! 2. **WordPiece**: cada palavra é dividida de forma gulosa pelo maior prefixo
//!    presente no vocabulário. Pedaços após o primeiro levam o prefixo `##`.
//!
//! ## Exemplo
//!
//! ```rust
//! use ner_spans::tokenizer::WordPieceTokenizer;
//!
//! let tokenizer = WordPieceTokenizer::new(["Wash", "##ington", "visited"]);
//! let pieces = tokenizer.tokenize("Washington");
//! let texts: Vec<&str> = pieces.iter().map(|p| p.text.as_str()).collect();
//! assert_eq!(texts, vec!["Wash", "##ington"]);
//! ```
//!
//! Cada pedaço preserva o intervalo de bytes que ocupa no texto original.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::merge::CONTINUATION_MARKER;

/// Token desconhecido (palavra longa demais para o vocabulário).
pub const UNK_TOKEN: &str = "[UNK]";

/// Uma palavra da pré-tokenização.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    /// Índice de byte inicial no texto original (inclusive).
    pub start: usize,
    /// Índice de byte final no texto original (exclusivo).
    pub end: usize,
    /// Índice sequencial da palavra (0, 1, 2...).
    pub index: usize,
}

/// Um pedaço WordPiece de uma palavra.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    /// Texto do pedaço, com `##` quando continua a palavra.
    pub text: String,
    pub start: usize,
    pub end: usize,
    /// Palavra de origem (índice em [`pre_tokenize`]).
    pub word_index: usize,
}

/// Quebra o texto em palavras e pontuações, descartando espaços.
pub fn pre_tokenize(text: &str) -> Vec<Word> {
    text.split_word_bound_indices()
        .filter(|(_, w)| !w.chars().all(char::is_whitespace))
        .enumerate()
        .map(|(index, (start, w))| Word {
            text: w.to_string(),
            start,
            end: start + w.len(),
            index,
        })
        .collect()
}

/// Tokenizador WordPiece guloso (maior prefixo primeiro).
#[derive(Debug, Clone)]
pub struct WordPieceTokenizer {
    vocab: HashSet<String>,
    max_chars_per_word: usize,
}

impl WordPieceTokenizer {
    pub fn new<I, S>(vocab: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            vocab: vocab.into_iter().map(Into::into).collect(),
            max_chars_per_word: 100,
        }
    }

    /// Palavras com mais caracteres que o limite viram um único `[UNK]`.
    pub fn with_max_chars_per_word(mut self, max: usize) -> Self {
        self.max_chars_per_word = max;
        self
    }

    /// Tokeniza o texto inteiro em pedaços WordPiece.
    pub fn tokenize(&self, text: &str) -> Vec<Piece> {
        pre_tokenize(text)
            .iter()
            .flat_map(|word| self.split_word(word))
            .collect()
    }

    /// Divide uma palavra em pedaços.
    ///
    /// Quando nenhum prefixo do vocabulário casa na posição corrente, o
    /// pedaço cai para um único caractere (o vocabulário BERT contém todos os
    /// caracteres, com e sem `##`).
    pub fn split_word(&self, word: &Word) -> Vec<Piece> {
        if word.text.chars().count() > self.max_chars_per_word {
            return vec![Piece {
                text: UNK_TOKEN.to_string(),
                start: word.start,
                end: word.end,
                word_index: word.index,
            }];
        }

        // Fronteiras de caractere dentro da palavra (bytes relativos)
        let bounds: Vec<usize> = word
            .text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(word.text.len()))
            .collect();

        let mut pieces = Vec::new();
        let mut from = 0usize;
        while from + 1 < bounds.len() {
            let prefix = if from == 0 { "" } else { CONTINUATION_MARKER };
            let mut to = bounds.len() - 1;
            let mut matched = None;
            while to > from {
                let candidate = format!("{prefix}{}", &word.text[bounds[from]..bounds[to]]);
                if self.vocab.contains(&candidate) {
                    matched = Some(candidate);
                    break;
                }
                to -= 1;
            }
            let (text, to) = match matched {
                Some(text) => (text, to),
                None => {
                    let single = &word.text[bounds[from]..bounds[from + 1]];
                    (format!("{prefix}{single}"), from + 1)
                }
            };
            pieces.push(Piece {
                text,
                start: word.start + bounds[from],
                end: word.start + bounds[to],
                word_index: word.index,
            });
            from = to;
        }
        pieces
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(pieces: &[Piece]) -> Vec<&str> {
        pieces.iter().map(|p| p.text.as_str()).collect()
    }

    #[test]
    fn test_pre_tokenize_drops_spaces_and_splits_punctuation() {
        let words = pre_tokenize("Hi, Paris!  Ok");
        let w: Vec<&str> = words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(w, vec!["Hi", ",", "Paris", "!", "Ok"]);
        assert_eq!((words[2].start, words[2].end), (4, 9));
        assert_eq!(words[4].index, 4);
    }

    #[test]
    fn test_wordpiece_longest_match() {
        let tok = WordPieceTokenizer::new(["Wash", "Washing", "##ington", "##ton"]);
        let pieces = tok.tokenize("Washington");
        assert_eq!(texts(&pieces), vec!["Washing", "##ton"]);
        assert_eq!((pieces[1].start, pieces[1].end), (7, 10));
    }

    #[test]
    fn test_wordpiece_falls_back_to_characters() {
        let tok = WordPieceTokenizer::new(["Ab"]);
        let pieces = tok.tokenize("Abcé");
        assert_eq!(texts(&pieces), vec!["Ab", "##c", "##é"]);
        assert_eq!((pieces[2].start, pieces[2].end), (3, 5));
    }

    #[test]
    fn test_long_word_is_unknown() {
        let tok = WordPieceTokenizer::new(["a"]).with_max_chars_per_word(3);
        let pieces = tok.tokenize("abcd ab");
        assert_eq!(texts(&pieces), vec!["[UNK]", "a", "##b"]);
        assert_eq!((pieces[0].start, pieces[0].end), (0, 4));
    }

    #[test]
    fn test_pieces_cover_words_contiguously() {
        let tok = WordPieceTokenizer::new(["Ams", "##ter", "##dam"]);
        let pieces = tok.tokenize("to Amsterdam");
        for pair in pieces.windows(2) {
            if pair[0].word_index == pair[1].word_index {
                assert_eq!(pair[0].end, pair[1].start);
            }
        }
        assert_eq!(texts(&pieces), vec!["t", "##o", "Ams", "##ter", "##dam"]);
    }
}
