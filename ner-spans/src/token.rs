//! # Tokens sub-palavra produzidos pelo tagger
//!
//! Cada [`Token`] é um pedaço (WordPiece) do texto original com seu rótulo BIO e
//! seu intervalo de bytes `[start, end)`. Fragmentos de continuação trazem o
//! prefixo `##` (ex: "Wash", "##ington").
//!
//! O pipeline `ner` da biblioteca transformers devolve offsets em **caracteres**
//! (índices de string Python). Em Rust o texto é fatiado por **bytes**, então
//! [`tokens_from_pipeline`] converte os offsets na fronteira, antes que
//! qualquer token chegue ao reconstrutor.

use serde::{Deserialize, Serialize};

use crate::error::{NerError, Result};
use crate::merge::is_continuation;
use crate::tagger::Tag;

/// Um token sub-palavra rotulado pelo modelo.
///
/// `start`/`end` são offsets de byte no texto original, referentes ao pedaço
/// **antes** da remoção do marcador de continuação.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Texto exibido do fragmento (ex: "Wash", "##ington", "[UNK]").
    pub fragment: String,
    /// Rótulo BIO do fragmento.
    pub label: Tag,
    /// Byte inicial no texto original (inclusive).
    pub start: usize,
    /// Byte final no texto original (exclusivo).
    pub end: usize,
    /// Confiança do modelo para o rótulo (0.0 a 1.0).
    pub score: f64,
    /// Posição do fragmento na sequência do modelo.
    pub index: usize,
}

impl Token {
    /// Cria um token com confiança 1.0 e índice 0 (útil em testes e fakes).
    pub fn new(fragment: impl Into<String>, label: Tag, start: usize, end: usize) -> Self {
        Self {
            fragment: fragment.into(),
            label,
            start,
            end,
            score: 1.0,
            index: 0,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }
}

/// Verifica o contrato da saída do tagger sobre `text`.
///
/// Rejeita (sem tentar corrigir):
/// - `start > end`
/// - offsets além do fim do texto ou fora de fronteira de caractere UTF-8
/// - `start` menor que o `start` do token anterior
/// - token que começa antes do fim do anterior
/// - continuação `##` separada do token anterior por texto não rotulado
pub fn validate_tokens(text: &str, tokens: &[Token]) -> Result<()> {
    let mut previous: Option<&Token> = None;

    for (i, token) in tokens.iter().enumerate() {
        if token.start > token.end {
            return Err(NerError::InvalidRange {
                index: i,
                fragment: token.fragment.clone(),
                start: token.start,
                end: token.end,
            });
        }
        for offset in [token.start, token.end] {
            if offset > text.len() {
                return Err(NerError::OutOfBounds {
                    index: i,
                    offset,
                    len: text.len(),
                });
            }
            if !text.is_char_boundary(offset) {
                return Err(NerError::NotCharBoundary { index: i, offset });
            }
        }
        if let Some(prev) = previous {
            if token.start < prev.start {
                return Err(NerError::NonMonotonic {
                    index: i,
                    start: token.start,
                    previous: prev.start,
                });
            }
            if token.start < prev.end {
                return Err(NerError::Overlapping {
                    index: i,
                    start: token.start,
                    previous_end: prev.end,
                });
            }
            if is_continuation(&token.fragment) && token.start != prev.end {
                return Err(NerError::DetachedContinuation {
                    index: i,
                    fragment: token.fragment.clone(),
                    start: token.start,
                    previous_end: prev.end,
                });
            }
        }
        previous = Some(token);
    }
    Ok(())
}

/// Uma predição no formato JSON do pipeline `ner` (sem agregação).
///
/// ```json
/// {"entity": "B-LOC", "score": 0.998, "index": 1, "word": "Wash", "start": 0, "end": 4}
/// ```
///
/// `start`/`end` são offsets de **caractere** e podem vir `null` quando o
/// tokenizer não fornece mapeamento de offsets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelinePrediction {
    pub entity: String,
    #[serde(default = "default_score")]
    pub score: f64,
    #[serde(default)]
    pub index: usize,
    pub word: String,
    #[serde(default)]
    pub start: Option<usize>,
    #[serde(default)]
    pub end: Option<usize>,
}

fn default_score() -> f64 {
    1.0
}

/// Converte predições do pipeline em [`Token`]s com offsets de byte.
///
/// Falha se algum rótulo estiver fora do conjunto fechado, se faltar offset
/// ou se um offset de caractere exceder o texto.
pub fn tokens_from_pipeline(
    text: &str,
    predictions: &[PipelinePrediction],
) -> Result<Vec<Token>> {
    let char_to_byte = build_char_to_byte_map(text);
    let char_len = char_to_byte.len() - 1;

    predictions
        .iter()
        .enumerate()
        .map(|(i, pred)| {
            let label = Tag::from_label(&pred.entity)?;
            let (start_char, end_char) = match (pred.start, pred.end) {
                (Some(s), Some(e)) => (s, e),
                _ => return Err(NerError::MissingOffsets(i)),
            };
            for offset in [start_char, end_char] {
                if offset > char_len {
                    return Err(NerError::OutOfBounds {
                        index: i,
                        offset,
                        len: char_len,
                    });
                }
            }
            Ok(Token {
                fragment: pred.word.clone(),
                label,
                start: char_to_byte[start_char],
                end: char_to_byte[end_char],
                score: pred.score,
                index: pred.index,
            })
        })
        .collect()
}

/// Decodifica o corpo JSON do pipeline e converte para tokens.
pub fn parse_pipeline_json(text: &str, json: &str) -> Result<Vec<Token>> {
    let predictions: Vec<PipelinePrediction> = serde_json::from_str(json)
        .map_err(|e| NerError::Tagger(format!("invalid pipeline output: {e}")))?;
    tokens_from_pipeline(text, &predictions)
}

/// Tabela índice-de-caractere → offset de byte, com uma entrada extra para o fim.
fn build_char_to_byte_map(text: &str) -> Vec<usize> {
    let mut map = Vec::with_capacity(text.len() + 1);
    map.extend(text.char_indices().map(|(byte_idx, _)| byte_idx));
    map.push(text.len());
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::EntityCategory;

    fn loc(fragment: &str, start: usize, end: usize) -> Token {
        Token::new(fragment, Tag::Begin(EntityCategory::Loc), start, end)
    }

    #[test]
    fn test_validate_accepts_well_formed_tokens() {
        let text = "Washington DC";
        let tokens = vec![loc("Wash", 0, 4), loc("##ington", 4, 10), loc("DC", 11, 13)];
        assert_eq!(validate_tokens(text, &tokens), Ok(()));
        assert_eq!(validate_tokens("", &[]), Ok(()));
    }

    #[test]
    fn test_validate_rejects_out_of_bounds() {
        let err = validate_tokens("Paris", &[loc("Paris", 0, 9)]).unwrap_err();
        assert_eq!(err, NerError::OutOfBounds { index: 0, offset: 9, len: 5 });
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let err = validate_tokens("Paris", &[loc("Paris", 4, 2)]).unwrap_err();
        assert!(matches!(err, NerError::InvalidRange { index: 0, start: 4, end: 2, .. }));
    }

    #[test]
    fn test_validate_rejects_non_monotonic_and_overlap() {
        let text = "Paris loves Paris";
        let err = validate_tokens(text, &[loc("Paris", 12, 17), loc("Paris", 0, 5)]).unwrap_err();
        assert_eq!(err, NerError::NonMonotonic { index: 1, start: 0, previous: 12 });

        let err = validate_tokens(text, &[loc("Paris", 0, 5), loc("ris", 2, 5)]).unwrap_err();
        assert_eq!(err, NerError::Overlapping { index: 1, start: 2, previous_end: 5 });
    }

    #[test]
    fn test_validate_rejects_continuation_detached_from_its_leader() {
        // o líder "cat" (O) foi filtrado pelo tagger; "##s" não pertence a "Paris"
        let text = "Paris loves cats";
        let tokens = vec![
            loc("Paris", 0, 5),
            Token::new("##s", Tag::Inside(EntityCategory::Loc), 15, 16),
        ];
        let err = validate_tokens(text, &tokens).unwrap_err();
        assert_eq!(
            err,
            NerError::DetachedContinuation {
                index: 1,
                fragment: "##s".to_string(),
                start: 15,
                previous_end: 5,
            }
        );

        // continuação vazia colada ao líder continua válida
        let tokens = vec![loc("Ber", 0, 3), loc("##", 3, 3), loc("##lin", 3, 6)];
        assert_eq!(validate_tokens("Berlin", &tokens), Ok(()));
    }

    #[test]
    fn test_validate_rejects_split_utf8_char() {
        // "é" ocupa os bytes 1..3
        let err = validate_tokens("Zé", &[loc("Z", 0, 2)]).unwrap_err();
        assert_eq!(err, NerError::NotCharBoundary { index: 0, offset: 2 });
    }

    #[test]
    fn test_pipeline_char_offsets_become_byte_offsets() {
        let text = "São Paulo";
        let preds = vec![
            PipelinePrediction {
                entity: "B-LOC".into(),
                score: 0.99,
                index: 1,
                word: "São".into(),
                start: Some(0),
                end: Some(3),
            },
            PipelinePrediction {
                entity: "I-LOC".into(),
                score: 0.98,
                index: 2,
                word: "Paulo".into(),
                start: Some(4),
                end: Some(9),
            },
        ];
        let tokens = tokens_from_pipeline(text, &preds).unwrap();
        assert_eq!((tokens[0].start, tokens[0].end), (0, 4));
        assert_eq!((tokens[1].start, tokens[1].end), (5, 10));
        assert_eq!(&text[tokens[1].start..tokens[1].end], "Paulo");
        assert_eq!(tokens[1].index, 2);
    }

    #[test]
    fn test_pipeline_json_with_raw_labels() {
        let text = "Washington";
        let json = r###"[
            {"entity": "LABEL_5", "score": 0.97, "index": 1, "word": "Wash", "start": 0, "end": 4},
            {"entity": "LABEL_6", "score": 0.91, "index": 2, "word": "##ington", "start": 4, "end": 10}
        ]"###;
        let tokens = parse_pipeline_json(text, json).unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].label, Tag::Begin(EntityCategory::Loc));
        assert_eq!(tokens[1].label, Tag::Inside(EntityCategory::Loc));
        assert_eq!(tokens[1].fragment, "##ington");
    }

    #[test]
    fn test_pipeline_rejects_missing_offsets_and_bad_labels() {
        let json = r#"[{"entity": "B-PER", "word": "Ana", "start": null, "end": null}]"#;
        assert_eq!(parse_pipeline_json("Ana", json), Err(NerError::MissingOffsets(0)));

        let json = r#"[{"entity": "B-DATE", "word": "Ana", "start": 0, "end": 3}]"#;
        assert_eq!(
            parse_pipeline_json("Ana", json),
            Err(NerError::UnknownLabel("B-DATE".to_string()))
        );

        let json = r#"[{"entity": "B-PER", "word": "Ana", "start": 0, "end": 7}]"#;
        assert!(matches!(
            parse_pipeline_json("Ana", json),
            Err(NerError::OutOfBounds { offset: 7, len: 3, .. })
        ));
    }
}
