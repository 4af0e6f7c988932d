//! # Apresentação dos rótulos (cor e nome legível)
//!
//! Duas tabelas com comportamentos assimétricos:
//!
//! - [`color_of`] é **total**: qualquer rótulo sem cor (o `O` de fundo, ou um
//!   rótulo desconhecido) recebe o branco neutro. Tokens de fundo são o caso
//!   comum, não um erro.
//! - [`display_name_of`] só é definido para as oito tags de entidade. `O` ou
//!   um rótulo fora do conjunto fechado é erro de integridade; o pipeline
//!   filtra palavras `O` antes de chegar aqui.

use crate::error::{NerError, Result};
use crate::tagger::Tag;

/// Cor neutra para rótulos sem categoria.
pub const DEFAULT_COLOR: &str = "white";

/// Cor de fundo CSS do rótulo; nunca falha.
pub fn color_of(label: &str) -> &'static str {
    Tag::from_label(label)
        .ok()
        .and_then(|tag| tag.category())
        .map(|cat| cat.color())
        .unwrap_or(DEFAULT_COLOR)
}

/// Nome legível do rótulo (B- e I- colapsam no mesmo nome).
pub fn display_name_of(label: &str) -> Result<&'static str> {
    match Tag::from_label(label)? {
        Tag::Outside => Err(NerError::NotAnEntity(label.to_string())),
        Tag::Begin(cat) | Tag::Inside(cat) => Ok(cat.display_name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_defaults_to_white() {
        assert_eq!(color_of("O"), "white");
        assert_eq!(color_of("UNKNOWN"), "white");
        assert_eq!(color_of(""), DEFAULT_COLOR);
    }

    #[test]
    fn test_color_per_category() {
        assert_eq!(color_of("B-ORG"), "lightblue");
        assert_eq!(color_of("I-ORG"), "lightblue");
        assert_eq!(color_of("B-PER"), "lightgreen");
        assert_eq!(color_of("I-LOC"), "lightcoral");
        assert_eq!(color_of("B-MISC"), "lightgoldenrodyellow");
    }

    #[test]
    fn test_display_names() {
        assert_eq!(display_name_of("B-ORG"), Ok("Organization"));
        assert_eq!(display_name_of("I-ORG"), Ok("Organization"));
        assert_eq!(display_name_of("B-PER"), Ok("Person"));
        assert_eq!(display_name_of("I-PER"), Ok("Person"));
        assert_eq!(display_name_of("B-LOC"), Ok("Location"));
        assert_eq!(display_name_of("I-MISC"), Ok("Miscellaneous"));
    }

    #[test]
    fn test_display_name_fails_loudly() {
        assert_eq!(display_name_of("O"), Err(NerError::NotAnEntity("O".to_string())));
        assert_eq!(
            display_name_of("B-DATE"),
            Err(NerError::UnknownLabel("B-DATE".to_string()))
        );
    }
}
