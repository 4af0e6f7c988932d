//! # Destaque das entidades sobre o texto original
//!
//! O destaque é guiado por **offsets**, nunca por busca de texto. Um cursor
//! percorre o texto original da esquerda para a direita; para cada entidade
//! (em ordem crescente de `start`):
//!
//! 1. copia o trecho intocado `text[cursor..start]`;
//! 2. copia `text[start..end]` embrulhado na marcação de estilo;
//! 3. avança o cursor para `end`.
//!
//! Ao final copia a cauda `text[cursor..]`. Substituir o texto literal de
//! cada palavra ("Paris" → `<span>Paris</span>`) destacaria também as
//! ocorrências que não são entidade, e quebra quando uma entidade é
//! substring de outra.

use serde::Serialize;

use crate::error::{NerError, Result};
use crate::merge::MergedEntity;
use crate::palette::color_of;
use crate::tagger::Tag;

/// Um trecho do documento destacado.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    /// Texto fora de entidades, copiado literalmente.
    Plain { text: String },
    /// Texto de uma entidade com sua cor.
    Entity {
        text: String,
        label: Tag,
        color: &'static str,
    },
}

impl Segment {
    pub fn text(&self) -> &str {
        match self {
            Segment::Plain { text } | Segment::Entity { text, .. } => text,
        }
    }
}

/// O texto original particionado em trechos intocados e entidades.
///
/// Concatenar os trechos na ordem reproduz o texto original byte a byte.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HighlightedDocument {
    segments: Vec<Segment>,
}

impl HighlightedDocument {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn entity_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Entity { .. }))
            .count()
    }

    /// O texto sem marcação (igual ao texto original).
    pub fn plain_text(&self) -> String {
        self.segments.iter().map(Segment::text).collect()
    }

    /// Renderiza com cada entidade embrulhada em `<span style=...>`.
    /// Trechos intocados saem literalmente.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Plain { text } => out.push_str(text),
                Segment::Entity { text, color, .. } => out.push_str(&wrap(text, color)),
            }
        }
        out
    }

    fn push_plain(&mut self, text: &str) {
        if !text.is_empty() {
            self.segments.push(Segment::Plain { text: text.to_string() });
        }
    }
}

/// Embrulha um trecho na marcação de destaque com a cor dada.
pub fn wrap(text: &str, color: &str) -> String {
    format!(
        "<span style='background-color: {color}; padding: 2px 4px; \
         border-radius: 3px;'>{text}</span>"
    )
}

/// Particiona `text` destacando as entidades pelos seus offsets.
///
/// As entidades devem estar em ordem crescente, sem sobreposição, dentro do
/// texto e em fronteiras de caractere. Qualquer violação é erro.
pub fn highlight(text: &str, entities: &[MergedEntity]) -> Result<HighlightedDocument> {
    let mut doc = HighlightedDocument::default();
    let mut cursor = 0usize;

    for (i, entity) in entities.iter().enumerate() {
        check_range(text, i, entity, cursor)?;

        doc.push_plain(&text[cursor..entity.start]);
        doc.segments.push(Segment::Entity {
            text: text[entity.start..entity.end].to_string(),
            label: entity.label,
            color: color_of(&entity.label.label()),
        });
        cursor = entity.end;
    }
    doc.push_plain(&text[cursor..]);

    Ok(doc)
}

fn check_range(text: &str, index: usize, entity: &MergedEntity, cursor: usize) -> Result<()> {
    if entity.start > entity.end {
        return Err(NerError::InvalidRange {
            index,
            fragment: entity.word.clone(),
            start: entity.start,
            end: entity.end,
        });
    }
    for offset in [entity.start, entity.end] {
        if offset > text.len() {
            return Err(NerError::OutOfBounds {
                index,
                offset,
                len: text.len(),
            });
        }
        if !text.is_char_boundary(offset) {
            return Err(NerError::NotCharBoundary { index, offset });
        }
    }
    if entity.start < cursor {
        return Err(NerError::Overlapping {
            index,
            start: entity.start,
            previous_end: cursor,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::EntityCategory;

    fn entity(word: &str, label: Tag, start: usize) -> MergedEntity {
        MergedEntity {
            word: word.to_string(),
            label,
            start,
            end: start + word.len(),
            score: 1.0,
        }
    }

    #[test]
    fn test_repeated_word_only_highlights_tagged_occurrence() {
        let text = "Paris loves Paris";
        let paris = entity("Paris", Tag::Begin(EntityCategory::Loc), 12);
        let doc = highlight(text, &[paris]).unwrap();
        assert_eq!(doc.render(), format!("Paris loves {}", wrap("Paris", "lightcoral")));
        assert!(doc.render().ends_with(
            "<span style='background-color: lightcoral; padding: 2px 4px; \
             border-radius: 3px;'>Paris</span>"
        ));
        assert_eq!(doc.entity_count(), 1);
        assert_eq!(doc.plain_text(), text);
    }

    #[test]
    fn test_substring_entities_do_not_interfere() {
        // "York" é substring de "New York"; cada um é destacado só no seu offset
        let text = "New York and York";
        let entities = vec![
            entity("New", Tag::Begin(EntityCategory::Loc), 0),
            entity("York", Tag::Inside(EntityCategory::Loc), 4),
            entity("York", Tag::Begin(EntityCategory::Loc), 13),
        ];
        let doc = highlight(text, &entities).unwrap();
        let texts: Vec<&str> = doc.segments().iter().map(Segment::text).collect();
        assert_eq!(texts, vec!["New", " ", "York", " and ", "York"]);
        assert_eq!(doc.entity_count(), 3);
    }

    #[test]
    fn test_no_entities_is_identity() {
        let doc = highlight("nothing to see", &[]).unwrap();
        assert_eq!(doc.render(), "nothing to see");
        assert_eq!(highlight("", &[]).unwrap().render(), "");
        assert!(highlight("", &[]).unwrap().segments().is_empty());
    }

    #[test]
    fn test_uses_source_text_not_fragment_text() {
        // Modelo uncased: a palavra vem minúscula, o destaque preserva o original
        let text = "visit BERLIN now";
        let mut e = entity("berlin", Tag::Begin(EntityCategory::Loc), 6);
        e.end = 12;
        let doc = highlight(text, &[e]).unwrap();
        assert_eq!(doc.segments()[1].text(), "BERLIN");
    }

    #[test]
    fn test_rejects_overlap_and_out_of_bounds() {
        let text = "Paris loves Paris";
        let loc = Tag::Begin(EntityCategory::Loc);
        let entities = [entity("Paris", loc, 12), entity("Paris", loc, 0)];
        let err = highlight(text, &entities).unwrap_err();
        assert_eq!(err, NerError::Overlapping { index: 1, start: 0, previous_end: 17 });

        let err = highlight(text, &[entity("Parisian", loc, 12)]).unwrap_err();
        assert_eq!(err, NerError::OutOfBounds { index: 0, offset: 20, len: 17 });
    }

    #[test]
    fn test_markup_is_not_escaped_by_core() {
        let text = "a <b> c";
        let doc = highlight(text, &[]).unwrap();
        assert_eq!(doc.render(), text);
    }
}
