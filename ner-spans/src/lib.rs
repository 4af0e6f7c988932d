//! # ner-spans: Reconstrução de entidades a partir de tokens sub-palavra
//!
//! Modelos BERT de NER rotulam **pedaços** de palavras (WordPiece), não
//! palavras inteiras: "Washington" chega como `Wash` (B-LOC) + `##ington`
//! (I-LOC). Este crate transforma essa saída em entidades legíveis e destaca
//! cada uma sobre o texto original, sem perder, duplicar ou reordenar texto.
//!
//! ## Arquitetura do Sistema
//!
//! 1.  **Entrada**: texto bruto + um [`Tagger`] injetado (o modelo, visto como
//!     uma função `texto → tokens`).
//! 2.  **Validação** ([`token`]): offsets dentro do texto, em ordem, sem sobreposição.
//! 3.  **Fusão** ([`merge`]): fragmentos `##` anexados à palavra líder; o rótulo
//!     é sempre o do líder.
//! 4.  **Apresentação** ([`palette`]): cor (total, com branco como padrão) e nome
//!     legível (falha para `O`).
//! 5.  **Destaque** ([`highlight`]): percurso por offsets sobre o texto original.
//! 6.  **Agrupamento** ([`span`]): `B-X I-X` viram entidades de várias palavras.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use ner_spans::{NerPipeline, Tag, Token, EntityCategory};
//!
//! // Um tagger falso: qualquer closure `Fn(&str) -> Result<Vec<Token>>` serve
//! let tagger = |_: &str| -> ner_spans::Result<Vec<Token>> {
//!     Ok(vec![
//!         Token::new("Wash", Tag::Begin(EntityCategory::Loc), 0, 4),
//!         Token::new("##ington", Tag::Inside(EntityCategory::Loc), 4, 10),
//!         Token::new("won", Tag::Outside, 11, 14),
//!     ])
//! };
//!
//! let pipeline = NerPipeline::new(tagger);
//! let analysis = pipeline.analyze("Washington won").unwrap();
//!
//! assert_eq!(analysis.legend[0].word, "Washington");
//! assert_eq!(analysis.legend[0].display_name, "Location");
//! assert_eq!(analysis.document.plain_text(), "Washington won");
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: orquestrador e as funções `build_legend` / `build_highlighted_document`.
//! - [`lexicon`]: tagger offline (gazetteer + [`tokenizer`] WordPiece) para testes e demonstração.

pub mod error;
pub mod highlight;
pub mod lexicon;
pub mod merge;
pub mod palette;
pub mod pipeline;
pub mod span;
pub mod tagger;
pub mod token;
pub mod tokenizer;

pub use error::{NerError, Result};
pub use highlight::{highlight, HighlightedDocument, Segment};
pub use lexicon::LexiconTagger;
pub use merge::{merge_fragments, MergedEntity, CONTINUATION_MARKER};
pub use palette::{color_of, display_name_of, DEFAULT_COLOR};
pub use pipeline::{
    build_highlighted_document, build_legend, reconstruct, Analysis, LegendEntry, NerPipeline,
};
pub use span::EntitySpan;
pub use tagger::{EntityCategory, Tag, Tagger};
pub use token::{tokens_from_pipeline, PipelinePrediction, Token};
