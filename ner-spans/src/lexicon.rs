//! # Tagger offline: Gazetteers + WordPiece
//!
//! Um substituto determinístico do modelo de token classification, usado
//! pelos testes e pelo modo offline do visualizador. Produz exatamente o
//! formato que o modelo real produz: fragmentos WordPiece com `##`, rótulos
//! BIO e offsets de byte.
//!
//! ## Como rotula
//!
//! 1. O texto é pré-tokenizado em palavras ([`pre_tokenize`]).
//! 2. Um gazetteer de entidades conhecidas (n-gramas, sem diferenciar
//!    maiúsculas) marca as palavras: a primeira com `B-X`, as seguintes com
//!    `I-X`. O casamento mais longo vence.
//! 3. Cada palavra é dividida em pedaços WordPiece. O pedaço líder recebe a
//!    tag da palavra; as continuações recebem `I-X` (ou `O`), como um modelo
//!    BERT costuma prever.

use crate::error::Result;
use crate::tagger::{EntityCategory, Tag, Tagger};
use crate::token::Token;
use crate::tokenizer::{pre_tokenize, Word, WordPieceTokenizer};

/// Confiança atribuída a palavras fora de qualquer entidade.
const OUTSIDE_CONFIDENCE: f64 = 0.99;

/// Uma correspondência do gazetteer: qual tag a palavra recebeu
#[derive(Debug, Clone, PartialEq)]
pub struct GazetteerMatch {
    pub word_index: usize,
    pub tag: Tag,
    pub confidence: f64,
}

/// Listas de entidades conhecidas por categoria.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    /// (partes em lowercase, categoria)
    entries: Vec<(Vec<String>, EntityCategory)>,
}

impl Gazetteer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adiciona uma entidade; nomes com várias palavras são casados como n-grama.
    pub fn add(&mut self, category: EntityCategory, name: &str) {
        let parts: Vec<String> = pre_tokenize(name)
            .into_iter()
            .map(|w| w.text.to_lowercase())
            .collect();
        if !parts.is_empty() {
            self.entries.push((parts, category));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Aplica o gazetteer à sequência de palavras.
    ///
    /// Retorna um vetor paralelo a `words`; `None` para palavras sem entidade.
    pub fn apply(&self, words: &[Word]) -> Vec<Option<GazetteerMatch>> {
        let lowered: Vec<String> = words.iter().map(|w| w.text.to_lowercase()).collect();
        let mut result: Vec<Option<GazetteerMatch>> = vec![None; words.len()];

        let mut i = 0;
        while i < words.len() {
            let best = self
                .entries
                .iter()
                .filter(|(parts, _)| {
                    i + parts.len() <= words.len()
                        && parts.iter().enumerate().all(|(j, part)| lowered[i + j] == *part)
                })
                .max_by_key(|(parts, _)| parts.len());

            match best {
                Some((parts, cat)) => {
                    for j in 0..parts.len() {
                        result[i + j] = Some(GazetteerMatch {
                            word_index: i + j,
                            tag: if j == 0 { Tag::Begin(*cat) } else { Tag::Inside(*cat) },
                            confidence: category_confidence(*cat),
                        });
                    }
                    i += parts.len();
                }
                None => i += 1,
            }
        }

        result
    }
}

fn category_confidence(cat: EntityCategory) -> f64 {
    match cat {
        EntityCategory::Per => 0.92,
        EntityCategory::Org => 0.93,
        EntityCategory::Loc => 0.90,
        EntityCategory::Misc => 0.88,
    }
}

/// Tagger offline que combina gazetteer e WordPiece.
#[derive(Debug, Clone)]
pub struct LexiconTagger {
    tokenizer: WordPieceTokenizer,
    gazetteer: Gazetteer,
    keep_outside: bool,
}

impl LexiconTagger {
    pub fn new(tokenizer: WordPieceTokenizer, gazetteer: Gazetteer) -> Self {
        Self {
            tokenizer,
            gazetteer,
            keep_outside: true,
        }
    }

    /// Descarta tokens `O` da saída, como o pipeline `ner` faz por padrão.
    pub fn skip_outside(mut self) -> Self {
        self.keep_outside = false;
        self
    }
}

impl Default for LexiconTagger {
    /// Vocabulário e gazetteer de demonstração (inglês, esquema CoNLL-2003).
    fn default() -> Self {
        Self::new(WordPieceTokenizer::new(DEFAULT_VOCAB.iter().copied()), default_gazetteer())
    }
}

impl Tagger for LexiconTagger {
    fn tag(&self, text: &str) -> Result<Vec<Token>> {
        let words = pre_tokenize(text);
        let matches = self.gazetteer.apply(&words);
        let mut tokens = Vec::new();
        // O índice 0 é do [CLS] na sequência do modelo
        let mut index = 1;

        for (word, found) in words.iter().zip(&matches) {
            let (word_tag, confidence) = found
                .as_ref()
                .map(|m| (m.tag, m.confidence))
                .unwrap_or((Tag::Outside, OUTSIDE_CONFIDENCE));

            for (k, piece) in self.tokenizer.split_word(word).into_iter().enumerate() {
                let label = match (k, word_tag.category()) {
                    (0, _) => word_tag,
                    (_, Some(cat)) => Tag::Inside(cat),
                    (_, None) => Tag::Outside,
                };
                if self.keep_outside || label.is_entity() {
                    tokens.push(Token {
                        fragment: piece.text,
                        label,
                        start: piece.start,
                        end: piece.end,
                        score: confidence,
                        index,
                    });
                }
                index += 1;
            }
        }

        Ok(tokens)
    }
}

/// Vocabulário WordPiece de demonstração.
pub const DEFAULT_VOCAB: &[&str] = &[
    // palavras funcionais
    "the", "The", "a", "A", "an", "and", "of", "in", "In", "to", "for", "from", "with", "on", "at",
    "by", "is", "was", "were", "has", "have", "will", "its", "his", "her", "their", "after",
    "before",
    // verbos e substantivos comuns
    "visited", "loves", "met", "said", "signed", "works", "lives", "moved", "announced", "won",
    "played", "capital", "city", "company", "deal", "team", "summit", "president", "minister",
    "office", "final", "new", "New", "week", "year",
    // entidades inteiras
    "Paris", "London", "Berlin", "York", "France", "Germany", "Brazil", "Angela", "Merkel",
    "John", "Smith", "Apple", "Microsoft", "United", "Nations", "European", "Union", "World", "Cup",
    "French", "German", "English", "Olympics",
    // pedaços de palavras raras
    "Wash", "##ington", "Goo", "##gle", "Ams", "##ter", "##dam", "Ze", "##lens", "##ky", "Bun",
    "##des", "##liga", "Vol", "##ody", "##myr", "Ki", "##ev", "##yiv", "Neu", "##rIPS",
    // sufixos frequentes
    "##s", "##ed", "##ing", "##er", "##ly", "##ian",
    // pontuação
    ".", ",", "!", "?", ";", ":", "'", "\"", "(", ")", "-",
];

/// Gazetteer de demonstração.
pub fn default_gazetteer() -> Gazetteer {
    let mut gaz = Gazetteer::new();
    for name in ["Angela Merkel", "John Smith", "Zelensky", "Volodymyr Zelensky"] {
        gaz.add(EntityCategory::Per, name);
    }
    for name in [
        "Google", "Apple", "Microsoft", "United Nations", "European Union", "Bundesliga",
    ] {
        gaz.add(EntityCategory::Org, name);
    }
    for name in [
        "Paris", "London", "Berlin", "New York", "Washington", "Amsterdam", "France", "Germany",
        "Brazil", "Kiev", "Kyiv",
    ] {
        gaz.add(EntityCategory::Loc, name);
    }
    for name in ["World Cup", "Olympics", "French", "German", "English", "NeurIPS"] {
        gaz.add(EntityCategory::Misc, name);
    }
    gaz
}

/// Textos de demonstração para a interface web
pub fn demo_texts() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "Sub-word",
            "Washington signed a deal with Google in Amsterdam after the Bundesliga final.",
        ),
        (
            "Repeated words",
            "Paris loves Paris, but the Paris office moved to London.",
        ),
        (
            "Multi-word",
            "Angela Merkel met John Smith at the United Nations summit in New York.",
        ),
        (
            "Politics",
            "Volodymyr Zelensky visited Berlin and Paris before the European Union summit in Kyiv.",
        ),
        (
            "Sports",
            "The French team won the World Cup and the German team played in the Olympics.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gazetteer_longest_match_wins() {
        let words = pre_tokenize("Volodymyr Zelensky spoke");
        let matches = default_gazetteer().apply(&words);
        assert_eq!(matches[0].as_ref().unwrap().tag, Tag::Begin(EntityCategory::Per));
        assert_eq!(matches[1].as_ref().unwrap().tag, Tag::Inside(EntityCategory::Per));
        assert!(matches[2].is_none());
    }

    #[test]
    fn test_gazetteer_is_case_insensitive() {
        let mut gaz = Gazetteer::new();
        gaz.add(EntityCategory::Org, "United Nations");
        let matches = gaz.apply(&pre_tokenize("the UNITED nations"));
        assert!(matches[0].is_none());
        assert_eq!(matches[1].as_ref().unwrap().tag, Tag::Begin(EntityCategory::Org));
        assert_eq!(matches[2].as_ref().unwrap().tag, Tag::Inside(EntityCategory::Org));
        assert_eq!(gaz.len(), 1);
    }

    #[test]
    fn test_subword_pieces_carry_continuation_labels() {
        let tokens = LexiconTagger::default().tag("Washington won").unwrap();
        let view: Vec<(&str, String, usize, usize)> = tokens
            .iter()
            .map(|t| (t.fragment.as_str(), t.label.label(), t.start, t.end))
            .collect();
        assert_eq!(
            view,
            vec![
                ("Wash", "B-LOC".to_string(), 0, 4),
                ("##ington", "I-LOC".to_string(), 4, 10),
                ("won", "O".to_string(), 11, 14),
            ]
        );
        assert_eq!(tokens[0].index, 1);
    }

    #[test]
    fn test_skip_outside_drops_background_tokens() {
        let tokens = LexiconTagger::default().skip_outside().tag("Paris loves Paris").unwrap();
        assert_eq!(tokens.len(), 2);
        assert!(tokens.iter().all(|t| t.label.is_entity()));
        assert_eq!(tokens[1].start, 12);
    }

    #[test]
    fn test_output_satisfies_tagger_contract() {
        let tagger = LexiconTagger::default();
        for (_, text) in demo_texts() {
            let tokens = tagger.tag(text).unwrap();
            assert_eq!(crate::token::validate_tokens(text, &tokens), Ok(()));
        }
    }
}
