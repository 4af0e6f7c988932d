//! # Esquema de Tags BIO e Interface do Tagger
//!
//! Define o conjunto **fechado** de rótulos BIO produzido pelo modelo de
//! token classification e a interface pela qual o modelo (uma caixa-preta)
//! é injetado no núcleo.
//!
//! ## Categorias de Entidades
//!
//! | Prefixo | Nome exibido   | Cor (CSS)              |
//! |---------|----------------|------------------------|
//! | PER     | Person         | lightgreen             |
//! | ORG     | Organization   | lightblue              |
//! | LOC     | Location       | lightcoral             |
//! | MISC    | Miscellaneous  | lightgoldenrodyellow   |
//! | O       | (fora)         | white (padrão neutro)  |
//!
//! ## Esquema BIO
//!
//! - `B-TAG`: Begin, primeiro token de uma entidade
//! - `I-TAG`: Inside, tokens subsequentes da mesma entidade
//! - `O`: Outside, não é parte de nenhuma entidade

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{NerError, Result};
use crate::token::Token;

/// Categorias de entidade do modelo (esquema CoNLL-2003).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityCategory {
    /// **Pessoa**. Ex: "Angela Merkel".
    Per,
    /// **Organização**. Ex: "Google", "United Nations".
    Org,
    /// **Localização**. Ex: "Washington", "Paris".
    Loc,
    /// **Miscelânea**: eventos, nacionalidades, obras. Ex: "World Cup", "French".
    Misc,
}

impl EntityCategory {
    /// Nome curto da categoria (sufixo do rótulo BIO)
    pub fn name(&self) -> &'static str {
        match self {
            EntityCategory::Per => "PER",
            EntityCategory::Org => "ORG",
            EntityCategory::Loc => "LOC",
            EntityCategory::Misc => "MISC",
        }
    }

    /// Nome legível exibido na legenda
    pub fn display_name(&self) -> &'static str {
        match self {
            EntityCategory::Per => "Person",
            EntityCategory::Org => "Organization",
            EntityCategory::Loc => "Location",
            EntityCategory::Misc => "Miscellaneous",
        }
    }

    /// Cor CSS de fundo para o highlight
    pub fn color(&self) -> &'static str {
        match self {
            EntityCategory::Per => "lightgreen",
            EntityCategory::Org => "lightblue",
            EntityCategory::Loc => "lightcoral",
            EntityCategory::Misc => "lightgoldenrodyellow",
        }
    }

    /// Tenta parsear a partir do nome curto (ex: "PER" → Some(Per))
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "PER" => Some(EntityCategory::Per),
            "ORG" => Some(EntityCategory::Org),
            "LOC" => Some(EntityCategory::Loc),
            "MISC" => Some(EntityCategory::Misc),
            _ => None,
        }
    }
}

/// Tag BIO atribuída a um token sub-palavra.
///
/// Serializa como o rótulo textual (`"B-PER"`, `"O"`), que é o formato
/// emitido pelo pipeline de token classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Tag {
    /// **Begin**: início de uma entidade. Ex: **New** (B-LOC) York.
    Begin(EntityCategory),
    /// **Inside**: continuação de uma entidade. Ex: New **York** (I-LOC).
    Inside(EntityCategory),
    /// **Outside**: fora de qualquer entidade.
    Outside,
}

impl Tag {
    /// Representação textual da tag (ex: "B-PER", "I-ORG", "O")
    pub fn label(&self) -> String {
        match self {
            Tag::Begin(cat) => format!("B-{}", cat.name()),
            Tag::Inside(cat) => format!("I-{}", cat.name()),
            Tag::Outside => "O".to_string(),
        }
    }

    /// Índice da tag na camada de saída do modelo (`id2label`).
    pub fn index(&self) -> usize {
        match self {
            Tag::Outside => 0,
            Tag::Begin(EntityCategory::Per) => 1,
            Tag::Inside(EntityCategory::Per) => 2,
            Tag::Begin(EntityCategory::Org) => 3,
            Tag::Inside(EntityCategory::Org) => 4,
            Tag::Begin(EntityCategory::Loc) => 5,
            Tag::Inside(EntityCategory::Loc) => 6,
            Tag::Begin(EntityCategory::Misc) => 7,
            Tag::Inside(EntityCategory::Misc) => 8,
        }
    }

    /// Número total de tags possíveis
    pub const COUNT: usize = 9;

    /// Todas as tags na ordem de `id2label`
    pub fn all() -> [Tag; 9] {
        [
            Tag::Outside,
            Tag::Begin(EntityCategory::Per),
            Tag::Inside(EntityCategory::Per),
            Tag::Begin(EntityCategory::Org),
            Tag::Inside(EntityCategory::Org),
            Tag::Begin(EntityCategory::Loc),
            Tag::Inside(EntityCategory::Loc),
            Tag::Begin(EntityCategory::Misc),
            Tag::Inside(EntityCategory::Misc),
        ]
    }

    /// Tag correspondente a um índice de `id2label`
    pub fn from_index(index: usize) -> Option<Self> {
        Tag::all().get(index).copied()
    }

    /// Retorna a categoria desta tag (se for B- ou I-)
    pub fn category(&self) -> Option<EntityCategory> {
        match self {
            Tag::Begin(c) | Tag::Inside(c) => Some(*c),
            Tag::Outside => None,
        }
    }

    pub fn is_entity(&self) -> bool {
        !matches!(self, Tag::Outside)
    }

    /// Verifica se a transição tag_prev → self é válida no esquema BIO
    ///
    /// Regras:
    /// - `I-X` só pode seguir `B-X` ou `I-X` (mesma categoria)
    /// - `B-X` pode seguir qualquer tag
    /// - `O` pode seguir qualquer tag
    pub fn is_valid_transition(prev: &Tag, next: &Tag) -> bool {
        match next {
            Tag::Inside(cat) => match prev {
                Tag::Begin(prev_cat) | Tag::Inside(prev_cat) => prev_cat == cat,
                _ => false,
            },
            _ => true,
        }
    }

    /// Parseia uma tag a partir do rótulo do modelo.
    ///
    /// Aceita a forma BIO (`"B-PER"`) e a forma crua `"LABEL_n"` que o
    /// pipeline emite quando o `id2label` do modelo não foi configurado.
    pub fn from_label(s: &str) -> Result<Self> {
        if s == "O" {
            return Ok(Tag::Outside);
        }
        if let Some(raw) = s.strip_prefix("LABEL_") {
            return raw
                .parse::<usize>()
                .ok()
                .and_then(Tag::from_index)
                .ok_or_else(|| NerError::UnknownLabel(s.to_string()));
        }
        let (prefix, name) = s
            .split_once('-')
            .ok_or_else(|| NerError::UnknownLabel(s.to_string()))?;
        let cat = EntityCategory::from_name(name)
            .ok_or_else(|| NerError::UnknownLabel(s.to_string()))?;
        match prefix {
            "B" => Ok(Tag::Begin(cat)),
            "I" => Ok(Tag::Inside(cat)),
            _ => Err(NerError::UnknownLabel(s.to_string())),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Tag {
    type Err = NerError;

    fn from_str(s: &str) -> Result<Self> {
        Tag::from_label(s)
    }
}

impl TryFrom<String> for Tag {
    type Error = NerError;

    fn try_from(s: String) -> Result<Self> {
        Tag::from_label(&s)
    }
}

impl From<Tag> for String {
    fn from(tag: Tag) -> Self {
        tag.label()
    }
}

/// O modelo de token classification, visto pelo núcleo como uma função
/// `texto → tokens sub-palavra rotulados`.
///
/// O núcleo não conhece nada do modelo: recebe o tagger por injeção. Qualquer
/// closure `Fn(&str) -> Result<Vec<Token>>` já é um `Tagger`, o que permite
/// testar a reconstrução com um tagger falso montado à mão.
///
/// Contrato: tokens em ordem esquerda → direita, com offsets de byte válidos
/// em `text`.
pub trait Tagger {
    fn tag(&self, text: &str) -> Result<Vec<Token>>;
}

impl<F> Tagger for F
where
    F: Fn(&str) -> Result<Vec<Token>>,
{
    fn tag(&self, text: &str) -> Result<Vec<Token>> {
        self(text)
    }
}
