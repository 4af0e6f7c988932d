//! # Erros do núcleo de reconstrução
//!
//! A saída do tagger é tratada como um contrato: offsets fora do texto,
//! offsets fora de ordem ou rótulos fora do conjunto BIO fechado interrompem
//! o processamento com um erro descritivo. Nada é "consertado" silenciosamente.

use thiserror::Error;

/// Resultado padrão das operações do crate.
pub type Result<T> = std::result::Result<T, NerError>;

/// Erros de contrato entre o tagger externo e o reconstrutor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NerError {
    /// Rótulo fora do conjunto `{O, B-PER, I-PER, B-ORG, I-ORG, B-LOC, I-LOC, B-MISC, I-MISC}`.
    #[error("unknown entity label '{0}'")]
    UnknownLabel(String),

    /// `display_name_of` chamado para um rótulo que não é entidade (`O`).
    #[error("label '{0}' does not name an entity")]
    NotAnEntity(String),

    /// Token com `start > end`.
    #[error("token #{index} ('{fragment}') has start {start} after end {end}")]
    InvalidRange {
        index: usize,
        fragment: String,
        start: usize,
        end: usize,
    },

    /// Offset além do fim do texto.
    #[error("offset {offset} of token #{index} is beyond the text length {len}")]
    OutOfBounds { index: usize, offset: usize, len: usize },

    /// Offset de byte que cai no meio de um caractere UTF-8.
    #[error("offset {offset} of token #{index} is not on a character boundary")]
    NotCharBoundary { index: usize, offset: usize },

    /// Tokens fora da ordem esquerda → direita do documento.
    #[error("token #{index} starts at {start}, before the previous token start {previous}")]
    NonMonotonic {
        index: usize,
        start: usize,
        previous: usize,
    },

    /// Token que começa antes do fim do token anterior.
    #[error("token #{index} starts at {start}, inside the previous token ending at {previous_end}")]
    Overlapping {
        index: usize,
        start: usize,
        previous_end: usize,
    },

    /// Continuação `##` que não começa onde o token anterior termina: o
    /// fragmento líder da palavra está faltando (ex: filtrado por ser `O`).
    #[error(
        "continuation token #{index} ('{fragment}') starts at {start}, \
         not at the previous token end {previous_end}"
    )]
    DetachedContinuation {
        index: usize,
        fragment: String,
        start: usize,
        previous_end: usize,
    },

    /// Predição do pipeline sem offsets (tokenizer "slow"); não há como
    /// reconstruir spans sem procurar texto, o que é proibido.
    #[error("prediction #{0} carries no character offsets")]
    MissingOffsets(usize),

    /// Falha do adaptador de tagging (rede, modelo, decodificação).
    #[error("tagger failed: {0}")]
    Tagger(String),
}
