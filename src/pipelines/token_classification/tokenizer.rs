use std::path::Path;

use tokenizers::Tokenizer;

/// The special tokens the tagging pipeline relies on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialTokens {
    /// The token prepended to every sequence
    pub start: String,

    /// The token used to pad batches
    pub pad: String,

    /// The token substituted for out-of-vocabulary input
    pub unk: String,
}

impl Default for SpecialTokens {
    /// The BERT WordPiece conventions
    fn default() -> Self {
        Self {
            start: "[CLS]".to_string(),
            pad: "[PAD]".to_string(),
            unk: "[UNK]".to_string(),
        }
    }
}

/// Tokenizer Error
#[derive(thiserror::Error, Debug)]
pub enum TokenizerError {
    /// The tokenizer could not be loaded
    #[error("unable to load tokenizer: {0}")]
    Load(String),

    /// The text could not be split into tokens
    #[error("unable to tokenize {text:?}: {reason}")]
    Encode {
        /// The input text
        text: String,
        /// The tokenizer's message
        reason: String,
    },

    /// A required special token is missing from the vocabulary
    #[error("the vocabulary has no {0} token")]
    MissingSpecialToken(String),
}

/// Wraps a pretrained subword vocabulary behind the handful of operations the pipeline needs
#[derive(Clone)]
pub struct TokenizerAdapter {
    /// The pretrained tokenizer
    tokenizer: Tokenizer,

    /// ID of the start token
    pub start_token_id: usize,

    /// ID of the padding token
    pub pad_token_id: usize,

    /// ID of the UNK token
    pub unk_token_id: usize,

    /// Maximum sequence length the encoder accepts, start token included
    pub max_length: usize,
}

impl TokenizerAdapter {
    /// Wrap a tokenizer, resolving the special token ids up front
    pub fn new(
        tokenizer: Tokenizer,
        special: &SpecialTokens,
        max_length: usize,
    ) -> Result<Self, TokenizerError> {
        let resolve = |token: &str| {
            tokenizer
                .token_to_id(token)
                .map(|id| id as usize)
                .ok_or_else(|| TokenizerError::MissingSpecialToken(token.to_string()))
        };

        Ok(Self {
            start_token_id: resolve(&special.start)?,
            pad_token_id: resolve(&special.pad)?,
            unk_token_id: resolve(&special.unk)?,
            max_length,
            tokenizer,
        })
    }

    /// Load a serialized `tokenizer.json`
    pub fn from_file(
        path: impl AsRef<Path>,
        special: &SpecialTokens,
        max_length: usize,
    ) -> Result<Self, TokenizerError> {
        let tokenizer = Tokenizer::from_file(path.as_ref())
            .map_err(|e| TokenizerError::Load(format!("{}: {}", path.as_ref().display(), e)))?;

        Self::new(tokenizer, special, max_length)
    }

    /// Split raw text into subword tokens, without special tokens
    pub fn tokenize(&self, text: &str) -> Result<Vec<String>, TokenizerError> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| TokenizerError::Encode {
                text: text.to_string(),
                reason: e.to_string(),
            })?;

        Ok(encoding.get_tokens().to_vec())
    }

    /// Look up each token in the vocabulary, falling back to the UNK id
    pub fn convert_tokens_to_ids<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<usize> {
        tokens
            .iter()
            .map(|token| {
                self.tokenizer
                    .token_to_id(token.as_ref())
                    .map(|id| id as usize)
                    .unwrap_or(self.unk_token_id)
            })
            .collect()
    }
}
