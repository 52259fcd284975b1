use std::path::Path;

use burn::{
    config::Config as _,
    nn::attention::generate_padding_mask,
    tensor::backend::Backend,
};

use crate::models::bert;

use super::{
    checkpoint,
    config::{Config, MODEL_CONFIG_FILE, TOKENIZER_FILE, TRAINING_CONFIG_FILE},
    preprocess::truncate,
    tags::{TagVocabulary, PAD_TAG},
    tokenizer::{SpecialTokens, TokenizerAdapter, TokenizerError},
    Model,
};

/// A sentence to tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Raw text, split by the tokenizer
    Text(String),

    /// Words that are already tokenized
    Tokens(Vec<String>),
}

impl From<&str> for Input {
    fn from(text: &str) -> Self {
        Input::Text(text.to_string())
    }
}

impl From<String> for Input {
    fn from(text: String) -> Self {
        Input::Text(text)
    }
}

impl From<Vec<String>> for Input {
    fn from(tokens: Vec<String>) -> Self {
        Input::Tokens(tokens)
    }
}

/// The tags predicted for a sentence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tagged {
    /// The tokens that were tagged
    pub tokens: Vec<String>,

    /// One predicted tag per token
    pub tags: Vec<String>,

    /// Tokens that fell outside the encoder's vocabulary
    pub unknown: Vec<String>,
}

impl Tagged {
    /// `(token, tag)` pairs in sentence order
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.tokens
            .iter()
            .zip(&self.tags)
            .map(|(token, tag)| (token.as_str(), tag.as_str()))
            .collect()
    }
}

/// Tag a single sentence: tokenize (for raw text), look up ids, prepend the start token, run
/// the model and drop the prediction made for the start position
pub fn tag_sentence<B: Backend, M: Model<B>>(
    model: &M,
    tokenizer: &TokenizerAdapter,
    tags: &TagVocabulary,
    input: impl Into<Input>,
    lowercase: bool,
    device: &B::Device,
) -> Result<Tagged, TokenizerError> {
    let mut tokens = match input.into() {
        Input::Text(text) => tokenizer.tokenize(&text)?,
        Input::Tokens(tokens) => tokens,
    };

    let max_length = tokenizer.max_length.min(model.max_length());
    if tokens.len() >= max_length {
        log::warn!(
            "Sentence of {} tokens exceeds the encoder limit, tagging the first {}",
            tokens.len(),
            max_length.saturating_sub(1)
        );
        tokens = truncate(&tokens, max_length);
    }

    // Only the lookup sees lowercased words, the caller gets their own tokens back
    let token_ids = if lowercase {
        let lowered: Vec<String> = tokens.iter().map(|token| token.to_lowercase()).collect();
        tokenizer.convert_tokens_to_ids(&lowered)
    } else {
        tokenizer.convert_tokens_to_ids(&tokens)
    };

    let unknown = tokens
        .iter()
        .zip(&token_ids)
        .filter(|(_, id)| **id == tokenizer.unk_token_id)
        .map(|(token, _)| token.clone())
        .collect();

    let mut ids = Vec::with_capacity(token_ids.len() + 1);
    ids.push(tokenizer.start_token_id);
    ids.extend(token_ids);

    let input = generate_padding_mask::<B>(tokenizer.pad_token_id, vec![ids], None, device);

    let predictions = model
        .infer(input.tensor, input.mask)
        .argmax(2)
        .into_data()
        .convert::<i64>()
        .value;

    let predicted: Vec<String> = predictions
        .into_iter()
        .skip(1)
        .map(|id| tags.to_tag(id as usize).unwrap_or(PAD_TAG).to_string())
        .collect();

    assert_eq!(
        predicted.len(),
        tokens.len(),
        "predicted tags must line up with the input tokens"
    );

    Ok(Tagged {
        tokens,
        tags: predicted,
        unknown,
    })
}

/// A trained tagger restored from its artifact directory
pub struct Tagger<B: Backend> {
    /// The fine-tuned model
    pub model: bert::token_classification::Model<B>,

    /// The tokenizer the model was trained with
    pub tokenizer: TokenizerAdapter,

    /// The tag mapping the model was trained with
    pub tags: TagVocabulary,

    /// The configuration the model was trained with
    pub config: Config,

    /// Device on which to perform computation
    pub device: B::Device,
}

impl<B: Backend> Tagger<B> {
    /// Load the configs, tokenizer and best checkpoint written by a training run
    pub fn load(artifact_dir: &Path, device: B::Device) -> anyhow::Result<Self> {
        let model_config =
            bert::token_classification::Config::load(artifact_dir.join(MODEL_CONFIG_FILE))
                .map_err(|e| anyhow!("Unable to load config file: {}", e))?;

        let config = Config::load(artifact_dir.join(TRAINING_CONFIG_FILE))
            .map_err(|e| anyhow!("Unable to load training config file: {}", e))?;

        let tokenizer = TokenizerAdapter::from_file(
            artifact_dir.join(TOKENIZER_FILE),
            &SpecialTokens::default(),
            model_config.max_length(),
        )?;

        let tags = model_config.tag_vocabulary()?;

        log::info!("Loading weights...");

        let model = checkpoint::load(
            model_config.init::<B>(&device),
            &artifact_dir.join(checkpoint::MODEL_FILE),
            &device,
        )?;

        Ok(Self {
            model,
            tokenizer,
            tags,
            config,
            device,
        })
    }

    /// Tag one sentence
    pub fn tag(&self, input: impl Into<Input>) -> Result<Tagged, TokenizerError> {
        tag_sentence(
            &self.model,
            &self.tokenizer,
            &self.tags,
            input,
            self.config.lowercase,
            &self.device,
        )
    }
}
