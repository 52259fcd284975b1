//! Adapt BERT to the token classification pipeline

use std::path::PathBuf;

use bert_burn::model::{BertModel, BertModelConfig};
use burn::{
    config::Config as _,
    module::Module,
    nn::{DropoutConfig, LinearConfig},
    tensor::backend::Backend,
};

use crate::pipelines::token_classification::{
    tags::{TagVocabulary, TagVocabularyError},
    Encoder as _,
};

use super::{Encoder, Model};

/// The Model Configuration
#[derive(burn::config::Config)]
pub struct Config {
    /// The base BERT config
    pub model: BertModelConfig,

    /// Tag strings indexed by id, pad tag first
    pub tags: Vec<String>,

    /// Dropout applied around the classification head
    #[config(default = 0.25)]
    pub dropout: f64,
}

impl Config {
    /// Load the pretrained BERT config and attach the training split's tags
    pub fn load_pretrained(
        config_file: PathBuf,
        tags: &TagVocabulary,
        dropout: f64,
    ) -> anyhow::Result<Self> {
        let mut bert_config = BertModelConfig::load(&config_file)
            .map_err(|e| anyhow!("Unable to load Hugging Face Config file: {}", e))?;

        // Token classification reads the per-position hidden states only
        bert_config.with_pooling_layer = Some(false);

        Ok(Config::new(bert_config, tags.tags().to_vec()).with_dropout(dropout))
    }

    /// Restore the tag vocabulary the model was trained with
    pub fn tag_vocabulary(&self) -> Result<TagVocabulary, TagVocabularyError> {
        TagVocabulary::from_tags(self.tags.clone())
    }

    /// The longest sequence the encoder accepts, start token included
    pub fn max_length(&self) -> usize {
        self.model
            .max_seq_len
            .unwrap_or(self.model.max_position_embeddings)
            .min(self.model.max_position_embeddings)
    }

    /// Initializes the model with random weights
    pub fn init<B: Backend>(&self, device: &B::Device) -> Model<B> {
        let encoder = Encoder::new(
            self.model.init(device),
            self.model.hidden_size,
            self.max_length(),
        );

        let n_tags = self.tags.len();

        Model {
            output: LinearConfig::new(encoder.hidden_size(), n_tags).init(device),
            encoder,
            dropout: DropoutConfig::new(self.dropout).init(),
            n_tags,
            frozen_encoder: false,
        }
    }

    /// Initializes the model with pretrained encoder weights and a randomly initialized head
    pub fn init_pretrained<B: Backend>(&self, weights: PathBuf, device: &B::Device) -> Model<B> {
        let mut model = self.init(device);

        let record = BertModel::from_safetensors(weights, device, self.model.clone());
        model.encoder.model = model.encoder.model.load_record(record);

        model
    }
}
