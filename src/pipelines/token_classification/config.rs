use std::path::PathBuf;

use burn::LearningRate;

use crate::datasets::udpos::TagScheme;

/// File name of the training configuration inside the artifact directory
pub static TRAINING_CONFIG_FILE: &str = "training.json";

/// File name of the model configuration inside the artifact directory
pub static MODEL_CONFIG_FILE: &str = "config.json";

/// File name of the tokenizer copied into the artifact directory
pub static TOKENIZER_FILE: &str = "tokenizer.json";

/// File name of the per-epoch metrics history
pub static METRICS_FILE: &str = "metrics.json";

/// Define configuration struct for the experiment
#[derive(burn::config::Config)]
pub struct Config {
    /// Batch size
    #[config(default = 32)]
    pub batch_size: usize,

    /// Number of epochs
    #[config(default = 3)]
    pub num_epochs: usize,

    /// Adam epsilon
    #[config(default = 1e-8)]
    pub adam_epsilon: f32,

    /// Learning rate
    #[config(default = 5e-5)]
    pub learning_rate: LearningRate,

    /// Dropout rate around the classification head
    #[config(default = 0.25)]
    pub hidden_dropout_prob: f64,

    /// Seed for parameter initialization and batch shuffling
    #[config(default = 1234)]
    pub seed: u64,

    /// Train the classification head only
    #[config(default = false)]
    pub freeze_encoder: bool,

    /// Lowercase words before the vocabulary lookup (for uncased models)
    #[config(default = true)]
    pub lowercase: bool,

    /// Which tag column of the corpus to learn
    #[config(default = "TagScheme::Ud")]
    pub tag_scheme: TagScheme,

    /// The location of the top-level data directory
    #[config(default = "\"data\".to_string()")]
    pub data_dir: String,

    /// Model name (e.g., "bert-base-uncased")
    pub model_name: String,

    /// The Dataset to use (e.g., "udpos")
    pub dataset_name: String,
}

impl Config {
    /// Where the checkpoint, configs and metrics of this run live
    pub fn artifact_dir(&self) -> PathBuf {
        artifact_dir(&self.data_dir, &self.model_name)
    }
}

/// The artifact directory for a model under a data directory
pub fn artifact_dir(data_dir: &str, model_name: &str) -> PathBuf {
    PathBuf::from(data_dir).join("pos-tagging").join(model_name)
}

#[cfg(test)]
mod tests {
    use burn::config::Config as _;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_follow_the_reference_hyperparameters() {
        let config = Config::new("bert-base-uncased".to_string(), "udpos".to_string());

        assert_eq!(config.batch_size, 32);
        assert_eq!(config.num_epochs, 3);
        assert_eq!(config.learning_rate, 5e-5);
        assert_eq!(config.hidden_dropout_prob, 0.25);
        assert_eq!(config.seed, 1234);
        assert!(!config.freeze_encoder);
        assert!(config.lowercase);
        assert_eq!(config.tag_scheme, TagScheme::Ud);
        assert_eq!(
            config.artifact_dir(),
            PathBuf::from("data/pos-tagging/bert-base-uncased")
        );
    }

    #[test]
    fn survives_a_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TRAINING_CONFIG_FILE);

        let config = Config::new("bert-base-cased".to_string(), "udpos".to_string())
            .with_freeze_encoder(true)
            .with_tag_scheme(TagScheme::Ptb)
            .with_lowercase(false);

        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();

        assert!(loaded.freeze_encoder);
        assert!(!loaded.lowercase);
        assert_eq!(loaded.tag_scheme, TagScheme::Ptb);
        assert_eq!(loaded.model_name, "bert-base-cased");
    }
}
