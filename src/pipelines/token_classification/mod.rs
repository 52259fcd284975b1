/// Batcher
pub mod batcher;

/// Best-checkpoint policy and parameter persistence
pub mod checkpoint;

/// Training Configuration
pub mod config;

/// Encoder boundary
pub mod encoder;

/// Evaluation loop
pub mod evaluation;

/// Token Classification Inference
pub mod inference;

/// Token Classification Items
pub mod item;

/// Masked loss, accuracy and epoch metrics
pub mod metrics;

/// Model
pub mod model;

/// Model Output
pub mod output;

/// Truncation and id mapping
pub mod preprocess;

/// Tag vocabulary
pub mod tags;

/// Tokenizer adapter
pub mod tokenizer;

/// Token Classification Training
pub mod training;

pub use batcher::Batcher;
pub use config::Config;
pub use encoder::Encoder;
pub use inference::{tag_sentence, Tagger};
pub use item::Item;
pub use model::Model;
pub use output::Output;
pub use training::train;
