/// BERT for Token Classification Config
pub mod config;

/// The BERT encoder adapter
pub mod encoder;

/// BERT for Token Classification
pub mod model;

pub use config::Config;
pub use encoder::Encoder;
pub use model::{Model, ModelRecord};
