/// CLI indexes: Datasets
pub mod datasets;

/// CLI indexes: Models
pub mod models;
