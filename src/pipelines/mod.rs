/// Token Classification (part-of-speech tagging)
pub mod token_classification;
