/// BERT for Token Classification (such as part-of-speech tagging)
pub mod token_classification;
