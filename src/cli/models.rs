use std::fmt::Display;

/// The base model type
pub static MODEL_TYPE: &str = "bert";

/// bert-base-uncased
pub static BASE_UNCASED: &str = "bert-base-uncased";

/// bert-base-cased
pub static BASE_CASED: &str = "bert-base-cased";

/// All available BERT models
pub static ALL_MODELS: &[&str; 2] = &[BASE_UNCASED, BASE_CASED];

/// The default model to use
pub static DEFAULT_MODEL: &str = BASE_UNCASED;

/// Available Models
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Model {
    /// The BERT family of models, with the specific model name contained within
    Bert(String),
}

impl Model {
    /// Get the model type
    pub fn model_type(&self) -> &str {
        match self {
            Model::Bert(_) => MODEL_TYPE,
        }
    }

    /// Whether the vocabulary of this model is lowercased
    pub fn is_uncased(&self) -> bool {
        match self {
            Model::Bert(name) => name.ends_with("-uncased"),
        }
    }
}

impl Default for Model {
    fn default() -> Self {
        Model::Bert(DEFAULT_MODEL.to_string())
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Model::Bert(name) = self;

        write!(f, "{}", name)
    }
}

impl TryFrom<&str> for Model {
    type Error = ModelError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if ALL_MODELS.contains(&value) {
            Ok(Model::Bert(value.to_string()))
        } else {
            Err(ModelError::Unknown(value.to_string()))
        }
    }
}

/// Model Error
#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    /// No model found for the given string
    #[error("no model found for {0}")]
    Unknown(String),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_to_the_uncased_base_model() {
        let model = Model::default();

        assert_eq!(model.to_string(), "bert-base-uncased");
        assert_eq!(model.model_type(), "bert");
        assert!(model.is_uncased());
    }

    #[test]
    fn rejects_unknown_models() {
        assert!(!Model::try_from("bert-base-cased").unwrap().is_uncased());
        assert!(matches!(
            Model::try_from("gpt2"),
            Err(ModelError::Unknown(name)) if name == "gpt2"
        ));
    }
}
