use std::fmt::Display;

use crate::datasets::udpos;

/// The Dataset enum
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum Dataset {
    /// English Universal Dependencies POS dataset
    #[default]
    Udpos,
}

impl TryFrom<&str> for Dataset {
    type Error = DatasetError;

    /// Try to convert a string to a Dataset
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        if value.to_lowercase() == udpos::DATASET {
            Ok(Dataset::Udpos)
        } else {
            Err(Self::Error::Unknown(value.to_string()))
        }
    }
}

impl Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Dataset::Udpos => udpos::DATASET,
        };

        write!(f, "{}", name)
    }
}

/// Dataset Error
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    /// No dataset found for the given string
    #[error("no dataset found for {0}")]
    Unknown(String),
}
