use std::fmt::Display;

/// The UDPOS dataset (English Universal Dependencies part-of-speech tags)
pub mod udpos;

/// One of the three fixed splits of a tagging corpus
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Split {
    /// Training examples
    Train,

    /// Validation examples, used for checkpoint selection
    Validation,

    /// Held-out test examples
    Test,
}

impl Display for Split {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Split::Train => "train",
            Split::Validation => "validation",
            Split::Test => "test",
        };

        write!(f, "{}", name)
    }
}

/// Dataset Error
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    /// The dataset file could not be read
    #[error("unable to read {path}: {source}")]
    Io {
        /// The file that failed
        path: String,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },

    /// A token line did not carry the expected columns
    #[error("malformed line {line}: expected `word<TAB>ud<TAB>ptb`, found {content:?}")]
    Malformed {
        /// One-based line number
        line: usize,
        /// The offending line
        content: String,
    },

    /// The split holds no sentences
    #[error("the {0} split is empty")]
    Empty(Split),

    /// An unknown tag scheme was requested
    #[error("no tag scheme found for {0}")]
    UnknownScheme(String),
}
