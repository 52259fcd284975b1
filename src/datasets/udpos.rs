use std::path::Path;

use burn::data::dataset::{self, InMemDataset};
use derive_new::new;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::pipelines::token_classification;

use super::{DatasetError, Split};

/// The name of the UDPOS dataset
pub static DATASET: &str = "udpos";

/// Which tag column of the corpus to train on
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Serialize, Deserialize)]
pub enum TagScheme {
    /// Universal Dependencies coarse tags (NOUN, VERB, ...)
    #[default]
    Ud,

    /// Penn Treebank fine-grained tags (NN, VBD, ...)
    Ptb,
}

impl TryFrom<&str> for TagScheme {
    type Error = DatasetError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "ud" | "upos" => Ok(TagScheme::Ud),
            "ptb" | "xpos" => Ok(TagScheme::Ptb),
            _ => Err(DatasetError::UnknownScheme(value.to_string())),
        }
    }
}

/// A tagged sentence
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, new)]
pub struct Item {
    /// The words of the sentence
    pub tokens: Vec<String>,

    /// One tag per word, from the selected tag scheme
    pub tags: Vec<String>,
}

impl token_classification::Item for Item {
    fn tokens(&self) -> &[String] {
        &self.tokens
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// Struct for the UDPOS dataset
pub struct Dataset {
    /// Underlying In-Memory dataset
    dataset: InMemDataset<Item>,
}

impl dataset::Dataset<Item> for Dataset {
    fn get(&self, index: usize) -> Option<Item> {
        self.dataset.get(index)
    }

    fn len(&self) -> usize {
        self.dataset.len()
    }
}

impl Dataset {
    /// The file name of a split inside the dataset directory
    pub fn file_name(split: Split) -> &'static str {
        match split {
            Split::Train => "en-ud-tag.v2.train.txt",
            Split::Validation => "en-ud-tag.v2.dev.txt",
            Split::Test => "en-ud-tag.v2.test.txt",
        }
    }

    /// Load a split from `{data_dir}/datasets/udpos`
    pub async fn load(data_dir: &str, split: Split, scheme: TagScheme) -> Result<Self, DatasetError> {
        let path = Path::new(data_dir)
            .join("datasets")
            .join(DATASET)
            .join(Self::file_name(split));

        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| DatasetError::Io {
                path: path.display().to_string(),
                source,
            })?;

        let items = parse(&contents, scheme)?;
        if items.is_empty() {
            return Err(DatasetError::Empty(split));
        }

        log::info!("Loaded {} {} sentences from {}", items.len(), split, path.display());

        Ok(Self::from_items(items))
    }

    /// Wrap already-parsed sentences
    pub fn from_items(items: Vec<Item>) -> Self {
        Self {
            dataset: InMemDataset::new(items),
        }
    }

    /// Returns `count` sentences drawn without replacement, reproducible for a given seed
    pub fn sample(&self, count: usize, seed: u64) -> Vec<Item> {
        let mut rng = StdRng::seed_from_u64(seed);

        let mut indices: Vec<usize> = (0..dataset::Dataset::len(self)).collect();
        indices.shuffle(&mut rng);

        indices
            .into_iter()
            .take(count)
            .filter_map(|i| dataset::Dataset::get(self, i))
            .collect()
    }
}

/// Parse the tab-separated corpus format: one `word\tud\tptb` line per token and a blank line
/// between sentences
pub fn parse(contents: &str, scheme: TagScheme) -> Result<Vec<Item>, DatasetError> {
    let column = match scheme {
        TagScheme::Ud => 1,
        TagScheme::Ptb => 2,
    };

    let mut items = Vec::new();
    let mut tokens = Vec::new();
    let mut tags = Vec::new();

    for (index, line) in contents.lines().enumerate() {
        let line = line.trim_end_matches('\r');

        if line.trim().is_empty() {
            if !tokens.is_empty() {
                items.push(Item::new(
                    std::mem::take(&mut tokens),
                    std::mem::take(&mut tags),
                ));
            }
            continue;
        }

        let columns: Vec<&str> = line.split('\t').collect();
        if columns.len() < 3 || columns[0].is_empty() {
            return Err(DatasetError::Malformed {
                line: index + 1,
                content: line.to_string(),
            });
        }

        tokens.push(columns[0].to_string());
        tags.push(columns[column].to_string());
    }

    if !tokens.is_empty() {
        items.push(Item::new(tokens, tags));
    }

    Ok(items)
}
