use std::collections::HashMap;

/// The synthetic tag aligned to the start token and to batch padding
pub static PAD_TAG: &str = "<pad>";

/// The id reserved for [`PAD_TAG`]
pub const PAD_TAG_ID: usize = 0;

/// Tag Vocabulary Error
#[derive(thiserror::Error, Debug)]
pub enum TagVocabularyError {
    /// The training split holds no tags to build from
    #[error("cannot build a tag vocabulary from an empty training split")]
    EmptyTrainingSplit,

    /// A persisted tag list does not start with the pad tag
    #[error("tag id 0 must be the pad tag \"<pad>\", found {0:?}")]
    MissingPad(Option<String>),

    /// A persisted tag list repeats a tag
    #[error("tag {0:?} appears more than once")]
    Duplicate(String),
}

/// A dense, closed-set mapping between tag strings and ids. Id 0 is always the pad tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagVocabulary {
    /// Tag strings indexed by id
    id2label: Vec<String>,

    /// Ids keyed by tag string
    label2id: HashMap<String, usize>,
}

/// How often a tag occurs in a split
#[derive(Debug, Clone, PartialEq)]
pub struct TagShare {
    /// The tag string
    pub tag: String,

    /// Number of occurrences
    pub count: usize,

    /// Share of all tag occurrences, in percent
    pub percentage: f64,
}

impl TagVocabulary {
    /// Build the vocabulary from the training split's tag sequences. Tags are ordered by
    /// descending frequency, ties broken by first appearance, and numbered from 1.
    pub fn build<I, S>(sequences: I) -> Result<Self, TagVocabularyError>
    where
        I: IntoIterator,
        I::Item: AsRef<[S]>,
        S: AsRef<str>,
    {
        let counts = count_tags(sequences);
        if counts.is_empty() {
            return Err(TagVocabularyError::EmptyTrainingSplit);
        }

        let mut id2label = Vec::with_capacity(counts.len() + 1);
        id2label.push(PAD_TAG.to_string());
        id2label.extend(counts.into_iter().map(|(tag, _)| tag));

        Ok(Self::from_ordered(id2label))
    }

    /// Restore a vocabulary from its id-ordered tag list, as persisted in the model config
    pub fn from_tags(tags: Vec<String>) -> Result<Self, TagVocabularyError> {
        match tags.first() {
            Some(first) if first == PAD_TAG => {}
            other => return Err(TagVocabularyError::MissingPad(other.cloned())),
        }

        let vocabulary = Self::from_ordered(tags);
        if vocabulary.label2id.len() != vocabulary.id2label.len() {
            let duplicate = vocabulary
                .id2label
                .iter()
                .enumerate()
                .find(|(id, tag)| vocabulary.label2id[*tag] != *id)
                .map(|(_, tag)| tag.clone())
                .unwrap_or_default();

            return Err(TagVocabularyError::Duplicate(duplicate));
        }

        Ok(vocabulary)
    }

    fn from_ordered(id2label: Vec<String>) -> Self {
        let mut label2id = HashMap::with_capacity(id2label.len());
        for (id, tag) in id2label.iter().enumerate() {
            label2id.entry(tag.clone()).or_insert(id);
        }

        Self { id2label, label2id }
    }

    /// The id of a tag, if the tag was seen in training
    pub fn to_id(&self, tag: &str) -> Option<usize> {
        self.label2id.get(tag).copied()
    }

    /// The tag string of an id
    pub fn to_tag(&self, id: usize) -> Option<&str> {
        self.id2label.get(id).map(String::as_str)
    }

    /// The id of the pad tag
    pub fn pad_id(&self) -> usize {
        PAD_TAG_ID
    }

    /// Number of tags, pad included
    pub fn len(&self) -> usize {
        self.id2label.len()
    }

    /// Always false: the pad tag is present in every vocabulary
    pub fn is_empty(&self) -> bool {
        self.id2label.is_empty()
    }

    /// The id-ordered tag list, pad first
    pub fn tags(&self) -> &[String] {
        &self.id2label
    }

    /// Per-tag counts and shares for a split, most frequent first
    pub fn percentages<I, S>(sequences: I) -> Vec<TagShare>
    where
        I: IntoIterator,
        I::Item: AsRef<[S]>,
        S: AsRef<str>,
    {
        let counts = count_tags(sequences);
        let total: usize = counts.iter().map(|(_, count)| count).sum();

        counts
            .into_iter()
            .map(|(tag, count)| TagShare {
                tag,
                count,
                percentage: 100.0 * count as f64 / total as f64,
            })
            .collect()
    }
}

/// Tag counts ordered by descending frequency, ties in order of first appearance
fn count_tags<I, S>(sequences: I) -> Vec<(String, usize)>
where
    I: IntoIterator,
    I::Item: AsRef<[S]>,
    S: AsRef<str>,
{
    let mut position: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for sequence in sequences {
        for tag in sequence.as_ref() {
            let tag = tag.as_ref();

            match position.get(tag) {
                Some(&index) => counts[index].1 += 1,
                None => {
                    position.insert(tag.to_string(), counts.len());
                    counts.push((tag.to_string(), 1));
                }
            }
        }
    }

    // Stable sort keeps first-appearance order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    counts
}
