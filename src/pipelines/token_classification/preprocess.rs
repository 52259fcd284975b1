use burn::data::dataset::InMemDataset;
use derive_new::new;

use super::{tags::TagVocabulary, tokenizer::TokenizerAdapter, Item};

/// An aligned pair of token ids and tag ids, both prefixed for the start token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Example {
    /// Vocabulary ids, starting with the start-token id
    pub token_ids: Vec<usize>,

    /// Tag ids, starting with the pad-tag id
    pub tag_ids: Vec<usize>,
}

impl Example {
    /// Number of positions, start position included
    pub fn len(&self) -> usize {
        self.token_ids.len()
    }

    /// True when the example holds no positions at all
    pub fn is_empty(&self) -> bool {
        self.token_ids.is_empty()
    }
}

/// Preprocess Error
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum PreprocessError {
    /// A sentence carries a different number of words and tags
    #[error("sentence has {tokens} tokens but {tags} tags")]
    Misaligned {
        /// Word count
        tokens: usize,
        /// Tag count
        tags: usize,
    },

    /// A tag never seen in the training split
    #[error("tag {0:?} is not in the tag vocabulary")]
    UnknownTag(String),
}

/// Keep the first `max_length - 1` elements, leaving one slot for the start marker
pub fn truncate<T: Clone>(sequence: &[T], max_length: usize) -> Vec<T> {
    let keep = max_length.saturating_sub(1);

    sequence.iter().take(keep).cloned().collect()
}

/// Turns tagged sentences into aligned id sequences the model can consume
#[derive(new)]
pub struct Preprocessor<'a> {
    /// Vocabulary and sequence-length limit of the encoder
    tokenizer: &'a TokenizerAdapter,

    /// The tag mapping built from the training split
    tags: &'a TagVocabulary,

    /// Whether words are lowercased before the vocabulary lookup
    lowercase: bool,
}

impl<'a> Preprocessor<'a> {
    /// Truncate words and tags, look both up, and prepend the start/pad markers
    pub fn example<I: Item>(&self, item: &I) -> Result<Example, PreprocessError> {
        let (tokens, tags) = (item.tokens(), item.tags());
        if tokens.len() != tags.len() {
            return Err(PreprocessError::Misaligned {
                tokens: tokens.len(),
                tags: tags.len(),
            });
        }

        let tokens = self.normalize(&truncate(tokens, self.tokenizer.max_length));
        let tags = truncate(tags, self.tokenizer.max_length);

        let mut token_ids = Vec::with_capacity(tokens.len() + 1);
        token_ids.push(self.tokenizer.start_token_id);
        token_ids.extend(self.tokenizer.convert_tokens_to_ids(&tokens));

        let mut tag_ids = Vec::with_capacity(tags.len() + 1);
        tag_ids.push(self.tags.pad_id());
        for tag in tags {
            let id = self
                .tags
                .to_id(&tag)
                .ok_or_else(|| PreprocessError::UnknownTag(tag.clone()))?;

            tag_ids.push(id);
        }

        debug_assert_eq!(token_ids.len(), tag_ids.len());

        Ok(Example { token_ids, tag_ids })
    }

    /// Preprocess a whole split into an in-memory dataset
    pub fn dataset<'i, I, It>(&self, items: It) -> Result<InMemDataset<Example>, PreprocessError>
    where
        I: Item + 'i,
        It: IntoIterator<Item = &'i I>,
    {
        let examples = items
            .into_iter()
            .map(|item| self.example(item))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(InMemDataset::new(examples))
    }

    /// Apply the configured casing to words before lookup
    pub fn normalize(&self, tokens: &[String]) -> Vec<String> {
        if self.lowercase {
            tokens.iter().map(|token| token.to_lowercase()).collect()
        } else {
            tokens.to_vec()
        }
    }
}

#[cfg(test)]
mod tests {
    use burn::data::dataset::Dataset;
    use pretty_assertions::assert_eq;

    use crate::{
        datasets::udpos,
        pipelines::token_classification::{tags::PAD_TAG_ID, tokenizer::tests::adapter},
    };

    use super::*;

    fn item(tokens: &[&str], tags: &[&str]) -> udpos::Item {
        udpos::Item::new(
            tokens.iter().map(|t| t.to_string()).collect(),
            tags.iter().map(|t| t.to_string()).collect(),
        )
    }

    fn vocabulary() -> TagVocabulary {
        TagVocabulary::build([vec!["DET", "NOUN", "VERB", "PUNCT"]]).unwrap()
    }

    #[test]
    fn truncation_keeps_the_prefix() {
        assert_eq!(truncate(&[1, 2, 3, 4, 5], 4), vec![1, 2, 3]);
    }

    #[test]
    fn truncation_leaves_short_sequences_unchanged() {
        assert_eq!(truncate(&[1, 2], 4), vec![1, 2]);
        assert_eq!(truncate(&[1, 2, 3], 4), vec![1, 2, 3]);
    }

    #[test]
    fn truncation_never_exceeds_the_limit() {
        let sequence: Vec<usize> = (0..40).collect();

        for max_length in 0..50 {
            let truncated = truncate(&sequence, max_length);
            assert!(truncated.len() <= max_length.saturating_sub(1));
        }
    }

    #[test]
    fn prepends_start_and_pad_markers() {
        let tokenizer = adapter(16);
        let tags = vocabulary();
        let preprocessor = Preprocessor::new(&tokenizer, &tags, true);

        let example = preprocessor
            .example(&item(&["The", "cat", "sat", "."], &["DET", "NOUN", "VERB", "PUNCT"]))
            .unwrap();

        assert_eq!(example.token_ids, vec![2, 4, 5, 6, 7]);
        assert_eq!(example.tag_ids[0], PAD_TAG_ID);
        assert_eq!(example.tag_ids.len(), example.token_ids.len());
    }

    #[test]
    fn unknown_words_map_to_unk_and_casing_is_configurable() {
        let tokenizer = adapter(16);
        let tags = vocabulary();

        let cased = Preprocessor::new(&tokenizer, &tags, false)
            .example(&item(&["The", "zebra"], &["DET", "NOUN"]))
            .unwrap();

        assert_eq!(cased.token_ids, vec![2, 1, 1]);
    }

    #[test]
    fn long_sentences_are_truncated_to_the_encoder_limit() {
        let tokenizer = adapter(4);
        let tags = vocabulary();
        let preprocessor = Preprocessor::new(&tokenizer, &tags, true);

        let example = preprocessor
            .example(&item(
                &["the", "cat", "sat", "on", "the", "mat"],
                &["DET", "NOUN", "VERB", "DET", "DET", "NOUN"],
            ))
            .unwrap();

        assert_eq!(example.len(), 4);
        assert_eq!(example.tag_ids.len(), 4);
    }

    #[test]
    fn rejects_misaligned_and_unknown_tags() {
        let tokenizer = adapter(16);
        let tags = vocabulary();
        let preprocessor = Preprocessor::new(&tokenizer, &tags, true);

        assert_eq!(
            preprocessor.example(&item(&["the", "cat"], &["DET"])),
            Err(PreprocessError::Misaligned { tokens: 2, tags: 1 })
        );
        assert_eq!(
            preprocessor.example(&item(&["wow"], &["INTJ"])),
            Err(PreprocessError::UnknownTag("INTJ".to_string()))
        );
    }

    #[test]
    fn every_preprocessed_example_is_aligned() {
        let tokenizer = adapter(5);
        let tags = vocabulary();
        let preprocessor = Preprocessor::new(&tokenizer, &tags, true);

        let items = vec![
            item(&["the"], &["DET"]),
            item(&["the", "cat", "sat", "."], &["DET", "NOUN", "VERB", "PUNCT"]),
            item(
                &["a", "big", "dog", "ran", "on", "the", "mat", "."],
                &["DET", "DET", "NOUN", "VERB", "DET", "DET", "NOUN", "PUNCT"],
            ),
        ];

        let dataset = preprocessor.dataset(&items).unwrap();

        assert_eq!(dataset.len(), 3);
        for example in dataset.iter() {
            assert_eq!(example.token_ids.len(), example.tag_ids.len());
            assert!(example.len() <= 5);
        }
    }
}
