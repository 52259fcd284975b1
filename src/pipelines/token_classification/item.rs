use std::fmt::Debug;

/// A trait for items that can be used for token classification
pub trait Item: Send + Sync + Clone + Debug {
    /// Returns the pre-tokenized words of the item
    fn tokens(&self) -> &[String];

    /// Returns one class label per word
    fn tags(&self) -> &[String];
}
