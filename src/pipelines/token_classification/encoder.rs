use burn::tensor::{backend::Backend, Bool, Int, Tensor};

/// The boundary to a pretrained contextual encoder. Implementations adapt a concrete
/// pretrained-model library; nothing else in the pipeline touches it.
pub trait Encoder<B: Backend> {
    /// Embed a padded batch of token ids: [batch_size, seq_length] -> [batch_size, seq_length, hidden_size]
    fn embed(&self, tokens: Tensor<B, 2, Int>, mask_pad: Tensor<B, 2, Bool>) -> Tensor<B, 3>;

    /// The size of each per-position embedding
    fn hidden_size(&self) -> usize;

    /// The longest sequence, start token included, the encoder accepts
    fn max_length(&self) -> usize;
}
