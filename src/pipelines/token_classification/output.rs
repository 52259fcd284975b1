use burn::tensor::{backend::Backend, Int, Tensor};
use derive_new::new;

use super::{metrics::MaskedAccuracy, tags::PAD_TAG_ID};

/// Token classification output for one batch
#[derive(new)]
pub struct Output<B: Backend> {
    /// The masked loss.
    pub loss: Tensor<B, 1>,

    /// Tag scores: [batch_size, seq_length, n_tags]
    pub scores: Tensor<B, 3>,

    /// The target tag ids: [batch_size, seq_length]
    pub targets: Tensor<B, 2, Int>,
}

impl<B: Backend> Output<B> {
    /// Exact-match counts over the non-pad positions of the batch
    pub fn accuracy(&self) -> MaskedAccuracy {
        MaskedAccuracy::from_scores(self.scores.clone(), self.targets.clone(), PAD_TAG_ID)
    }
}
