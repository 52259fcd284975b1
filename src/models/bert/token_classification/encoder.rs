use bert_burn::{
    data::BertInferenceBatch,
    model::{BertModel, BertModelOutput},
};
use burn::{
    module::Module,
    tensor::{backend::Backend, Bool, Int, Tensor},
};
use derive_new::new;

use crate::pipelines::token_classification;

/// Adapts `bert-burn`'s BERT to the token classification encoder boundary
#[derive(Module, Debug, new)]
pub struct Encoder<B: Backend> {
    /// The pretrained BERT model
    pub model: BertModel<B>,

    /// Size of each hidden state (e.g., 768 for bert-base)
    pub hidden_size: usize,

    /// Number of position embeddings
    pub max_length: usize,
}

impl<B: Backend> token_classification::Encoder<B> for Encoder<B> {
    fn embed(&self, tokens: Tensor<B, 2, Int>, mask_pad: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        let BertModelOutput { hidden_states, .. } =
            self.model.forward(BertInferenceBatch { tokens, mask_pad });

        hidden_states
    }

    fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    fn max_length(&self) -> usize {
        self.max_length
    }
}
