use burn::{
    module::Module,
    tensor::{backend::Backend, Bool, Int, Tensor},
};

use super::{batcher::Train, Output};

/// A trait for models that can be used for Token Classification
pub trait Model<B: Backend>: Module<B> {
    /// Perform a forward pass over a training or evaluation batch, with masked loss
    fn forward(&self, item: Train<B>) -> Output<B>;

    /// Defines forward pass for inference: per-position tag probabilities
    fn infer(&self, tokens: Tensor<B, 2, Int>, mask_pad: Tensor<B, 2, Bool>) -> Tensor<B, 3>;

    /// Number of tags in the output space, pad tag included
    fn n_tags(&self) -> usize;

    /// The longest sequence, start token included, the model accepts
    fn max_length(&self) -> usize;

    /// Stop gradients from reaching the pretrained encoder
    fn freeze_encoder(self) -> Self;

    /// Number of parameters the optimizer will update
    fn num_trainable_params(&self) -> usize;
}
