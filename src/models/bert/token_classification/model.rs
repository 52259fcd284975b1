use burn::{
    module::Module,
    nn::{Dropout, Linear},
    tensor::{activation::softmax, backend::Backend, Bool, Int, Tensor},
};

use crate::pipelines::token_classification::{
    self, batcher::Train, metrics::masked_cross_entropy, tags::PAD_TAG_ID, Encoder as _, Output,
};

use super::Encoder;

/// BERT for Token Classification
#[derive(Module, Debug)]
pub struct Model<B: Backend> {
    /// The pretrained BERT encoder
    pub encoder: Encoder<B>,

    /// Dropout on the hidden states, applied twice before the projection
    pub dropout: Dropout,

    /// Linear projection from hidden states to tag scores
    pub output: Linear<B>,

    /// Total number of tags, pad included
    pub n_tags: usize,

    /// Whether the encoder is excluded from optimization
    pub frozen_encoder: bool,
}

/// Define model behavior
impl<B: Backend> Model<B> {
    /// Per-position tag scores: [batch_size, seq_length, n_tags]
    pub fn scores(&self, tokens: Tensor<B, 2, Int>, mask_pad: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        let embedded = self.dropout.forward(self.encoder.embed(tokens, mask_pad));

        self.output.forward(self.dropout.forward(embedded))
    }
}

impl<B: Backend> token_classification::Model<B> for Model<B> {
    fn forward(&self, item: Train<B>) -> Output<B> {
        let device = &self.devices()[0];

        let targets = item.targets.to_device(device);
        let scores = self.scores(item.tokens.to_device(device), item.mask_pad.to_device(device));

        let loss = masked_cross_entropy(scores.clone(), targets.clone(), PAD_TAG_ID);

        Output::new(loss, scores, targets)
    }

    fn infer(&self, tokens: Tensor<B, 2, Int>, mask_pad: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        softmax(self.scores(tokens, mask_pad), 2)
    }

    fn n_tags(&self) -> usize {
        self.n_tags
    }

    fn max_length(&self) -> usize {
        self.encoder.max_length()
    }

    fn freeze_encoder(mut self) -> Self {
        self.encoder = self.encoder.no_grad();
        self.frozen_encoder = true;
        self
    }

    fn num_trainable_params(&self) -> usize {
        let encoder = if self.frozen_encoder {
            0
        } else {
            self.encoder.num_params()
        };

        encoder + self.output.num_params()
    }
}
