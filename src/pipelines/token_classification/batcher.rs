use std::sync::Arc;

use burn::{
    data::{
        dataloader::{self, DataLoader, DataLoaderBuilder},
        dataset::InMemDataset,
    },
    nn::attention::generate_padding_mask,
    tensor::{backend::Backend, Bool, Int, Tensor},
};
use derive_new::new;

use crate::utils::tensors;

use super::preprocess::Example;

/// A token classification batch: padded token ids, their padding mask and the aligned tag ids
#[derive(Clone, Debug, new)]
pub struct Train<B: Backend> {
    /// Token ids as a 2D tensor: [batch_size, max_seq_length]
    pub tokens: Tensor<B, 2, Int>,

    /// Padding mask for the tokens containing booleans for padding locations
    pub mask_pad: Tensor<B, 2, Bool>,

    /// Tag ids, same shape as the tokens
    pub targets: Tensor<B, 2, Int>,
}

/// Struct for batching preprocessed examples
#[derive(Clone, new)]
pub struct Batcher<B: Backend> {
    /// ID of the text padding token
    pub pad_token_id: usize,

    /// ID of the pad tag
    pub tag_pad_id: usize,

    /// Device on which to perform computation (e.g., CPU or CUDA device)
    pub device: B::Device,
}

/// Implement Batcher trait for Batcher struct for training and evaluation
impl<B: Backend> dataloader::batcher::Batcher<Example, Train<B>> for Batcher<B> {
    /// Pads every example to the longest one in the batch
    fn batch(&self, items: Vec<Example>) -> Train<B> {
        let batch_size = items.len();

        let mut token_ids_list = Vec::with_capacity(batch_size);
        let mut tag_ids_list = Vec::with_capacity(batch_size);

        for Example { token_ids, tag_ids } in items {
            token_ids_list.push(token_ids);
            tag_ids_list.push(tag_ids);
        }

        // Inputs are already truncated to the encoder's limit, so no max length is imposed here
        let padding = generate_padding_mask(self.pad_token_id, token_ids_list, None, &self.device);

        let seq_length = padding.tensor.dims()[1];

        let targets = tensors::pad_to::<B>(self.tag_pad_id, tag_ids_list, seq_length, &self.device);

        Train {
            tokens: padding.tensor,
            mask_pad: padding.mask,
            targets,
        }
    }
}

/// Build a single-threaded data loader over preprocessed examples. Batches are shuffled with
/// the given seed, or kept in dataset order when no seed is given.
pub fn loader<B: Backend>(
    batcher: Batcher<B>,
    dataset: InMemDataset<Example>,
    batch_size: usize,
    shuffle: Option<u64>,
) -> Arc<dyn DataLoader<Train<B>>> {
    let builder = DataLoaderBuilder::new(batcher).batch_size(batch_size);

    match shuffle {
        Some(seed) => builder.shuffle(seed).build(dataset),
        None => builder.build(dataset),
    }
}
