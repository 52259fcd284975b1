use std::sync::Arc;

use burn::{data::dataloader::DataLoader, tensor::backend::Backend};

use super::{
    batcher::Train,
    metrics::{scalar, Running, Summary},
    Model,
};

/// Run the model over every batch without touching its parameters, returning the average
/// masked loss and the masked accuracy. Intended for a non-autodiff backend, where no
/// gradients are tracked and dropout is inactive.
pub fn evaluate<B: Backend, M: Model<B>>(
    model: &M,
    dataloader: &Arc<dyn DataLoader<Train<B>>>,
) -> Summary {
    let mut running = Running::default();

    for batch in dataloader.iter() {
        let output = model.forward(batch);

        running.update(scalar(output.loss.clone()), output.accuracy());
    }

    log::debug!("Evaluated {} batches", running.batches());

    running.summary()
}

#[cfg(test)]
mod tests {
    use burn::{backend::NdArray, data::dataset::InMemDataset};
    use pretty_assertions::assert_eq;

    use crate::{
        models::bert::token_classification::tests::tiny_model,
        pipelines::token_classification::{
            batcher::{loader, Batcher},
            preprocess::Example,
            tags::PAD_TAG_ID,
        },
    };

    use super::*;

    fn examples() -> Vec<Example> {
        vec![
            Example {
                token_ids: vec![2, 4, 5, 6, 7],
                tag_ids: vec![0, 1, 2, 3, 4],
            },
            Example {
                token_ids: vec![2, 8, 9, 10],
                tag_ids: vec![0, 1, 2, 3],
            },
            Example {
                token_ids: vec![2, 4, 13, 12],
                tag_ids: vec![0, 1, 6, 2],
            },
        ]
    }

    #[test]
    fn evaluating_twice_gives_identical_results() {
        let device = Default::default();
        let model = tiny_model::<NdArray>(&device);

        let dataloader = loader(
            Batcher::<NdArray>::new(0, PAD_TAG_ID, device),
            InMemDataset::new(examples()),
            2,
            None,
        );

        let first = evaluate(&model, &dataloader);
        let second = evaluate(&model, &dataloader);

        assert_eq!(first, second);
        assert_eq!(first.tokens, 10);
        assert!(first.loss.is_finite());
        assert!(first.accuracy.is_some());
    }
}
