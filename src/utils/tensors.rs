use burn::tensor::{backend::Backend, Data, ElementConversion, Int, Shape, Tensor};

/// Right-pad each sequence with `pad_id` up to `seq_length`, typically to line tag ids up with
/// the padded token ids of the same batch. Longer sequences are cut at `seq_length`.
pub fn pad_to<B: Backend>(
    pad_id: usize,
    sequences: Vec<Vec<usize>>,
    seq_length: usize,
    device: &B::Device,
) -> Tensor<B, 2, Int> {
    let batch_size = sequences.len();

    let mut values: Vec<B::IntElem> = Vec::with_capacity(batch_size * seq_length);

    for sequence in sequences {
        let kept = sequence.len().min(seq_length);

        values.extend(sequence.into_iter().take(kept).map(|id| (id as i64).elem()));
        values.extend((kept..seq_length).map(|_| (pad_id as i64).elem()));
    }

    Tensor::from_data(
        Data::new(values, Shape::new([batch_size, seq_length])),
        device,
    )
}
