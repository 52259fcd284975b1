use std::{ops::AddAssign, time::Duration};

use burn::tensor::{activation::log_softmax, backend::Backend, ElementConversion, Int, Tensor};
use serde::{Deserialize, Deserializer, Serialize};

/// Cross-entropy over every position whose target is not `pad_id`, averaged over those
/// positions. Scores are [batch_size, seq_length, n_tags], targets [batch_size, seq_length].
pub fn masked_cross_entropy<B: Backend>(
    scores: Tensor<B, 3>,
    targets: Tensor<B, 2, Int>,
    pad_id: usize,
) -> Tensor<B, 1> {
    let [batch_size, seq_length, n_tags] = scores.dims();
    let positions = batch_size * seq_length;

    let log_probs = log_softmax(scores.reshape([positions, n_tags]), 1);
    let targets = targets.reshape([positions, 1]);

    // 1.0 where the target is a real tag, 0.0 on pad positions
    let mask = targets
        .clone()
        .equal_elem(pad_id as i64)
        .int()
        .neg()
        .add_scalar(1)
        .float()
        .reshape([positions]);

    let picked = log_probs.gather(1, targets).reshape([positions]);

    let count = mask.clone().sum().clamp_min(1.0);

    (picked * mask).sum().neg() / count
}

/// Exact-match counts over non-pad positions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskedAccuracy {
    /// Positions whose predicted tag equals the target
    pub correct: usize,

    /// Positions whose target is not the pad tag
    pub total: usize,
}

impl MaskedAccuracy {
    /// Compare flattened predicted and target ids, skipping targets equal to `pad_id`
    pub fn from_ids(predictions: &[i64], targets: &[i64], pad_id: usize) -> Self {
        let pad_id = pad_id as i64;

        predictions
            .iter()
            .zip(targets)
            .filter(|(_, target)| **target != pad_id)
            .fold(Self::default(), |acc, (prediction, target)| Self {
                correct: acc.correct + usize::from(prediction == target),
                total: acc.total + 1,
            })
    }

    /// Score a batch of tag scores against its targets
    pub fn from_scores<B: Backend>(
        scores: Tensor<B, 3>,
        targets: Tensor<B, 2, Int>,
        pad_id: usize,
    ) -> Self {
        let predictions = scores.argmax(2).into_data().convert::<i64>().value;
        let targets = targets.into_data().convert::<i64>().value;

        Self::from_ids(&predictions, &targets, pad_id)
    }

    /// The match rate, or `None` when there was nothing to score
    pub fn value(&self) -> Option<f64> {
        (self.total > 0).then(|| self.correct as f64 / self.total as f64)
    }
}

impl AddAssign for MaskedAccuracy {
    fn add_assign(&mut self, other: Self) {
        self.correct += other.correct;
        self.total += other.total;
    }
}

/// Running loss and accuracy over the batches of one pass
#[derive(Debug, Clone, Default)]
pub struct Running {
    loss_sum: f64,
    scored: usize,
    batches: usize,
    accuracy: MaskedAccuracy,
}

impl Running {
    /// Record one batch. A batch without non-pad positions has no loss to speak of and is
    /// left out of the average.
    pub fn update(&mut self, loss: f64, accuracy: MaskedAccuracy) {
        if accuracy.total > 0 {
            self.loss_sum += loss;
            self.scored += 1;
        }
        self.batches += 1;
        self.accuracy += accuracy;
    }

    /// Number of batches seen
    pub fn batches(&self) -> usize {
        self.batches
    }

    /// The averages so far
    pub fn summary(&self) -> Summary {
        Summary {
            loss: if self.scored == 0 {
                f64::NAN
            } else {
                self.loss_sum / self.scored as f64
            },
            accuracy: self.accuracy.value(),
            tokens: self.accuracy.total,
        }
    }
}

/// Average loss and masked accuracy of one pass over a split
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Mean of the per-batch losses, NaN when nothing was scored (written as `null`)
    #[serde(deserialize_with = "nan_from_null")]
    pub loss: f64,

    /// Exact-match rate over all non-pad positions, if there were any
    pub accuracy: Option<f64>,

    /// Number of non-pad positions scored
    pub tokens: usize,
}

impl Summary {
    /// Accuracy as a percentage for display
    pub fn accuracy_percent(&self) -> String {
        match self.accuracy {
            Some(accuracy) => format!("{:.2}%", accuracy * 100.0),
            None => "n/a".to_string(),
        }
    }
}

/// The outcome of one training epoch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    /// One-based epoch number
    pub epoch: usize,

    /// Metrics over the training batches
    pub train: Summary,

    /// Metrics over the validation split
    pub valid: Summary,

    /// Whether the parameters were written to the checkpoint after this epoch
    pub checkpointed: bool,

    /// Wall time of the epoch, in seconds
    pub seconds: f64,
}

fn nan_from_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// Per-epoch history of a training run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    /// One record per finished epoch
    pub epochs: Vec<EpochRecord>,
}

impl History {
    /// The best validation loss seen, if any epoch produced one
    pub fn best_valid_loss(&self) -> Option<f64> {
        self.epochs
            .iter()
            .map(|record| record.valid.loss)
            .filter(|loss| !loss.is_nan())
            .fold(None, |best, loss| match best {
                Some(best) if best <= loss => Some(best),
                _ => Some(loss),
            })
    }
}

/// Split a duration into whole minutes and seconds
pub fn epoch_time(elapsed: Duration) -> (u64, u64) {
    let seconds = elapsed.as_secs();

    (seconds / 60, seconds % 60)
}

/// Pull a scalar loss back to the host
pub fn scalar<B: Backend>(loss: Tensor<B, 1>) -> f64 {
    loss.into_scalar().elem::<f64>()
}
