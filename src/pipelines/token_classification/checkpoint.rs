use std::path::{Path, PathBuf};

use burn::{module::Module, record::CompactRecorder, tensor::backend::Backend};

/// File stem of the parameter checkpoint inside the artifact directory
pub static MODEL_FILE: &str = "model";

/// Checkpoint Error
#[derive(thiserror::Error, Debug)]
pub enum CheckpointError {
    /// The parameters could not be written
    #[error("unable to save checkpoint to {path}: {reason}")]
    Save {
        /// Checkpoint path
        path: String,
        /// Recorder message
        reason: String,
    },

    /// The parameters could not be read back
    #[error("unable to load checkpoint from {path}: {reason}")]
    Load {
        /// Checkpoint path
        path: String,
        /// Recorder message
        reason: String,
    },
}

/// Tracks the lowest validation loss seen so far
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BestLoss {
    best: Option<f64>,
}

impl BestLoss {
    /// Record a validation loss. Returns true only when it is strictly lower than every
    /// loss before it.
    pub fn improves(&mut self, loss: f64) -> bool {
        if loss.is_nan() {
            return false;
        }

        match self.best {
            Some(best) if loss >= best => false,
            _ => {
                self.best = Some(loss);
                true
            }
        }
    }

    /// The lowest loss recorded
    pub fn best(&self) -> Option<f64> {
        self.best
    }
}

/// Writes the parameters whenever validation loss improves
#[derive(Debug, Clone)]
pub struct Checkpointer {
    path: PathBuf,
    best: BestLoss,
}

impl Checkpointer {
    /// A checkpointer writing to `{artifact_dir}/model`
    pub fn new(artifact_dir: impl AsRef<Path>) -> Self {
        Self {
            path: artifact_dir.as_ref().join(MODEL_FILE),
            best: BestLoss::default(),
        }
    }

    /// Decide on this epoch's validation loss, saving the model if it improved
    pub fn observe<B: Backend, M: Module<B>>(
        &mut self,
        valid_loss: f64,
        model: &M,
    ) -> Result<bool, CheckpointError> {
        if !self.best.improves(valid_loss) {
            return Ok(false);
        }

        save(model, &self.path)?;

        Ok(true)
    }

    /// The checkpoint path, without the recorder's extension
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The lowest validation loss checkpointed so far
    pub fn best_loss(&self) -> Option<f64> {
        self.best.best()
    }
}

/// Serialize all parameters of a model
pub fn save<B: Backend, M: Module<B>>(model: &M, path: &Path) -> Result<(), CheckpointError> {
    model
        .clone()
        .save_file(path.to_path_buf(), &CompactRecorder::new())
        .map_err(|e| CheckpointError::Save {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}

/// Load parameters into an initialized model of the same architecture
pub fn load<B: Backend, M: Module<B>>(
    model: M,
    path: &Path,
    device: &B::Device,
) -> Result<M, CheckpointError> {
    model
        .load_file(path.to_path_buf(), &CompactRecorder::new(), device)
        .map_err(|e| CheckpointError::Load {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}
