use std::path::PathBuf;

use hf_hub::api::tokio::{Api, ApiError};

/// Local paths to the pretrained artifacts of a model on the Hugging Face Hub
#[derive(Debug, Clone)]
pub struct PretrainedFiles {
    /// The model architecture config (`config.json`)
    pub config: PathBuf,

    /// The model weights (`model.safetensors`)
    pub weights: PathBuf,

    /// The serialized tokenizer (`tokenizer.json`)
    pub tokenizer: PathBuf,
}

/// Hugging Face Hub download error
#[derive(thiserror::Error, Debug)]
pub enum DownloadError {
    /// The Hub API could not be initialized
    #[error("unable to reach the Hugging Face Hub: {0}")]
    Api(#[source] ApiError),

    /// A file could not be fetched for the model
    #[error("failed to download {file} for {model} from the Hugging Face Hub: {source}")]
    File {
        /// The model name
        model: String,
        /// The requested file
        file: String,
        /// The underlying API error
        #[source]
        source: ApiError,
    },
}

/// Download model config, weights and tokenizer from Hugging Face Hub
/// If a file exists in cache, it will not be downloaded again
pub async fn download_hf_model(model_name: &str) -> Result<PretrainedFiles, DownloadError> {
    let api = Api::new().map_err(DownloadError::Api)?;
    let repo = api.model(model_name.to_string());

    let get = |file: &'static str| {
        let repo = &repo;

        async move {
            log::debug!("Fetching {} for {}", file, model_name);

            repo.get(file).await.map_err(|source| DownloadError::File {
                model: model_name.to_string(),
                file: file.to_string(),
                source,
            })
        }
    };

    Ok(PretrainedFiles {
        config: get("config.json").await?,
        weights: get("model.safetensors").await?,
        tokenizer: get("tokenizer.json").await?,
    })
}
