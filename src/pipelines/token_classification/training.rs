use std::{path::Path, time::Instant};

use burn::{
    config::Config as _,
    data::dataset::{Dataset as _, InMemDataset},
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    tensor::backend::{AutodiffBackend, Backend},
};
use log::{debug, info};

use crate::{
    datasets::{udpos, Split},
    models::bert,
    utils::hugging_face::download_hf_model,
};

use super::{
    batcher::{loader, Batcher},
    checkpoint::{self, Checkpointer},
    config::{Config, METRICS_FILE, MODEL_CONFIG_FILE, TOKENIZER_FILE, TRAINING_CONFIG_FILE},
    evaluation::evaluate,
    metrics::{epoch_time, scalar, EpochRecord, History, Running, Summary},
    preprocess::{Example, Preprocessor},
    tags::{TagVocabulary, PAD_TAG_ID},
    tokenizer::{SpecialTokens, TokenizerAdapter},
    Model,
};

/// The outcome of a full training run
#[derive(Debug, Clone)]
pub struct Report {
    /// Per-epoch metrics
    pub history: History,

    /// Test metrics of the best checkpoint
    pub test: Summary,
}

/// Train for a fixed number of epochs, validating after each one and checkpointing the
/// parameters whenever validation loss strictly improves. Returns the final-epoch model and
/// the per-epoch history; the best parameters are in the checkpoint under `artifact_dir`.
pub fn fit<B, M>(
    model: M,
    dataset_train: InMemDataset<Example>,
    dataset_valid: InMemDataset<Example>,
    pad_token_id: usize,
    config: &Config,
    artifact_dir: &Path,
    device: &B::Device,
) -> anyhow::Result<(M, History)>
where
    B: AutodiffBackend,
    M: AutodiffModule<B> + Model<B>,
    M::InnerModule: Model<B::InnerBackend>,
{
    std::fs::create_dir_all(artifact_dir)?;

    let mut model = if config.freeze_encoder {
        info!("Freezing the encoder, only the classification head is trained");
        model.freeze_encoder()
    } else {
        model
    };

    info!(
        "The model has {} trainable parameters",
        model.num_trainable_params()
    );

    let dataloader_train = loader(
        Batcher::<B>::new(pad_token_id, PAD_TAG_ID, device.clone()),
        dataset_train,
        config.batch_size,
        Some(config.seed),
    );

    let dataloader_valid = loader(
        Batcher::<B::InnerBackend>::new(pad_token_id, PAD_TAG_ID, device.clone()),
        dataset_valid,
        config.batch_size,
        None,
    );

    let mut optimizer = AdamConfig::new().with_epsilon(config.adam_epsilon).init();
    let mut checkpointer = Checkpointer::new(artifact_dir);
    let mut history = History::default();

    for epoch in 1..=config.num_epochs {
        let start = Instant::now();
        let mut running = Running::default();

        for (iteration, batch) in dataloader_train.iter().enumerate() {
            let output = model.forward(batch);

            let loss = scalar(output.loss.clone());
            let accuracy = output.accuracy();

            let grads = output.loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);

            model = optimizer.step(config.learning_rate, model, grads);

            running.update(loss, accuracy);

            debug!(
                "[Epoch {} - Iteration {}] loss {:.4}",
                epoch,
                iteration + 1,
                loss
            );
        }

        let train = running.summary();
        let valid = evaluate(&model.valid(), &dataloader_valid);

        let checkpointed = checkpointer.observe(valid.loss, &model)?;

        let elapsed = start.elapsed();
        let (minutes, seconds) = epoch_time(elapsed);

        info!(
            "Epoch: {:02} | Epoch Time: {}m {}s{}",
            epoch,
            minutes,
            seconds,
            if checkpointed { " | checkpoint saved" } else { "" }
        );
        info!(
            "\tTrain Loss: {:.3} | Train Acc: {}",
            train.loss,
            train.accuracy_percent()
        );
        info!(
            "\t Val. Loss: {:.3} |  Val. Acc: {}",
            valid.loss,
            valid.accuracy_percent()
        );

        history.epochs.push(EpochRecord {
            epoch,
            train,
            valid,
            checkpointed,
            seconds: elapsed.as_secs_f64(),
        });
    }

    std::fs::write(
        artifact_dir.join(METRICS_FILE),
        serde_json::to_string_pretty(&history)?,
    )?;

    Ok((model, history))
}

/// Evaluate the best checkpoint on a split
pub fn test<B, M>(
    model: M,
    dataset_test: InMemDataset<Example>,
    pad_token_id: usize,
    config: &Config,
    artifact_dir: &Path,
    device: &B::Device,
) -> anyhow::Result<Summary>
where
    B: Backend,
    M: Model<B>,
{
    let model = checkpoint::load(model, &artifact_dir.join(checkpoint::MODEL_FILE), device)?;

    let dataloader_test = loader(
        Batcher::<B>::new(pad_token_id, PAD_TAG_ID, device.clone()),
        dataset_test,
        config.batch_size,
        None,
    );

    let summary = evaluate(&model, &dataloader_test);

    info!(
        "Test Loss: {:.3} | Test Acc: {}",
        summary.loss,
        summary.accuracy_percent()
    );

    Ok(summary)
}

/// Define train function: fetch the pretrained model, adapt the dataset to it, fine-tune,
/// and report test metrics of the best checkpoint
pub async fn train<B: AutodiffBackend>(device: B::Device, config: Config) -> anyhow::Result<Report> {
    let artifact_dir = config.artifact_dir();
    std::fs::create_dir_all(&artifact_dir)?;

    let files = download_hf_model(&config.model_name).await?;

    let items_train = load_items(&config, Split::Train).await?;
    let items_valid = load_items(&config, Split::Validation).await?;
    let items_test = load_items(&config, Split::Test).await?;

    let tags = TagVocabulary::build(items_train.iter().map(|item| item.tags.as_slice()))?;

    info!("Built a vocabulary of {} tags", tags.len());
    for share in TagVocabulary::percentages(items_train.iter().map(|item| item.tags.as_slice())) {
        info!("\t{}\t{}\t{:4.1}%", share.tag, share.count, share.percentage);
    }

    let model_config = bert::token_classification::Config::load_pretrained(
        files.config.clone(),
        &tags,
        config.hidden_dropout_prob,
    )?;

    let tokenizer = TokenizerAdapter::from_file(
        &files.tokenizer,
        &SpecialTokens::default(),
        model_config.max_length(),
    )?;

    let preprocessor = Preprocessor::new(&tokenizer, &tags, config.lowercase);
    let dataset_train = preprocessor.dataset(&items_train)?;
    let dataset_valid = preprocessor.dataset(&items_valid)?;
    let dataset_test = preprocessor.dataset(&items_test)?;

    info!(
        "Prepared {} training, {} validation and {} test examples",
        dataset_train.len(),
        dataset_valid.len(),
        dataset_test.len()
    );

    // Save the configurations and tokenizer so inference can rebuild the pipeline offline
    model_config
        .save(artifact_dir.join(MODEL_CONFIG_FILE))
        .map_err(|e| anyhow!("Unable to save model config: {}", e))?;
    config
        .save(artifact_dir.join(TRAINING_CONFIG_FILE))
        .map_err(|e| anyhow!("Unable to save training config: {}", e))?;
    std::fs::copy(&files.tokenizer, artifact_dir.join(TOKENIZER_FILE))?;

    B::seed(config.seed);
    let model = model_config.init_pretrained::<B>(files.weights.clone(), &device);

    let (model, history) = fit(
        model,
        dataset_train,
        dataset_valid,
        tokenizer.pad_token_id,
        &config,
        &artifact_dir,
        &device,
    )?;

    let summary = test(
        model.valid(),
        dataset_test,
        tokenizer.pad_token_id,
        &config,
        &artifact_dir,
        &device,
    )?;

    Ok(Report {
        history,
        test: summary,
    })
}

async fn load_items(config: &Config, split: Split) -> anyhow::Result<Vec<udpos::Item>> {
    let dataset = udpos::Dataset::load(&config.data_dir, split, config.tag_scheme).await?;

    Ok(dataset.iter().collect())
}
