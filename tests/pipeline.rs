use std::str::FromStr;

use bert_burn::model::BertModelConfig;
use bert_pos_tagger::{
    datasets::udpos,
    models::bert,
    pipelines::token_classification::{
        config::{MODEL_CONFIG_FILE, METRICS_FILE, TOKENIZER_FILE, TRAINING_CONFIG_FILE},
        metrics::History,
        preprocess::Preprocessor,
        tags::TagVocabulary,
        tokenizer::{SpecialTokens, TokenizerAdapter},
        training::{fit, test},
        Config, Encoder as _, Model as _, Tagger,
    },
};
use burn::{
    backend::{Autodiff, NdArray},
    config::Config as _,
    module::AutodiffModule,
    nn::attention::generate_padding_mask,
};
use pretty_assertions::assert_eq;
use tokenizers::Tokenizer;

type TrainBackend = Autodiff<NdArray>;

const MAX_LENGTH: usize = 16;

const CORPUS: &str = "\
The\tDET\tDT
cat\tNOUN\tNN
sat\tVERB\tVBD
.\tPUNCT\t.

A\tDET\tDT
dog\tNOUN\tNN
ran\tVERB\tVBD
.\tPUNCT\t.

The\tDET\tDT
big\tADJ\tJJ
dog\tNOUN\tNN
sat\tVERB\tVBD
on\tADP\tIN
the\tDET\tDT
mat\tNOUN\tNN
.\tPUNCT\t.

A\tDET\tDT
cat\tNOUN\tNN
ran\tVERB\tVBD
.\tPUNCT\t.
";

fn tokenizer() -> Tokenizer {
    let words = [
        "[PAD]", "[UNK]", "[CLS]", "[SEP]", "the", "cat", "sat", ".", "a", "dog", "ran", "on",
        "mat", "big",
    ];

    let vocab = words
        .iter()
        .enumerate()
        .map(|(i, w)| format!("{:?}: {}", w, i))
        .collect::<Vec<_>>()
        .join(", ");

    let json = format!(
        r#"{{
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [],
            "normalizer": {{ "type": "Lowercase" }},
            "pre_tokenizer": {{ "type": "BertPreTokenizer" }},
            "post_processor": null,
            "decoder": null,
            "model": {{ "type": "WordLevel", "vocab": {{ {} }}, "unk_token": "[UNK]" }}
        }}"#,
        vocab
    );

    Tokenizer::from_str(&json).unwrap()
}

fn model_config(tags: &TagVocabulary) -> bert::token_classification::Config {
    let encoder = BertModelConfig::new(
        2,
        1,
        1e-12,
        8,
        16,
        16,
        MAX_LENGTH,
        2,
        0.1,
        "bert".to_string(),
        0,
    )
    .with_max_seq_len(Some(MAX_LENGTH))
    .with_with_pooling_layer(Some(false));

    bert::token_classification::Config::new(encoder, tags.tags().to_vec())
}

#[test]
fn trains_checkpoints_and_tags() {
    let dir = tempfile::tempdir().unwrap();
    let device = Default::default();

    let items = udpos::parse(CORPUS, udpos::TagScheme::Ud).unwrap();
    let tags = TagVocabulary::build(items.iter().map(|item| item.tags.as_slice())).unwrap();
    let adapter =
        TokenizerAdapter::new(tokenizer(), &SpecialTokens::default(), MAX_LENGTH).unwrap();

    let preprocessor = Preprocessor::new(&adapter, &tags, true);
    let dataset_train = preprocessor.dataset(&items).unwrap();
    let dataset_valid = preprocessor.dataset(&items).unwrap();
    let dataset_test = preprocessor.dataset(&items).unwrap();

    let config = Config::new("tiny-bert".to_string(), udpos::DATASET.to_string())
        .with_num_epochs(2)
        .with_batch_size(2)
        .with_learning_rate(1e-3);

    let model_config = model_config(&tags);
    let model = model_config.init::<TrainBackend>(&device);

    let (model, history) = fit(
        model,
        dataset_train,
        dataset_valid,
        adapter.pad_token_id,
        &config,
        dir.path(),
        &device,
    )
    .unwrap();

    assert_eq!(history.epochs.len(), 2);
    assert!(history.epochs[0].checkpointed);
    assert_eq!(history.epochs[0].train.tokens, 20);
    assert!(history.best_valid_loss().is_some());

    let metrics = std::fs::read_to_string(dir.path().join(METRICS_FILE)).unwrap();
    let saved: History = serde_json::from_str(&metrics).unwrap();
    assert_eq!(saved.epochs.len(), 2);

    let summary = test(
        model_config.init::<NdArray>(&device),
        dataset_test,
        adapter.pad_token_id,
        &config,
        dir.path(),
        &device,
    )
    .unwrap();

    assert_eq!(summary.tokens, 20);
    // The checkpoint is stored in half precision
    let best = history.best_valid_loss().unwrap();
    assert!((summary.loss - best).abs() < 5e-2);

    model_config.save(dir.path().join(MODEL_CONFIG_FILE)).unwrap();
    config.save(dir.path().join(TRAINING_CONFIG_FILE)).unwrap();
    tokenizer()
        .save(dir.path().join(TOKENIZER_FILE), false)
        .unwrap();

    let tagger = Tagger::<NdArray>::load(dir.path(), device).unwrap();
    let tagged = tagger.tag("The cat sat.").unwrap();

    assert_eq!(tagged.pairs().len(), 4);
    assert_eq!(tagged.tokens, vec!["the", "cat", "sat", "."]);
    assert!(tagged.tags.iter().all(|tag| tags.to_id(tag).is_some()));

    assert_eq!(model.valid().n_tags(), tags.len());
}

/// Largest element-wise difference between two snapshots
fn max_change(before: &[f32], after: &[f32]) -> f32 {
    before
        .iter()
        .zip(after)
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f32::max)
}

/// Train one epoch and report how far the encoder output and head weights moved
fn encoder_and_head_change(freeze_encoder: bool) -> (f32, f32, usize) {
    let dir = tempfile::tempdir().unwrap();
    let device = Default::default();

    let items = udpos::parse(CORPUS, udpos::TagScheme::Ptb).unwrap();
    let tags = TagVocabulary::build(items.iter().map(|item| item.tags.as_slice())).unwrap();
    let adapter =
        TokenizerAdapter::new(tokenizer(), &SpecialTokens::default(), MAX_LENGTH).unwrap();

    let preprocessor = Preprocessor::new(&adapter, &tags, true);
    let dataset_train = preprocessor.dataset(&items).unwrap();
    let dataset_valid = preprocessor.dataset(&items).unwrap();

    let config = Config::new("tiny-bert".to_string(), udpos::DATASET.to_string())
        .with_num_epochs(1)
        .with_batch_size(2)
        .with_learning_rate(1e-2)
        .with_freeze_encoder(freeze_encoder);

    let embed = |model: &bert::token_classification::Model<NdArray>| {
        let input = generate_padding_mask::<NdArray>(
            adapter.pad_token_id,
            vec![vec![2, 4, 13, 9, 6, 11, 4, 12, 7]],
            None,
            &device,
        );

        model.encoder.embed(input.tensor, input.mask).into_data().value
    };

    let model = model_config(&tags).init::<TrainBackend>(&device);
    let encoder_before = embed(&model.valid());
    let head_before = model.output.weight.val().into_data().value;

    let (model, history) = fit(
        model,
        dataset_train,
        dataset_valid,
        adapter.pad_token_id,
        &config,
        dir.path(),
        &device,
    )
    .unwrap();

    assert_eq!(history.epochs.len(), 1);
    assert_eq!(model.frozen_encoder, freeze_encoder);

    let encoder_after = embed(&model.valid());
    let head_after = model.output.weight.val().into_data().value;

    (
        max_change(&encoder_before, &encoder_after),
        max_change(&head_before, &head_after),
        model.num_trainable_params(),
    )
}

#[test]
fn frozen_encoder_trains_only_the_head() {
    let (encoder, head, trainable) = encoder_and_head_change(true);

    assert!(encoder < 1e-6, "frozen encoder moved by {}", encoder);
    assert!(head > 1e-4, "head did not train");

    // 8 hidden units into 7 tags (6 PTB tags + pad), plus the bias
    assert_eq!(trainable, 8 * 7 + 7);
}

#[test]
fn unfrozen_encoder_is_fine_tuned() {
    let (encoder, head, trainable) = encoder_and_head_change(false);

    assert!(encoder > 1e-4, "encoder did not train");
    assert!(head > 1e-4, "head did not train");
    assert!(trainable > 8 * 7 + 7);
}
