//! Command line tool to fine-tune BERT for part-of-speech tagging

use anyhow::anyhow;
use bert_pos_tagger::{
    cli::{datasets::Dataset, models::Model},
    datasets::udpos::TagScheme,
    pipelines::token_classification::{self, Config},
};
use burn::backend::{libtorch::LibTorchDevice, Autodiff, LibTorch};
use pico_args::Arguments;

const HELP: &str = "\
Usage: train [OPTIONS]

Options:
  -h, --help             Print help
  -m, --model            The model to use (defaults to 'bert-base-uncased')
  -D, --dataset          The dataset to use (defaults to 'udpos')
  -d, --data-dir         The path to the top-level data directory (defaults to 'data')
  -n, --num-epochs       Number of epochs to train for
  -b, --batch-size       Batch size
  --learning-rate        Adam learning rate
  --seed                 Seed for initialization and batch shuffling
  --tags                 The tag column to learn, 'ud' or 'ptb' (defaults to 'ud')
  --freeze-encoder       Train the classification head only
  --cased                Do not lowercase words before the vocabulary lookup
  --cpu                  Train on the CPU instead of the first CUDA device
";

#[derive(Debug)]
struct Args {
    model: Option<String>,
    dataset: Option<String>,
    data_dir: Option<String>,
    num_epochs: Option<usize>,
    batch_size: Option<usize>,
    learning_rate: Option<f64>,
    seed: Option<u64>,
    tags: Option<String>,
    freeze_encoder: bool,
    cased: bool,
    cpu: bool,
}

impl Args {
    fn parse() -> anyhow::Result<Option<Self>> {
        let mut pargs = Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let args = Args {
            model: pargs.opt_value_from_str(["-m", "--model"])?,
            dataset: pargs.opt_value_from_str(["-D", "--dataset"])?,
            data_dir: pargs.opt_value_from_str(["-d", "--data-dir"])?,
            num_epochs: pargs.opt_value_from_str(["-n", "--num-epochs"])?,
            batch_size: pargs.opt_value_from_str(["-b", "--batch-size"])?,
            learning_rate: pargs.opt_value_from_str("--learning-rate")?,
            seed: pargs.opt_value_from_str("--seed")?,
            tags: pargs.opt_value_from_str("--tags")?,
            freeze_encoder: pargs.contains("--freeze-encoder"),
            cased: pargs.contains("--cased"),
            cpu: pargs.contains("--cpu"),
        };

        let remaining = pargs.finish();
        if !remaining.is_empty() {
            return Err(anyhow!("Unexpected arguments: {:?}", remaining));
        }

        Ok(Some(args))
    }

    fn config(&self) -> anyhow::Result<Config> {
        let model = match &self.model {
            Some(model) => Model::try_from(model.as_str())?,
            None => Model::default(),
        };

        let dataset = match &self.dataset {
            Some(dataset) => Dataset::try_from(dataset.as_str())?,
            None => Dataset::default(),
        };

        let mut config = Config::new(model.to_string(), dataset.to_string())
            .with_freeze_encoder(self.freeze_encoder)
            .with_lowercase(model.is_uncased() && !self.cased);

        if let Some(num_epochs) = self.num_epochs {
            config.num_epochs = num_epochs;
        }

        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }

        if let Some(learning_rate) = self.learning_rate {
            config.learning_rate = learning_rate;
        }

        if let Some(seed) = self.seed {
            config.seed = seed;
        }

        if let Some(tags) = &self.tags {
            config.tag_scheme = TagScheme::try_from(tags.as_str())?;
        }

        if let Some(data_dir) = &self.data_dir {
            config.data_dir = data_dir.to_string();
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let Some(args) = Args::parse()? else {
        print!("{}", HELP);

        return Ok(());
    };

    let config = args.config()?;

    let device = if args.cpu {
        LibTorchDevice::Cpu
    } else {
        LibTorchDevice::Cuda(0)
    };

    let report = token_classification::train::<Autodiff<LibTorch>>(device, config.clone()).await?;

    let best = report
        .history
        .epochs
        .iter()
        .rev()
        .find(|record| record.checkpointed)
        .map(|record| record.epoch);

    println!(
        "Best checkpoint: epoch {} | Test Loss: {:.3} | Test Acc: {}\nArtifacts: {}",
        best.map_or_else(|| "-".to_string(), |epoch| epoch.to_string()),
        report.test.loss,
        report.test.accuracy_percent(),
        config.artifact_dir().display()
    );

    Ok(())
}
