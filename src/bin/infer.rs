//! Command line tool to tag sentences with a fine-tuned model

use anyhow::anyhow;
use bert_pos_tagger::{
    cli::models::Model,
    datasets::{udpos, Split},
    pipelines::token_classification::{config::artifact_dir, Tagger},
};
use burn::backend::{libtorch::LibTorchDevice, LibTorch};
use pico_args::Arguments;

const HELP: &str = "\
Usage: infer [OPTIONS] [SENTENCE...]

Arguments:
  SENTENCE             Text to tag. Without sentences, tags a sample of the test split

Options:
  -h, --help           Print help
  -m, --model          The fine-tuned model to use (defaults to 'bert-base-uncased')
  -d, --data-dir       The path to the top-level data directory (defaults to 'data')
  -s, --samples        Number of test sentences to sample (defaults to 5)
  --seed               Seed for sampling test sentences (defaults to 1234)
  --cpu                Run on the CPU instead of the first CUDA device
";

#[derive(Debug)]
struct Args {
    model: Option<String>,
    data_dir: String,
    samples: usize,
    seed: u64,
    cpu: bool,
    sentences: Vec<String>,
}

impl Args {
    fn parse() -> anyhow::Result<Option<Self>> {
        let mut pargs = Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let model = pargs.opt_value_from_str(["-m", "--model"])?;
        let data_dir = pargs
            .opt_value_from_str(["-d", "--data-dir"])?
            .unwrap_or_else(|| "data".to_string());
        let samples = pargs.opt_value_from_str(["-s", "--samples"])?.unwrap_or(5);
        let seed = pargs.opt_value_from_str("--seed")?.unwrap_or(1234);
        let cpu = pargs.contains("--cpu");

        let sentences = pargs
            .finish()
            .into_iter()
            .map(|arg| {
                arg.into_string()
                    .map_err(|arg| anyhow!("Invalid UTF-8 in argument: {:?}", arg))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Some(Args {
            model,
            data_dir,
            samples,
            seed,
            cpu,
            sentences,
        }))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let Some(args) = Args::parse()? else {
        print!("{}", HELP);

        return Ok(());
    };

    let model = match &args.model {
        Some(model) => Model::try_from(model.as_str())?,
        None => Model::default(),
    };

    let device = if args.cpu {
        LibTorchDevice::Cpu
    } else {
        LibTorchDevice::Cuda(0)
    };

    let tagger =
        Tagger::<LibTorch>::load(&artifact_dir(&args.data_dir, &model.to_string()), device)?;

    if !args.sentences.is_empty() {
        for (i, sentence) in args.sentences.iter().enumerate() {
            let tagged = tagger.tag(sentence.as_str())?;

            println!("\n=== Sentence {} ===", i + 1);
            for (token, tag) in tagged.pairs() {
                println!("{:<16}{}", token, tag);
            }
            if !tagged.unknown.is_empty() {
                println!("- Unknown: {}", tagged.unknown.join(", "));
            }
        }

        return Ok(());
    }

    let dataset = udpos::Dataset::load(&args.data_dir, Split::Test, tagger.config.tag_scheme).await?;

    for (i, item) in dataset.sample(args.samples, args.seed).into_iter().enumerate() {
        let tagged = tagger.tag(item.tokens.clone())?;

        println!("\n=== Item {} ===", i + 1);
        println!("{:<16}{:<8}{:<8}", "Token", "Gold", "Predicted");
        for ((token, predicted), gold) in tagged.pairs().into_iter().zip(&item.tags) {
            let marker = if predicted == gold.as_str() { "" } else { "  ✗" };
            println!("{:<16}{:<8}{:<8}{}", token, gold, predicted, marker);
        }
        if !tagged.unknown.is_empty() {
            println!("- Unknown: {}", tagged.unknown.join(", "));
        }
    }

    Ok(())
}
