//! `cvmatch` — mine triplets, train, and evaluate resume retrieval models.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use cvmatch_eval::{
    HumanStudy, NamedModel, compare_models, evaluate_study, evaluate_trials, rank_candidates,
    sample_trials,
};
use cvmatch_mine::openai::{OpenAiChat, OpenAiEmbeddings};
use cvmatch_mine::remote::{RemoteScorer, RemoteTrainer};
use cvmatch_mine::{
    Corpus, EmbeddingProvider, MinerConfig, MiningPipeline, PipelineConfig, RelevanceScorer,
    TermOverlapScorer, TrainOptions,
};

#[derive(Parser)]
#[command(name = "cvmatch", version, about = "Resume retrieval: triplet mining, training, evaluation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full mining pipeline and train the bi-encoder.
    Train(TrainArgs),
    /// Evaluate one model on simulated per-category queries.
    Eval(EvalArgs),
    /// Compare several models on the same sampled trials.
    Compare(CompareArgs),
    /// Correlate a model's ranking with human rankings from a study file.
    Human(HumanArgs),
    /// Rank candidate resumes against a job description.
    Rank(RankArgs),
}

#[derive(Args)]
struct EmbedArgs {
    /// OpenAI embedding model name.
    #[arg(long, default_value = "text-embedding-3-small")]
    embed_model: String,
    /// Embedding dimensionality of the model.
    #[arg(long, default_value_t = 1536)]
    embed_dimensions: usize,
}

impl EmbedArgs {
    fn provider(&self) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
        let provider = OpenAiEmbeddings::from_env()?
            .with_model(&self.embed_model, self.embed_dimensions);
        Ok(Arc::new(provider))
    }
}

#[derive(Args)]
struct TrainArgs {
    /// Corpus CSV with `Resume` and `Category` columns.
    corpus: PathBuf,
    /// Directory for stage artifacts.
    #[arg(long, default_value = "out")]
    output_dir: PathBuf,
    /// Minimum cosine similarity for an accepted negative.
    #[arg(long, default_value_t = 0.25)]
    similarity_floor: f32,
    /// Negatives accepted per query.
    #[arg(long, default_value_t = 3)]
    max_negatives: usize,
    /// Top-k candidate pool size.
    #[arg(long, default_value_t = 10)]
    pool_size: usize,
    /// Training batch size.
    #[arg(long, default_value_t = 8)]
    batch_size: usize,
    /// Training epochs.
    #[arg(long, default_value_t = 3)]
    epochs: usize,
    /// Linear warmup steps.
    #[arg(long, default_value_t = 100)]
    warmup_steps: usize,
    /// Where the trained model artifact is written (on the training server).
    #[arg(long, default_value = "dual_encoder_model")]
    model_out: String,
    /// Base URL of the model-serving sidecar (rerank + train endpoints).
    #[arg(long, default_value = "http://127.0.0.1:8400")]
    server_url: String,
    /// Score triplets with the offline term-overlap scorer instead of the
    /// sidecar's cross-encoder.
    #[arg(long)]
    offline_scorer: bool,
    #[command(flatten)]
    embed: EmbedArgs,
}

#[derive(Args)]
struct EvalArgs {
    /// Corpus CSV with `Resume` and `Category` columns.
    corpus: PathBuf,
    /// Recall@K window.
    #[arg(short, default_value_t = 5)]
    k: usize,
    /// Negatives sampled per trial.
    #[arg(long, default_value_t = 10)]
    negatives: usize,
    /// RNG seed for trial sampling.
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[command(flatten)]
    embed: EmbedArgs,
}

#[derive(Args)]
struct CompareArgs {
    /// Corpus CSV with `Resume` and `Category` columns.
    corpus: PathBuf,
    /// Models to compare, as `name=openai-model-name` pairs.
    #[arg(long = "model", required = true)]
    models: Vec<String>,
    /// Embedding dimensionality of the models.
    #[arg(long, default_value_t = 1536)]
    embed_dimensions: usize,
    /// Recall@K window.
    #[arg(short, default_value_t = 5)]
    k: usize,
    /// Negatives sampled per trial.
    #[arg(long, default_value_t = 4)]
    negatives: usize,
    /// RNG seed for trial sampling.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Args)]
struct HumanArgs {
    /// JSON study file: `{job_description, candidates, rankings}`.
    study: PathBuf,
    #[command(flatten)]
    embed: EmbedArgs,
}

#[derive(Args)]
struct RankArgs {
    /// Candidates CSV with `id` and `text` columns.
    candidates: PathBuf,
    /// The job description to rank against.
    #[arg(long)]
    job_description: String,
    #[command(flatten)]
    embed: EmbedArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match Cli::parse().command {
        Command::Train(args) => train(args).await,
        Command::Eval(args) => eval(args).await,
        Command::Compare(args) => compare(args).await,
        Command::Human(args) => human(args).await,
        Command::Rank(args) => rank(args).await,
    }
}

async fn train(args: TrainArgs) -> anyhow::Result<()> {
    let mut config = PipelineConfig::new(&args.corpus, &args.output_dir);
    config.miner = MinerConfig {
        similarity_floor: args.similarity_floor,
        max_negatives: args.max_negatives,
        pool_size: args.pool_size,
    };
    config.train = TrainOptions {
        batch_size: args.batch_size,
        epochs: args.epochs,
        warmup_steps: args.warmup_steps,
        output_path: args.model_out.clone(),
    };

    let scorer: Arc<dyn RelevanceScorer> = if args.offline_scorer {
        warn!("using offline term-overlap scorer; triplet quality will be lower");
        Arc::new(TermOverlapScorer)
    } else {
        Arc::new(RemoteScorer::new(&args.server_url))
    };

    let pipeline = MiningPipeline::builder()
        .config(config)
        .embedder(args.embed.provider()?)
        .generator(Arc::new(OpenAiChat::from_env()?))
        .scorer(scorer)
        .trainer(Arc::new(RemoteTrainer::new(&args.server_url)))
        .build()?;

    let report = pipeline.run().await?;
    println!(
        "documents={} queries={} mined={} scored={} filtered={}",
        report.documents, report.queries, report.mined, report.scored, report.filtered
    );
    println!("model written to {}", args.model_out);
    Ok(())
}

async fn eval(args: EvalArgs) -> anyhow::Result<()> {
    let corpus = Corpus::from_csv(&args.corpus)?;
    let mut rng = StdRng::seed_from_u64(args.seed);
    let trials = sample_trials(&corpus, args.negatives, &mut rng);

    let provider = args.embed.provider()?;
    match evaluate_trials(&provider, &trials, args.k).await? {
        Some(summary) => print!("{}", summary.render(&args.embed.embed_model)),
        None => println!("no data: no category could field a trial"),
    }
    Ok(())
}

async fn compare(args: CompareArgs) -> anyhow::Result<()> {
    let corpus = Corpus::from_csv(&args.corpus)?;
    let mut rng = StdRng::seed_from_u64(args.seed);
    let trials = sample_trials(&corpus, args.negatives, &mut rng);

    let mut models = Vec::new();
    for spec in &args.models {
        let Some((name, model)) = spec.split_once('=') else {
            bail!("--model expects name=openai-model-name, got '{spec}'");
        };
        let provider = OpenAiEmbeddings::from_env()?
            .with_model(model, args.embed_dimensions);
        models.push(NamedModel { name: name.to_string(), provider: Arc::new(provider) });
    }

    for result in compare_models(&models, &trials, args.k).await? {
        match result.summary {
            Some(summary) => println!("{}", summary.render(&result.name)),
            None => println!("{}: no data", result.name),
        }
    }
    Ok(())
}

async fn human(args: HumanArgs) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&args.study)
        .with_context(|| format!("reading study file {}", args.study.display()))?;
    let study: HumanStudy = serde_json::from_str(&raw).context("parsing study JSON")?;

    let provider = args.embed.provider()?;
    let agreement = evaluate_study(&provider, &study).await?;

    println!("Model Ranking: {:?}", agreement.model_ranking);
    println!("Average Kendall Tau:  {:.4}", agreement.mean_kendall);
    println!("Average Spearman Rho: {:.4}", agreement.mean_spearman);
    Ok(())
}

async fn rank(args: RankArgs) -> anyhow::Result<()> {
    let mut reader = csv::Reader::from_path(&args.candidates)
        .with_context(|| format!("reading candidates {}", args.candidates.display()))?;
    let headers = reader.headers()?.clone();
    let id_col = headers.iter().position(|h| h == "id");
    let text_col = headers.iter().position(|h| h == "text");
    let (Some(id_col), Some(text_col)) = (id_col, text_col) else {
        bail!("candidates CSV must have 'id' and 'text' columns");
    };

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push((record[id_col].to_string(), record[text_col].to_string()));
    }
    let pairs: Vec<(&str, &str)> =
        rows.iter().map(|(id, text)| (id.as_str(), text.as_str())).collect();

    let provider = args.embed.provider()?;
    let ranked = rank_candidates(&provider, &args.job_description, &pairs).await?;

    println!("Top matching candidates:\n");
    for candidate in ranked {
        println!("Score: {:.4}  [{}]", candidate.score, candidate.id);
        println!("{}\n", candidate.text);
    }
    Ok(())
}
