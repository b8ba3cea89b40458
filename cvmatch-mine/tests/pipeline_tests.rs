//! End-to-end pipeline tests with deterministic in-process collaborators.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use cvmatch_mine::stage::{ArtifactPaths, ScoredTripletRecord, read_csv};
use cvmatch_mine::{
    Corpus, EmbeddingProvider, MinerConfig, MiningPipeline, PipelineConfig, Result,
    TermOverlapScorer, TextGenerator, TrainExample, TrainOptions, TripletTrainer,
};

/// Deterministic hash-based embeddings; normalized so cosine is the dot
/// product.
struct HashEmbeddings {
    dimensions: usize,
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddings {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut emb = vec![0.0f32; self.dimensions];
        for (i, v) in emb.iter_mut().enumerate() {
            *v = ((hash.wrapping_add(i as u64)) as f32).sin();
        }
        let norm: f32 = emb.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            emb.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(emb)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Echoes the document's first words back as a "question", so queries
/// overlap their source document's vocabulary.
struct EchoGenerator;

#[async_trait]
impl TextGenerator for EchoGenerator {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let paragraph = prompt
            .split("Paragraph: ")
            .nth(1)
            .and_then(|rest| rest.split("\n\n").next())
            .unwrap_or("generic");
        let head: String = paragraph.split_whitespace().take(4).collect::<Vec<_>>().join(" ");
        Ok(format!("Who has experience with {head}?\nSecond question?\nThird question?"))
    }
}

#[derive(Default)]
struct RecordingTrainer {
    calls: AtomicUsize,
    last_count: AtomicUsize,
}

#[async_trait]
impl TripletTrainer for RecordingTrainer {
    async fn fit(&self, examples: &[TrainExample], _options: &TrainOptions) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_count.store(examples.len(), Ordering::SeqCst);
        Ok(())
    }
}

fn write_corpus_csv(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("resumes.csv");
    let mut writer = csv::Writer::from_path(&path).unwrap();
    writer.write_record(["Resume", "Category"]).unwrap();
    let rows = [
        ("java backend developer spring hibernate", "Java"),
        ("senior java engineer microservices spring", "Java"),
        ("react frontend developer javascript css", "Web"),
        ("frontend engineer react typescript tailwind", "Web"),
        ("registered nurse clinical care hospital", "Healthcare"),
        ("hospital nurse patient care experience", "Healthcare"),
    ];
    for (resume, category) in rows {
        writer.write_record([resume, category]).unwrap();
    }
    writer.flush().unwrap();
    path
}

fn pipeline(corpus_csv: &std::path::Path, out: &std::path::Path, trainer: Arc<RecordingTrainer>) -> MiningPipeline {
    let mut config = PipelineConfig::new(corpus_csv, out);
    // Permissive floor so hash embeddings reliably produce candidates.
    config.miner = MinerConfig { similarity_floor: -1.0, max_negatives: 2, pool_size: 5 };
    MiningPipeline::builder()
        .config(config)
        .embedder(Arc::new(HashEmbeddings { dimensions: 32 }))
        .generator(Arc::new(EchoGenerator))
        .scorer(Arc::new(TermOverlapScorer))
        .trainer(trainer)
        .build()
        .unwrap()
}

#[tokio::test]
async fn full_run_writes_all_artifacts_and_trains() {
    let dir = tempfile::tempdir().unwrap();
    let corpus_csv = write_corpus_csv(dir.path());
    let out = dir.path().join("out");
    let trainer = Arc::new(RecordingTrainer::default());

    let report = pipeline(&corpus_csv, &out, Arc::clone(&trainer)).run().await.unwrap();

    assert_eq!(report.documents, 6);
    assert_eq!(report.queries, 6);
    assert!(report.mined > 0);
    assert_eq!(report.scored, report.mined);
    assert!(report.filtered <= report.scored);
    assert_eq!(trainer.calls.load(Ordering::SeqCst), 1);
    assert_eq!(trainer.last_count.load(Ordering::SeqCst), report.filtered);

    let paths = ArtifactPaths::new(&out);
    for path in [&paths.queries, &paths.raw_triplets, &paths.scored_triplets, &paths.filtered_triplets] {
        assert!(path.exists(), "missing artifact {}", path.display());
    }
}

#[tokio::test]
async fn filtered_artifact_only_holds_consistent_rows() {
    let dir = tempfile::tempdir().unwrap();
    let corpus_csv = write_corpus_csv(dir.path());
    let out = dir.path().join("out");
    let trainer = Arc::new(RecordingTrainer::default());

    pipeline(&corpus_csv, &out, trainer).run().await.unwrap();

    let paths = ArtifactPaths::new(&out);
    let rows: Vec<ScoredTripletRecord> = read_csv(&paths.filtered_triplets).unwrap();
    assert!(!rows.is_empty());
    for row in &rows {
        assert!(row.pos_score > row.neg_score);
        assert_ne!(row.positive_category, row.negative_category);
    }
}

#[tokio::test]
async fn second_run_resumes_from_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let corpus_csv = write_corpus_csv(dir.path());
    let out = dir.path().join("out");

    let first_trainer = Arc::new(RecordingTrainer::default());
    let first = pipeline(&corpus_csv, &out, Arc::clone(&first_trainer)).run().await.unwrap();

    // A generator that fails if called proves the queries stage was cached.
    struct PanicGenerator;

    #[async_trait]
    impl TextGenerator for PanicGenerator {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            panic!("generator must not be called on a resumed run");
        }
    }

    let second_trainer = Arc::new(RecordingTrainer::default());
    let mut config = PipelineConfig::new(&corpus_csv, &out);
    config.miner = MinerConfig { similarity_floor: -1.0, max_negatives: 2, pool_size: 5 };
    let resumed = MiningPipeline::builder()
        .config(config)
        .embedder(Arc::new(HashEmbeddings { dimensions: 32 }))
        .generator(Arc::new(PanicGenerator))
        .scorer(Arc::new(TermOverlapScorer))
        .trainer(Arc::clone(&second_trainer) as Arc<dyn TripletTrainer>)
        .build()
        .unwrap();

    let second = resumed.run().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(second_trainer.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unreachable_floor_fails_before_training() {
    let dir = tempfile::tempdir().unwrap();
    let corpus_csv = write_corpus_csv(dir.path());
    let out = dir.path().join("out");
    let trainer = Arc::new(RecordingTrainer::default());

    let mut config = PipelineConfig::new(&corpus_csv, &out);
    config.miner = MinerConfig { similarity_floor: 1.0, max_negatives: 2, pool_size: 5 };
    let pipeline = MiningPipeline::builder()
        .config(config)
        .embedder(Arc::new(HashEmbeddings { dimensions: 32 }))
        .generator(Arc::new(EchoGenerator))
        .scorer(Arc::new(TermOverlapScorer))
        .trainer(Arc::clone(&trainer) as Arc<dyn TripletTrainer>)
        .build()
        .unwrap();

    // Mining yields nothing, so the empty training set is a fatal config
    // error and the trainer is never invoked.
    let err = pipeline.run().await.unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(trainer.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_corpus_column_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    let mut writer = csv::Writer::from_path(&path).unwrap();
    writer.write_record(["Text", "Category"]).unwrap();
    writer.write_record(["abc", "X"]).unwrap();
    writer.flush().unwrap();

    let err = Corpus::from_csv(&path).unwrap_err();
    assert!(matches!(err, cvmatch_mine::MineError::DataError(_)));
}
