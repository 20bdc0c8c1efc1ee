use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use audio_similarity::audio::{discover_clips, load_catalog, read_wav};
use audio_similarity::{AppConfig, Descriptor, FeatureExtractor, Match, SimilarityIndex};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the tracing filter (e.g. `debug`)
const LOG_ENV: &str = "AUDIO_SIMILARITY_LOG";

#[derive(Parser, Debug)]
#[command(
    name = "audio_similarity_cli",
    about = "Find the most similar clips in a WAV library"
)]
struct Cli {
    /// JSON config file (assets/index_config.json when omitted)
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the descriptor of a single clip
    Extract { wav: PathBuf },
    /// Load a library, then query it with each clip in turn
    Query {
        /// Library root laid out as <dir>/<category>/<clip>.wav
        #[arg(long)]
        data_dir: PathBuf,
        /// Number of neighbors per query (config default_k when omitted)
        #[arg(long)]
        k: Option<usize>,
        /// Index each clip after querying it, so later clips can match it
        #[arg(long)]
        insert: bool,
        #[arg(required = true)]
        clips: Vec<PathBuf>,
    },
    /// List the clips a library root would load
    List {
        #[arg(long)]
        data_dir: PathBuf,
    },
}

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = cli
        .config
        .as_deref()
        .map(AppConfig::load_from_file)
        .unwrap_or_else(AppConfig::load);

    match cli.command {
        Commands::Extract { wav } => run_extract(&config, &wav),
        Commands::Query {
            data_dir,
            k,
            insert,
            clips,
        } => run_query(&config, &data_dir, k.unwrap_or(config.index.default_k), insert, &clips),
        Commands::List { data_dir } => run_list(&data_dir),
    }
}

fn run_extract(config: &AppConfig, wav: &Path) -> Result<()> {
    let extractor = FeatureExtractor::new(config.framing)?;
    let signal = read_wav(wav)?;
    let descriptor = extractor
        .extract(&signal)
        .with_context(|| format!("extracting {}", wav.display()))?;

    let report = ExtractReport {
        clip: wav.display().to_string(),
        sample_rate: signal.sample_rate,
        sample_count: signal.len(),
        descriptor: DescriptorPayload::from(&descriptor),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_query(
    config: &AppConfig,
    data_dir: &Path,
    k: usize,
    insert: bool,
    clips: &[PathBuf],
) -> Result<()> {
    let mut index = SimilarityIndex::from_config(config)?;
    let library = load_catalog(data_dir)?;
    index
        .bulk_load(library)
        .with_context(|| format!("indexing {}", data_dir.display()))?;
    info!("Indexed {} clips from {}", index.len(), data_dir.display());

    let mut results = Vec::with_capacity(clips.len());
    for clip in clips {
        let signal = read_wav(clip)?;
        let matches = index
            .query(&signal, k)
            .with_context(|| format!("querying {}", clip.display()))?;

        let inserted_id = if insert {
            let label = clip
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| clip.display().to_string());
            Some(index.insert(&signal, label)?)
        } else {
            None
        };

        results.push(QueryResult {
            clip: clip.display().to_string(),
            matches,
            inserted_id,
        });
    }

    let report = QueryReport {
        indexed: index.len(),
        k,
        results,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_list(data_dir: &Path) -> Result<()> {
    let clips = discover_clips(data_dir)?;
    if clips.is_empty() {
        println!("No clips found under {}", data_dir.display());
        return Ok(());
    }

    for clip in clips {
        println!("{}", clip.label);
    }
    Ok(())
}

#[derive(Serialize)]
struct DescriptorPayload {
    rms: f32,
    zcr: f32,
    spectral_centroid: f32,
    spectral_bandwidth: f32,
    amplitude_envelope: f32,
}

impl From<&Descriptor> for DescriptorPayload {
    fn from(descriptor: &Descriptor) -> Self {
        Self {
            rms: descriptor.rms(),
            zcr: descriptor.zcr(),
            spectral_centroid: descriptor.centroid(),
            spectral_bandwidth: descriptor.bandwidth(),
            amplitude_envelope: descriptor.envelope(),
        }
    }
}

#[derive(Serialize)]
struct ExtractReport {
    clip: String,
    sample_rate: u32,
    sample_count: usize,
    descriptor: DescriptorPayload,
}

#[derive(Serialize)]
struct QueryResult {
    clip: String,
    matches: Vec<Match>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inserted_id: Option<u64>,
}

#[derive(Serialize)]
struct QueryReport {
    indexed: usize,
    k: usize,
    results: Vec<QueryResult>,
}
