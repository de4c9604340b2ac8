use clap::Parser;
use fxpair_engine::config::{load_request, save_request};
use fxpair_engine::{create_dataset, Catalog, SampleLayout, WavDecoder};
use fxpair_shared::{DatasetRequest, DecodeFailurePolicy, StrategyKind};
use std::path::PathBuf;

/// Assemble a clean/effected guitar training pair from the sample catalog
/// and print a JSON summary of the result.
#[derive(Parser, Debug)]
#[command(name = "fxpair", version)]
struct Cli {
    /// Request file (JSON). Flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    genre: Option<String>,

    /// scale, random or pentatonic
    #[arg(long)]
    strategy: Option<String>,

    #[arg(long)]
    sample_rate: Option<u32>,

    #[arg(long)]
    duration: Option<f64>,

    /// Skip the mu-law pass.
    #[arg(long)]
    no_companding: bool,

    /// Accepted for compatibility, has no effect.
    #[arg(long)]
    include_polyphonic: bool,

    #[arg(long)]
    seed: Option<u64>,

    /// Stop at the first note that fails to decode instead of skipping it.
    #[arg(long)]
    abort_on_decode_error: bool,

    #[arg(long, default_value = "fileData.json")]
    file_catalog: PathBuf,

    #[arg(long, default_value = "effectData.json")]
    effect_catalog: PathBuf,

    #[arg(long, default_value = "dataset/monophonic/Samples")]
    samples_root: PathBuf,

    /// Write the effective request to this path.
    #[arg(long)]
    save_config: Option<PathBuf>,
}

impl Cli {
    fn request(&self) -> Result<DatasetRequest, anyhow::Error> {
        let mut request = match &self.config {
            Some(path) => load_request(path)?,
            None => {
                let genre = self
                    .genre
                    .clone()
                    .ok_or_else(|| anyhow::anyhow!("--genre is required without --config"))?;
                DatasetRequest::new(genre, StrategyKind::Scale)
            }
        };

        if let Some(genre) = &self.genre {
            request.genre = genre.clone();
        }
        if let Some(strategy) = &self.strategy {
            request.strategy_type = strategy.clone();
        }
        if let Some(rate) = self.sample_rate {
            request.sample_rate = rate;
        }
        if let Some(duration) = self.duration {
            request.duration_seconds = duration;
        }
        if self.no_companding {
            request.apply_companding = false;
        }
        if self.include_polyphonic {
            request.include_polyphonic = true;
        }
        if self.seed.is_some() {
            request.seed = self.seed;
        }
        if self.abort_on_decode_error {
            request.decode_failure_policy = DecodeFailurePolicy::Abort;
        }
        Ok(request)
    }
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let request = cli.request()?;
    if let Some(path) = &cli.save_config {
        save_request(&request, path)?;
        log::info!("[fxpair] Request written to {}", path.display());
    }

    let catalog = Catalog::load(&cli.file_catalog, &cli.effect_catalog)?;
    let layout = SampleLayout::new(&cli.samples_root);

    let outcome = create_dataset(&request, &catalog, &layout, &WavDecoder);
    println!("{}", serde_json::to_string_pretty(&outcome.summary())?);

    if outcome.is_empty() && request.target_len() > 0 {
        log::warn!("[fxpair] No audio assembled ({} diagnostics)", outcome.diagnostics.len());
    }
    Ok(())
}
