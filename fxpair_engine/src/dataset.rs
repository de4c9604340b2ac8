use crate::assets::{SampleLayout, WaveDecoder};
use crate::catalog::{filter_catalog, Catalog};
use crate::companding::mu_compress;
use crate::compositor::NoteCompositor;
use crate::strategy::{strategy_for, SelectionContext};
use fxpair_shared::{AudioBuffer, DatasetError, DatasetRequest, StrategyKind};
use serde::Serialize;

/// Clean/effected stream pair plus everything that went wrong on the way.
///
/// Buffers are equal length. They are shorter than requested (`shortfall > 0`)
/// when the catalog ran out, and empty when the request could not be served.
#[derive(Debug, Clone)]
pub struct DatasetOutcome {
    pub genre: String,
    pub strategy: Option<StrategyKind>,
    pub target_len: usize,
    pub clean: AudioBuffer,
    pub effect: AudioBuffer,
    pub diagnostics: Vec<DatasetError>,
    pub shortfall: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetSummary {
    pub genre: String,
    pub strategy: Option<String>,
    pub sample_rate: u32,
    pub target_samples: usize,
    pub clean_samples: usize,
    pub effect_samples: usize,
    pub seconds: f64,
    pub shortfall: usize,
    pub clean_peak: f32,
    pub effect_peak: f32,
    pub diagnostics: Vec<String>,
}

impl DatasetOutcome {
    fn failed(request: &DatasetRequest, strategy: Option<StrategyKind>, diagnostics: Vec<DatasetError>) -> Self {
        Self {
            genre: request.genre.clone(),
            strategy,
            target_len: request.target_len(),
            clean: AudioBuffer::new(request.sample_rate),
            effect: AudioBuffer::new(request.sample_rate),
            diagnostics,
            shortfall: request.target_len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.clean.is_empty()
    }

    pub fn into_buffers(self) -> (AudioBuffer, AudioBuffer) {
        (self.clean, self.effect)
    }

    pub fn summary(&self) -> DatasetSummary {
        DatasetSummary {
            genre: self.genre.clone(),
            strategy: self.strategy.map(|s| s.name().to_string()),
            sample_rate: self.clean.sample_rate,
            target_samples: self.target_len,
            clean_samples: self.clean.len(),
            effect_samples: self.effect.len(),
            seconds: self.clean.duration_seconds(),
            shortfall: self.shortfall,
            clean_peak: self.clean.peak(),
            effect_peak: self.effect.peak(),
            diagnostics: self.diagnostics.iter().map(|d| d.to_string()).collect(),
        }
    }
}

fn report(diagnostics: &mut Vec<DatasetError>, err: DatasetError) {
    log::warn!("[Dataset] {}", err);
    diagnostics.push(err);
}

/// Builds one clean/effected training pair. Draws randomness from `request.seed`
/// when set, otherwise from fresh entropy.
pub fn create_dataset<D: WaveDecoder + ?Sized>(
    request: &DatasetRequest,
    catalog: &Catalog,
    layout: &SampleLayout,
    decoder: &D,
) -> DatasetOutcome {
    let rng = match request.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };
    create_dataset_with_rng(request, catalog, layout, decoder, rng)
}

/// Same as [`create_dataset`] with an explicit random source.
pub fn create_dataset_with_rng<D: WaveDecoder + ?Sized>(
    request: &DatasetRequest,
    catalog: &Catalog,
    layout: &SampleLayout,
    decoder: &D,
    rng: fastrand::Rng,
) -> DatasetOutcome {
    let mut diagnostics = Vec::new();

    if request.include_polyphonic {
        report(
            &mut diagnostics,
            DatasetError::UnsupportedOption("includePolyphonic: polyphonic material is not supported, ignoring".into()),
        );
    }

    if request.sample_rate == 0 {
        report(&mut diagnostics, DatasetError::UnsupportedOption("sampleRate must be positive".into()));
        return DatasetOutcome::failed(request, None, diagnostics);
    }

    if !request.duration_seconds.is_finite() || request.duration_seconds < 0.0 {
        report(
            &mut diagnostics,
            DatasetError::UnsupportedOption(format!(
                "durationSeconds must be finite and non-negative, got {}",
                request.duration_seconds
            )),
        );
        return DatasetOutcome::failed(request, None, diagnostics);
    }

    let paired = match filter_catalog(&request.genre, catalog) {
        Ok(paired) => paired,
        Err(err) => {
            report(&mut diagnostics, err);
            return DatasetOutcome::failed(request, None, diagnostics);
        }
    };

    let kind = match request.strategy() {
        Ok(kind) => kind,
        Err(err) => {
            report(&mut diagnostics, err);
            return DatasetOutcome::failed(request, None, diagnostics);
        }
    };

    let target_len = request.target_len();
    let ctx = SelectionContext {
        target_len,
        note_len: request.note_len(),
    };

    log::info!(
        "[Dataset] '{}' with {} strategy: {} samples at {} Hz",
        request.genre,
        kind,
        target_len,
        request.sample_rate
    );

    let picks = match strategy_for(kind).picks(&paired, &ctx, rng) {
        Ok(picks) => picks,
        Err(err) => {
            report(&mut diagnostics, err);
            return DatasetOutcome::failed(request, Some(kind), diagnostics);
        }
    };

    let compositor = NoteCompositor::new(decoder, layout, paired.effect.effect_folder.as_str(), request.sample_rate)
        .with_policy(request.decode_failure_policy)
        .with_batch_size(request.decode_batch);
    let composition = compositor.compose(picks, target_len);
    diagnostics.extend(composition.diagnostics);

    if composition.aborted {
        return DatasetOutcome::failed(request, Some(kind), diagnostics);
    }

    let mut clean = composition.clean;
    let mut effect = composition.effect;

    let shortfall = target_len.saturating_sub(clean.len());
    if shortfall > 0 {
        log::warn!(
            "[Dataset] Catalog exhausted: {} of {} samples ({} short)",
            clean.len(),
            target_len,
            shortfall
        );
    }

    if request.apply_companding {
        mu_compress(&mut clean);
        mu_compress(&mut effect);
    }

    DatasetOutcome {
        genre: request.genre.clone(),
        strategy: Some(kind),
        target_len,
        clean,
        effect,
        diagnostics,
        shortfall,
    }
}
