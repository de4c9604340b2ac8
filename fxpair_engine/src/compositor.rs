use crate::assets::{SampleLayout, WaveDecoder};
use crate::strategy::{NoteLength, NotePick, PickStream};
use crate::trim::{trim_bounds, TrimConfig};
use fxpair_shared::{AudioBuffer, DatasetError, DecodeFailurePolicy, FADE_SECONDS};
use rayon::prelude::*;

/// Picks in a row that may add no audio before assembly gives up.
pub const MAX_CONSECUTIVE_MISSES: usize = 64;

/// Applies a linear 1.0 -> 0.0 ramp over the last `fade_len` samples.
/// Notes shorter than the fade are ramped over their whole length.
pub fn apply_fade_out(samples: &mut [f32], fade_len: usize) {
    let n = fade_len.min(samples.len());
    if n == 0 {
        return;
    }
    let start = samples.len() - n;
    let step = if n > 1 { 1.0 / (n - 1) as f32 } else { 0.0 };
    for (i, sample) in samples[start..].iter_mut().enumerate() {
        *sample *= 1.0 - i as f32 * step;
    }
}

/// Clean and effected audio for one pick, cut to the pick's length rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedNote {
    pub clean: Vec<f32>,
    pub effect: Vec<f32>,
}

/// Output of one assembly run.
#[derive(Debug, Clone)]
pub struct Composition {
    pub clean: AudioBuffer,
    pub effect: AudioBuffer,
    pub diagnostics: Vec<DatasetError>,
    pub notes_used: usize,
    pub aborted: bool,
}

/// Decodes picked notes and stitches them into two sample-aligned streams.
pub struct NoteCompositor<'d, D: WaveDecoder + ?Sized> {
    decoder: &'d D,
    layout: &'d SampleLayout,
    effect_folder: String,
    sample_rate: u32,
    fade_len: usize,
    trim: TrimConfig,
    policy: DecodeFailurePolicy,
    batch_size: usize,
}

impl<'d, D: WaveDecoder + ?Sized> NoteCompositor<'d, D> {
    pub fn new(decoder: &'d D, layout: &'d SampleLayout, effect_folder: impl Into<String>, sample_rate: u32) -> Self {
        Self {
            decoder,
            layout,
            effect_folder: effect_folder.into(),
            sample_rate,
            fade_len: (sample_rate as f64 * FADE_SECONDS) as usize,
            trim: TrimConfig::default(),
            policy: DecodeFailurePolicy::Skip,
            batch_size: 8,
        }
    }

    pub fn with_policy(mut self, policy: DecodeFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Number of notes decoded in parallel before appending in pick order.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_trim(mut self, trim: TrimConfig) -> Self {
        self.trim = trim;
        self
    }

    pub fn fade_len(&self) -> usize {
        self.fade_len
    }

    /// Decodes both recordings of a pick and applies its length rule.
    /// The effected note is cut with the clean note's trim offsets.
    pub fn render(&self, pick: &NotePick<'_>) -> Result<RenderedNote, DatasetError> {
        let clean_path = self.layout.clean_path(&pick.pair.clean);
        let effect_path = self.layout.note_path(&self.effect_folder, &pick.pair.effect);

        let mut clean = self.decoder.decode(&clean_path, self.sample_rate)?.samples;
        let mut effect = self.decoder.decode(&effect_path, self.sample_rate)?.samples;

        let desired = match pick.length {
            NoteLength::Full => clean.len(),
            NoteLength::TrimmedFraction { divisor } => {
                let (start, end) = trim_bounds(&clean, &self.trim);
                clean = clean[start..end].to_vec();
                let eff_start = start.min(effect.len());
                let eff_end = end.min(effect.len());
                effect = effect[eff_start..eff_end].to_vec();
                clean.len() / divisor.max(1) as usize
            }
        };

        clean.truncate(desired);
        effect.truncate(desired);
        Ok(RenderedNote { clean, effect })
    }

    /// Pulls picks until both streams hold `target_len` samples or the picks
    /// run out. Each segment is cut to the shorter of its two recordings and
    /// to the remaining space, then faded, so both streams stay equal length.
    pub fn compose(&self, mut picks: PickStream<'_>, target_len: usize) -> Composition {
        let mut clean_buf = AudioBuffer::new(self.sample_rate);
        let mut effect_buf = AudioBuffer::new(self.sample_rate);
        let mut diagnostics = Vec::new();
        let mut notes_used = 0;
        let mut misses = 0;

        'assembly: while clean_buf.len() < target_len {
            let batch: Vec<NotePick<'_>> = picks.by_ref().take(self.batch_size).collect();
            if batch.is_empty() {
                log::debug!("[Compositor] Pick stream exhausted at {} samples", clean_buf.len());
                break;
            }

            let rendered: Vec<Result<RenderedNote, DatasetError>> =
                batch.par_iter().map(|pick| self.render(pick)).collect();

            for (pick, note) in batch.iter().zip(rendered) {
                if clean_buf.len() >= target_len {
                    break 'assembly;
                }

                let added = match note {
                    Ok(RenderedNote { mut clean, mut effect }) => {
                        let remaining = target_len - clean_buf.len();
                        let seg = clean.len().min(effect.len()).min(remaining);
                        clean.truncate(seg);
                        effect.truncate(seg);
                        apply_fade_out(&mut clean, self.fade_len);
                        apply_fade_out(&mut effect, self.fade_len);
                        clean_buf.extend_from_slice(&clean);
                        effect_buf.extend_from_slice(&effect);
                        seg
                    }
                    Err(err) => match self.policy {
                        DecodeFailurePolicy::Skip => {
                            log::warn!("[Compositor] Skipping note {}: {}", pick.index, err);
                            diagnostics.push(err);
                            0
                        }
                        DecodeFailurePolicy::Abort => {
                            log::warn!("[Compositor] Aborting at note {}: {}", pick.index, err);
                            diagnostics.push(err);
                            return Composition {
                                clean: AudioBuffer::new(self.sample_rate),
                                effect: AudioBuffer::new(self.sample_rate),
                                diagnostics,
                                notes_used,
                                aborted: true,
                            };
                        }
                    },
                };

                if added > 0 {
                    notes_used += 1;
                    misses = 0;
                    continue;
                }

                misses += 1;
                if misses > MAX_CONSECUTIVE_MISSES {
                    let err = DatasetError::insufficient(
                        format!("{} consecutive picks without audio", misses),
                        target_len,
                        clean_buf.len(),
                    );
                    log::warn!("[Compositor] {}", err);
                    diagnostics.push(err);
                    break 'assembly;
                }
            }
        }

        log::info!(
            "[Compositor] Assembled {} notes, {} samples ({:.2}s)",
            notes_used,
            clean_buf.len(),
            clean_buf.duration_seconds()
        );

        Composition {
            clean: clean_buf,
            effect: effect_buf,
            diagnostics,
            notes_used,
            aborted: false,
        }
    }
}
