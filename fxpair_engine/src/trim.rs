//! Leading/trailing silence detection.
//!
//! Frames the note, measures RMS per frame and keeps the span from the first
//! to the last frame within `top_db` of the loudest frame.

/// Silence detector settings. Defaults: 60 dB below peak, 2048-sample frames,
/// 512-sample hop. Frames start at `k * hop` without centering padding, so the
/// kept span ends where the last loud frame ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimConfig {
    pub top_db: f32,
    pub frame_length: usize,
    pub hop_length: usize,
}

impl Default for TrimConfig {
    fn default() -> Self {
        Self {
            top_db: 60.0,
            frame_length: 2048,
            hop_length: 512,
        }
    }
}

/// Returns the `[start, end)` range of `samples` that is not near-silent.
/// A fully silent or empty note yields `(0, 0)`.
pub fn trim_bounds(samples: &[f32], config: &TrimConfig) -> (usize, usize) {
    let len = samples.len();
    let frame_length = config.frame_length.max(1);
    let hop = config.hop_length.max(1);
    if len == 0 {
        return (0, 0);
    }

    let frame_count = if len <= frame_length {
        1
    } else {
        1 + (len - frame_length).div_ceil(hop)
    };

    let powers: Vec<f32> = (0..frame_count)
        .map(|k| {
            let start = k * hop;
            let end = (start + frame_length).min(len);
            let frame = &samples[start..end];
            frame.iter().map(|s| s * s).sum::<f32>() / frame.len() as f32
        })
        .collect();

    let peak = powers.iter().cloned().fold(0.0f32, f32::max);
    if peak <= 0.0 {
        return (0, 0);
    }

    // Compare in the power domain: rms_db > -top_db  <=>  power > peak * 10^(-top_db/10)
    let threshold = peak * 10f32.powf(-config.top_db / 10.0);
    let first = powers.iter().position(|&p| p > threshold);
    let last = powers.iter().rposition(|&p| p > threshold);

    match (first, last) {
        (Some(first), Some(last)) => {
            let start = first * hop;
            let end = (last * hop + frame_length).min(len);
            (start, end)
        }
        _ => (0, 0),
    }
}
