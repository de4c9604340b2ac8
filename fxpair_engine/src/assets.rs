use fxpair_shared::{AudioBuffer, CatalogRow, DatasetError, NO_EFFECT_FOLDER};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Decodes one note file into a mono buffer at the requested rate.
///
/// Implementations must be shareable across decode workers.
pub trait WaveDecoder: Sync {
    fn decode(&self, path: &Path, sample_rate: u32) -> Result<AudioBuffer, DatasetError>;
}

/// Directory convention for note files: `<root>/<effect folder>/<fileID>.wav`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleLayout {
    pub root: PathBuf,
    pub no_effect_folder: String,
}

impl SampleLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            no_effect_folder: NO_EFFECT_FOLDER.to_string(),
        }
    }

    pub fn clean_path(&self, row: &CatalogRow) -> PathBuf {
        self.note_path(&self.no_effect_folder, row)
    }

    pub fn note_path(&self, folder: &str, row: &CatalogRow) -> PathBuf {
        self.root.join(folder).join(format!("{}.wav", row.file_id))
    }
}

/// Reads WAV files from disk with `hound`, downmixes to mono and resamples.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavDecoder;

impl WavDecoder {
    /// Returns the mono samples and the file's native sample rate.
    pub fn read_mono(path: &Path) -> Result<(Vec<f32>, u32), anyhow::Error> {
        let reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let raw_samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                let bit_depth = spec.bits_per_sample;
                let max_val = 2.0_f32.powi(bit_depth as i32 - 1);
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|x| x as f32 / max_val))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        let mono = if channels == 1 {
            raw_samples
        } else {
            raw_samples
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
                .collect()
        };

        Ok((mono, spec.sample_rate))
    }
}

impl WaveDecoder for WavDecoder {
    fn decode(&self, path: &Path, sample_rate: u32) -> Result<AudioBuffer, DatasetError> {
        let (mono, native_rate) =
            Self::read_mono(path).map_err(|e| DatasetError::decode(path.display().to_string(), e))?;
        let samples = crate::resampler::FxResampler::convert(&mono, native_rate, sample_rate)
            .map_err(|e| DatasetError::decode(path.display().to_string(), e))?;

        log::debug!(
            "[Decoder] {} ({} Hz -> {} Hz, {} samples)",
            path.display(),
            native_rate,
            sample_rate,
            samples.len()
        );
        Ok(AudioBuffer::from_samples(sample_rate, samples))
    }
}

/// Decoder over buffers held in memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemoryDecoder {
    notes: HashMap<PathBuf, AudioBuffer>,
}

impl MemoryDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, buffer: AudioBuffer) {
        self.notes.insert(path.into(), buffer);
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

impl WaveDecoder for MemoryDecoder {
    fn decode(&self, path: &Path, sample_rate: u32) -> Result<AudioBuffer, DatasetError> {
        let buffer = self
            .notes
            .get(path)
            .ok_or_else(|| DatasetError::decode(path.display().to_string(), "file not found"))?;

        if buffer.sample_rate == sample_rate {
            return Ok(buffer.clone());
        }
        let samples = crate::resampler::FxResampler::convert(&buffer.samples, buffer.sample_rate, sample_rate)
            .map_err(|e| DatasetError::decode(path.display().to_string(), e))?;
        Ok(AudioBuffer::from_samples(sample_rate, samples))
    }
}
