use rubato::{Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction};

const CHUNK_SIZE: usize = 1024;

pub struct FxResampler;

impl FxResampler {
    /// Converts a mono buffer from `from_rate` to `to_rate` using sinc interpolation.
    /// The resampler delay is removed and the output holds
    /// `round(len * to_rate / from_rate)` samples.
    pub fn convert(input: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, anyhow::Error> {
        if from_rate == 0 || to_rate == 0 {
            return Err(anyhow::anyhow!("Sample rates must be positive ({} -> {})", from_rate, to_rate));
        }
        if input.is_empty() || from_rate == to_rate {
            return Ok(input.to_vec());
        }

        let ratio = to_rate as f64 / from_rate as f64;
        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 128,
            window: WindowFunction::BlackmanHarris2,
        };

        let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, CHUNK_SIZE, 1)?;
        let delay = resampler.output_delay();
        let expected = (input.len() as f64 * ratio).round() as usize;

        let mut output = Vec::with_capacity(expected + delay + CHUNK_SIZE);
        let mut input_pos = 0;

        while input.len() - input_pos >= CHUNK_SIZE {
            let chunk = [&input[input_pos..input_pos + CHUNK_SIZE]];
            let out_waves = resampler.process(&chunk[..], None)?;
            if let Some(chan_out) = out_waves.first() {
                output.extend_from_slice(chan_out);
            }
            input_pos += CHUNK_SIZE;
        }

        if input_pos < input.len() {
            let tail = [&input[input_pos..]];
            let out_waves = resampler.process_partial(Some(&tail[..]), None)?;
            if let Some(chan_out) = out_waves.first() {
                output.extend_from_slice(chan_out);
            }
        }

        // Flush the filter until the delayed tail is out.
        while output.len() < expected + delay {
            let out_waves = resampler.process_partial(None::<&[Vec<f32>]>, None)?;
            match out_waves.first() {
                Some(chan_out) if !chan_out.is_empty() => output.extend_from_slice(chan_out),
                _ => break,
            }
        }

        output.drain(..delay.min(output.len()));
        output.truncate(expected);
        Ok(output)
    }
}
