//! Mu-law companding.

use fxpair_shared::{AudioBuffer, MU};
use rayon::prelude::*;

/// `sign(x) * ln(1 + mu|x|) / ln(1 + mu)`. Input is clamped to [-1, 1].
#[inline]
pub fn mu_compress_sample(x: f32) -> f32 {
    let x = x.clamp(-1.0, 1.0);
    x.signum() * (MU * x.abs()).ln_1p() / MU.ln_1p()
}

/// Inverse of [`mu_compress_sample`]: `sign(y) * ((1 + mu)^|y| - 1) / mu`.
#[inline]
pub fn mu_expand_sample(y: f32) -> f32 {
    let y = y.clamp(-1.0, 1.0);
    y.signum() * ((1.0 + MU).powf(y.abs()) - 1.0) / MU
}

pub fn mu_compress(buffer: &mut AudioBuffer) {
    buffer.samples.par_iter_mut().for_each(|s| *s = mu_compress_sample(*s));
}

pub fn mu_expand(buffer: &mut AudioBuffer) {
    buffer.samples.par_iter_mut().for_each(|s| *s = mu_expand_sample(*s));
}
