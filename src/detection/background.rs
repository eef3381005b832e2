//! Adaptive mixture-of-Gaussians background model.
//!
//! Every pixel keeps up to [`MAX_MODES`] Gaussian modes over RGB, each with a
//! weight, a mean colour and one variance shared by the three channels. Modes
//! are kept sorted by weight; the heaviest modes whose weights add up to
//! `BACKGROUND_RATIO` describe the background. A pixel that matches none of
//! them is foreground, unless it looks like a darkened copy of a background
//! mode, in which case it is labelled shadow.

use tracing::debug;

use crate::config::BackgroundConfig;
use crate::error::{CounterError, Result};
use crate::models::{ForegroundMask, Frame, MaskLabel};

pub const MAX_MODES: usize = 5;

const BACKGROUND_RATIO: f32 = 0.9;
/// Squared distance (in variances) for a sample to update an existing mode
const VAR_THRESHOLD_GEN: f32 = 9.0;
const VAR_INIT: f32 = 15.0;
const VAR_MIN: f32 = 4.0;
const VAR_MAX: f32 = 5.0 * VAR_INIT;
/// Complexity reduction prior; weakly supported modes decay away
const COMPLEXITY_PRIOR: f32 = 0.05;
/// Lowest brightness ratio still accepted as shadow
const SHADOW_TAU: f32 = 0.5;

pub struct BackgroundModel {
    history: u32,
    var_threshold: f32,
    detect_shadows: bool,
    fixed_rate: Option<f32>,
    width: u32,
    height: u32,
    frames_seen: u64,
    /// Per pixel: number of live modes
    modes_used: Vec<u8>,
    /// Per pixel and mode: weight
    weights: Vec<f32>,
    /// Per pixel and mode: variance
    variances: Vec<f32>,
    /// Per pixel, mode and channel: mean
    means: Vec<f32>,
}

impl BackgroundModel {
    pub fn new(config: &BackgroundConfig) -> Self {
        Self {
            history: config.history.max(1),
            var_threshold: config.var_threshold,
            detect_shadows: config.detect_shadows,
            fixed_rate: config.learning_rate,
            width: 0,
            height: 0,
            frames_seen: 0,
            modes_used: Vec::new(),
            weights: Vec::new(),
            variances: Vec::new(),
            means: Vec::new(),
        }
    }

    /// Frame size the model is bound to, once the first frame was applied
    pub fn geometry(&self) -> Option<(u32, u32)> {
        if self.frames_seen == 0 {
            None
        } else {
            Some((self.width, self.height))
        }
    }

    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }

    /// Learning rate used for the current frame
    fn learning_rate(&self) -> f32 {
        if let Some(rate) = self.fixed_rate {
            if self.frames_seen > 1 {
                return rate;
            }
        }
        let window = (2 * self.frames_seen).clamp(1, self.history as u64);
        1.0 / window as f32
    }

    fn allocate(&mut self, width: u32, height: u32) {
        let pixels = width as usize * height as usize;
        self.width = width;
        self.height = height;
        self.modes_used = vec![0; pixels];
        self.weights = vec![0.0; pixels * MAX_MODES];
        self.variances = vec![0.0; pixels * MAX_MODES];
        self.means = vec![0.0; pixels * MAX_MODES * 3];
        debug!(width, height, "Allocated background model");
    }

    /// Check that `frame` can be applied without touching the model
    pub fn check(&self, frame: &Frame) -> Result<()> {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return Err(CounterError::EmptyFrame);
        }
        match self.geometry() {
            Some(expected) if expected != (width, height) => Err(CounterError::GeometryMismatch {
                expected,
                actual: (width, height),
            }),
            _ => Ok(()),
        }
    }

    /// Update the model with `frame` and label each of its pixels.
    ///
    /// The first frame fixes the geometry; later frames of another size are
    /// rejected before any statistics change.
    pub fn apply(&mut self, frame: &Frame) -> Result<ForegroundMask> {
        self.check(frame)?;
        let (width, height) = frame.dimensions();
        if self.geometry().is_none() {
            self.allocate(width, height);
        }

        self.frames_seen += 1;
        let alpha = self.learning_rate();

        let mut mask = ForegroundMask::new(width, height);
        for (x, y, pixel) in frame.enumerate_pixels() {
            let index = y as usize * width as usize + x as usize;
            let sample = [pixel[0] as f32, pixel[1] as f32, pixel[2] as f32];
            let label = self.update_pixel(index, sample, alpha);
            if label != MaskLabel::Background {
                mask.set_label(x, y, label);
            }
        }
        Ok(mask)
    }

    fn update_pixel(&mut self, index: usize, sample: [f32; 3], alpha: f32) -> MaskLabel {
        let base = index * MAX_MODES;
        let used = self.modes_used[index] as usize;
        let weights = &mut self.weights[base..base + MAX_MODES];
        let variances = &mut self.variances[base..base + MAX_MODES];
        let means = &mut self.means[base * 3..(base + MAX_MODES) * 3];

        // Both tests see the modes as they were before this sample
        let threshold = self.var_threshold;
        let label = if matches_background(weights, variances, means, used, sample, threshold) {
            MaskLabel::Background
        } else if self.detect_shadows
            && is_shadow(weights, variances, means, used, sample, threshold)
        {
            MaskLabel::Shadow
        } else {
            MaskLabel::Foreground
        };

        let prune = alpha * COMPLEXITY_PRIOR;
        let mut matched = None;
        for mode in 0..used {
            weights[mode] = (1.0 - alpha) * weights[mode] - prune;
            if matched.is_some() {
                continue;
            }
            let dist2 = squared_distance(&means[mode * 3..mode * 3 + 3], sample);
            if dist2 < VAR_THRESHOLD_GEN * variances[mode] {
                matched = Some(mode);
                weights[mode] += alpha;
                let k = alpha / weights[mode];
                for c in 0..3 {
                    let mean = &mut means[mode * 3 + c];
                    *mean -= k * (*mean - sample[c]);
                }
                let var = variances[mode] + k * (dist2 - variances[mode]);
                variances[mode] = var.clamp(VAR_MIN, VAR_MAX);
            }
        }

        // Drop modes whose support decayed below the prior; order is kept
        let mut live = 0;
        for mode in 0..used {
            if weights[mode] >= prune || Some(mode) == matched {
                move_mode(weights, variances, means, mode, live);
                live += 1;
            }
        }
        let mut used = live;

        if matched.is_none() {
            let slot = if used < MAX_MODES {
                used += 1;
                used - 1
            } else {
                MAX_MODES - 1
            };
            weights[slot] = if used == 1 { 1.0 } else { alpha };
            variances[slot] = VAR_INIT;
            means[slot * 3..slot * 3 + 3].copy_from_slice(&sample);
        }

        let total: f32 = weights[..used].iter().sum();
        if total > 0.0 {
            for w in &mut weights[..used] {
                *w /= total;
            }
        }
        sort_modes(weights, variances, means, used);
        self.modes_used[index] = used as u8;

        label
    }
}

fn squared_distance(mean: &[f32], sample: [f32; 3]) -> f32 {
    mean.iter()
        .zip(sample.iter())
        .map(|(m, s)| (m - s) * (m - s))
        .sum()
}

/// Check the sample against the heaviest modes that make up the background.
fn matches_background(
    weights: &[f32],
    variances: &[f32],
    means: &[f32],
    used: usize,
    sample: [f32; 3],
    var_threshold: f32,
) -> bool {
    let mut cumulative = 0.0;
    for mode in 0..used {
        let dist2 = squared_distance(&means[mode * 3..mode * 3 + 3], sample);
        if dist2 < var_threshold * variances[mode] {
            return true;
        }
        cumulative += weights[mode];
        if cumulative > BACKGROUND_RATIO {
            break;
        }
    }
    false
}

/// A shadow is a background colour scaled down by a ratio in `[SHADOW_TAU, 1]`
/// with little chromatic distortion.
fn is_shadow(
    weights: &[f32],
    variances: &[f32],
    means: &[f32],
    used: usize,
    sample: [f32; 3],
    var_threshold: f32,
) -> bool {
    let mut cumulative = 0.0;
    for mode in 0..used {
        let mean = &means[mode * 3..mode * 3 + 3];
        let numerator: f32 = mean.iter().zip(sample.iter()).map(|(m, s)| m * s).sum();
        let denominator: f32 = mean.iter().map(|m| m * m).sum();
        if denominator == 0.0 {
            return false;
        }
        if numerator <= denominator && numerator >= SHADOW_TAU * denominator {
            let a = numerator / denominator;
            let distortion: f32 = mean
                .iter()
                .zip(sample.iter())
                .map(|(m, s)| (a * m - s) * (a * m - s))
                .sum();
            if distortion < var_threshold * variances[mode] * a * a {
                return true;
            }
        }
        cumulative += weights[mode];
        if cumulative > BACKGROUND_RATIO {
            return false;
        }
    }
    false
}

fn move_mode(
    weights: &mut [f32],
    variances: &mut [f32],
    means: &mut [f32],
    from: usize,
    to: usize,
) {
    if from == to {
        return;
    }
    weights[to] = weights[from];
    variances[to] = variances[from];
    means.copy_within(from * 3..from * 3 + 3, to * 3);
}

fn swap_modes(weights: &mut [f32], variances: &mut [f32], means: &mut [f32], a: usize, b: usize) {
    weights.swap(a, b);
    variances.swap(a, b);
    for c in 0..3 {
        means.swap(a * 3 + c, b * 3 + c);
    }
}

/// Insertion sort by descending weight; at most [`MAX_MODES`] entries.
fn sort_modes(weights: &mut [f32], variances: &mut [f32], means: &mut [f32], used: usize) {
    for i in 1..used {
        let mut j = i;
        while j > 0 && weights[j] > weights[j - 1] {
            swap_modes(weights, variances, means, j, j - 1);
            j -= 1;
        }
    }
}
