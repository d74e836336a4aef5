use crate::error::ParameterError;
use std::ops::Range;

/// Formula combining the color and spatial terms of the assignment distance.
///
/// Both variants receive squared Euclidean distances: `color` in Lab space and `spatial` in pixels.
/// They are not equivalent and produce different segmentations for the same parameters.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum DistanceMetric {
    /// `sqrt(color / color_scale + spatial / spatial_scale)`.
    ///
    /// Both terms are normalized by their own scale before they are summed. This is the default.
    Normalized,
    /// `sqrt(color) + (color_scale / spatial_scale) * sqrt(spatial)`.
    ///
    /// The spatial distance is weighted relative to the color distance, which is left unscaled.
    Weighted,
}

impl DistanceMetric {
    #[inline(always)]
    pub fn distance(self, color: f32, spatial: f32, color_scale: f32, spatial_scale: f32) -> f32 {
        match self {
            DistanceMetric::Normalized => (color / color_scale + spatial / spatial_scale).sqrt(),
            DistanceMetric::Weighted => {
                color.sqrt() + (color_scale / spatial_scale) * spatial.sqrt()
            }
        }
    }
}

/// Changes between parallelization schemas of the assign step.
#[derive(Clone, PartialEq, Debug, Copy)]
pub enum AssignThreadingStrategy {
    /// No threading - used for correctness checks and very small images.
    SingleThread,
    /// The image is split into horizontal bands, one per available rayon thread. Every band owns
    /// its part of the label map and the distance buffer and visits all clusters in index order,
    /// so the result is bit-identical to `SingleThread`.
    ///
    /// Falls back to `SingleThread` when there are fewer rows than threads.
    RowBased,
}

/// Main config for the processing.
///
/// The defaults reproduce the behavior of the interactive cut-out tool: superpixels of about
/// 40 pixels, fragments under 20 pixels merged away, at most 10 iterations.
#[derive(Clone, Debug)]
pub struct Config {
    /// Target superpixel diameter in pixels (_S_). The grid of initial clusters has
    /// `floor(width / S) * floor(height / S)` cells and every cluster searches a `2S x 2S` window.
    pub region_size: u32,
    /// Connected components with fewer pixels than this are merged into an adjacent region.
    pub min_region_size: u32,
    /// Upper bound of assign/update passes.
    pub max_iterations: u16,
    /// The loop stops early once the summed absolute movement of all cluster centers (position
    /// and color) drops below this value.
    pub residual_threshold: f64,
    /// Color normalization of the distance metric; the color scale is `compactness²`.
    /// Higher means more compact superpixels -> this is about trading color accuracy for locality.
    pub compactness: f32,
    /// See [`DistanceMetric`].
    pub distance_metric: DistanceMetric,
    /// Threading strategy for the assign step.
    pub assign_threading_strategy: AssignThreadingStrategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region_size: 40,
            min_region_size: 20,
            max_iterations: 10,
            residual_threshold: 1e-5,
            compactness: 10f32,
            distance_metric: DistanceMetric::Normalized,
            assign_threading_strategy: AssignThreadingStrategy::RowBased,
        }
    }
}

impl Config {
    /// Set region size from a real number. The value is floored; anything below 1 (including NaN)
    /// becomes 0 and is rejected by [`Config::validate`].
    pub fn with_region_size(mut self, region_size: f64) -> Self {
        self.region_size = if region_size >= 1.0 {
            region_size.floor().min(u32::MAX as f64) as u32
        } else {
            0
        };
        self
    }

    /// Color scale of every cluster (`compactness²`).
    pub fn color_scale(&self) -> f32 {
        self.compactness * self.compactness
    }

    /// Spatial scale of every cluster (`region_size²`).
    pub fn spatial_scale(&self) -> f32 {
        let s = self.region_size as f32;
        s * s
    }

    /// Number of grid cells in x and y for an image of the given size.
    pub fn grid_size(&self, width: usize, height: usize) -> (usize, usize) {
        let s = self.region_size as usize;
        if s == 0 {
            return (0, 0);
        }
        (width / s, height / s)
    }

    /// Check the parameters against an image of the given size.
    pub fn validate(&self, width: usize, height: usize) -> Result<(), ParameterError> {
        if self.region_size == 0 {
            return Err(ParameterError::ZeroRegionSize);
        }
        let (n_x, n_y) = self.grid_size(width, height);
        if n_x == 0 || n_y == 0 {
            return Err(ParameterError::RegionSizeTooLarge {
                region_size: self.region_size,
                width,
                height,
            });
        }
        if self.min_region_size == 0 {
            return Err(ParameterError::ZeroMinRegionSize);
        }
        if self.max_iterations == 0 {
            return Err(ParameterError::ZeroIterations);
        }
        if !self.residual_threshold.is_finite() || self.residual_threshold < 0.0 {
            return Err(ParameterError::ResidualThreshold(self.residual_threshold));
        }
        if !self.compactness.is_finite() || self.compactness <= 0.0 {
            return Err(ParameterError::Compactness(self.compactness));
        }
        Ok(())
    }
}

pub(crate) fn split_length_to_ranges(length: usize, splits: usize) -> Vec<Range<usize>> {
    let chunk_size = length / splits;
    let rem = length % splits;
    (0..splits)
        .scan((rem, 0usize), |(r, acc), _split| {
            let mut size = chunk_size;
            if *r > 0 {
                *r -= 1;
                size += 1;
            }
            let out = (*acc, *acc + size);
            *acc += size;
            Some(out.0..out.1)
        })
        .collect()
}
