//! Error types returned by the segmentation entry points.

/// Top-level error of this crate.
///
/// Every variant names the precondition that failed, so the caller can correct the inputs and
/// call again. Nothing is retried internally.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Image or mask dimensions are unusable. Reported before any allocation.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(#[from] DimensionError),
    /// A segmentation parameter is out of its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(#[from] ParameterError),
}

/// A buffer or label map does not fit the image it is used with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DimensionError {
    /// Width or height is zero.
    #[error("width and height must be non-zero, got {width}x{height}")]
    Empty { width: usize, height: usize },
    /// The byte length of the buffer does not fit in `usize`.
    #[error("{width}x{height} RGBA image needs more than usize::MAX bytes")]
    Overflow { width: usize, height: usize },
    /// Buffer length is not `4 * width * height`.
    #[error("{buffer} buffer holds {len} bytes, expected {expected} for {width}x{height} RGBA")]
    LengthMismatch {
        buffer: &'static str,
        len: usize,
        expected: usize,
        width: usize,
        height: usize,
    },
    /// Label map length is not `width * height`.
    #[error("label map holds {len} entries, expected {expected}")]
    LabelCount { len: usize, expected: usize },
    /// A label is negative or not below `bound` (the segment count for segment tables).
    #[error("label {label} at index {index} is outside 0..{bound}")]
    LabelOutOfRange { index: usize, label: i32, bound: usize },
    /// More segments than pixels.
    #[error("{num_segments} segments requested for {num_pixels} pixels")]
    SegmentCount {
        num_segments: usize,
        num_pixels: usize,
    },
    /// Mask and image sizes differ.
    #[error("mask is {mask_width}x{mask_height} but image is {width}x{height}")]
    MaskMismatch {
        mask_width: usize,
        mask_height: usize,
        width: usize,
        height: usize,
    },
}

/// A [`Config`](crate::common::Config) value is out of range.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParameterError {
    /// `region_size` is 0.
    #[error("region size must be at least 1")]
    ZeroRegionSize,
    /// `region_size` exceeds the width or the height.
    #[error("region size {region_size} leaves no grid cell in a {width}x{height} image")]
    RegionSizeTooLarge {
        region_size: u32,
        width: usize,
        height: usize,
    },
    /// `min_region_size` is 0.
    #[error("minimum region size must be at least 1")]
    ZeroMinRegionSize,
    /// `max_iterations` is 0.
    #[error("at least one iteration is required")]
    ZeroIterations,
    /// `residual_threshold` is negative or not finite.
    #[error("residual threshold must be finite and non-negative, got {0}")]
    ResidualThreshold(f64),
    /// `compactness` is not a finite positive number.
    #[error("compactness must be finite and positive, got {0}")]
    Compactness(f32),
}
