//! Output buffers: the foreground cut-out and the superpixel preview.

use crate::arrays::RgbaBuffer;
use crate::connectivity::check_label_range;
use crate::error::DimensionError;
use crate::segment::Segment;
use rayon::prelude::*;

/// Copy the pixels of foreground segments with alpha 255; everything else becomes `(0, 0, 0, 0)`.
pub fn cutout(
    labels: &[i32],
    segments: &[Segment],
    image: &RgbaBuffer,
) -> Result<Vec<u8>, DimensionError> {
    if labels.len() != image.num_pixels() {
        return Err(DimensionError::LabelCount {
            len: labels.len(),
            expected: image.num_pixels(),
        });
    }
    check_label_range(labels, segments.len())?;
    let mut output = vec![0u8; image.data.len()];
    output
        .par_chunks_exact_mut(4)
        .zip(image.data.par_chunks_exact(4))
        .zip(labels.par_iter())
        .for_each(|((out, pixel), label)| {
            if segments[*label as usize].is_foreground() {
                out[..3].copy_from_slice(&pixel[..3]);
                out[3] = 255;
            }
        });
    Ok(output)
}

/// Render every segment with its mean color and draw region boundaries in black.
///
/// A pixel lies on a boundary when its right or lower neighbor belongs to another segment.
/// The result is fully opaque.
pub fn superpixel_preview(
    labels: &[i32],
    segments: &[Segment],
    width: usize,
    height: usize,
) -> Result<Vec<u8>, DimensionError> {
    let expected = width
        .checked_mul(height)
        .ok_or(DimensionError::Overflow { width, height })?;
    if labels.len() != expected {
        return Err(DimensionError::LabelCount {
            len: labels.len(),
            expected,
        });
    }
    check_label_range(labels, segments.len())?;
    let mut output = vec![0u8; labels.len() * 4];
    for (i, (out, label)) in output.chunks_exact_mut(4).zip(labels).enumerate() {
        let x = i % width;
        let y = i / width;
        let boundary = (x + 1 < width && labels[i + 1] != *label)
            || (y + 1 < height && labels[i + width] != *label);
        if !boundary {
            let color = segments[*label as usize].mean_color;
            for (o, c) in out.iter_mut().zip(color) {
                *o = c.round().clamp(0.0, 255.0) as u8;
            }
        }
        out[3] = 255;
    }
    Ok(output)
}
