//! Per-superpixel statistics and foreground/background classification from painted strokes.

use crate::arrays::RgbaBuffer;
use crate::connectivity::check_label_range;
use crate::error::DimensionError;
use std::collections::BTreeMap;

/// Mask pixel marking foreground.
pub const FOREGROUND_STROKE: [u8; 4] = [0, 128, 0, 255];
/// Mask pixel marking background.
pub const BACKGROUND_STROKE: [u8; 4] = [255, 0, 0, 255];

/// A painted mask pixel. Everything that is not exactly one of the two stroke colors is
/// unpainted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stroke {
    Foreground,
    Background,
}

impl Stroke {
    #[inline(always)]
    pub fn from_pixel(rgba: &[u8]) -> Option<Stroke> {
        if rgba == FOREGROUND_STROKE {
            Some(Stroke::Foreground)
        } else if rgba == BACKGROUND_STROKE {
            Some(Stroke::Background)
        } else {
            None
        }
    }
}

/// Role of a segment derived from the strokes that touch it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentRole {
    /// Only foreground strokes.
    Foreground,
    /// Only background strokes.
    Background,
    /// Both kinds of strokes.
    Mixed,
    /// Never painted.
    Unknown,
}

impl SegmentRole {
    pub fn from_stroke_counts(foreground: u32, background: u32) -> SegmentRole {
        match (foreground > 0, background > 0) {
            (true, false) => SegmentRole::Foreground,
            (false, true) => SegmentRole::Background,
            (true, true) => SegmentRole::Mixed,
            (false, false) => SegmentRole::Unknown,
        }
    }
}

/// Statistics of one superpixel.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Mean RGB of the original image over the segment.
    pub mean_color: [f32; 3],
    /// Number of pixels carrying this label
    pub pixel_count: u32,
    /// Mask pixels painted with the foreground stroke color
    pub foreground_strokes: u32,
    /// Mask pixels painted with the background stroke color
    pub background_strokes: u32,
    /// Role derived from the two stroke counts
    pub role: SegmentRole,
}

impl Segment {
    pub fn is_foreground(&self) -> bool {
        self.role == SegmentRole::Foreground
    }
}

fn check_inputs(
    labels: &[i32],
    num_segments: usize,
    image: &RgbaBuffer,
    mask: Option<&RgbaBuffer>,
) -> Result<(), DimensionError> {
    if labels.len() != image.num_pixels() {
        return Err(DimensionError::LabelCount {
            len: labels.len(),
            expected: image.num_pixels(),
        });
    }
    if num_segments > labels.len() {
        return Err(DimensionError::SegmentCount {
            num_segments,
            num_pixels: labels.len(),
        });
    }
    check_label_range(labels, num_segments)?;
    if let Some(mask) = mask {
        if mask.width != image.width || mask.height != image.height {
            return Err(DimensionError::MaskMismatch {
                mask_width: mask.width,
                mask_height: mask.height,
                width: image.width,
                height: image.height,
            });
        }
    }
    Ok(())
}

/// Build the segment table for a compact label map.
///
/// `labels` must hold values in `0..num_segments` (the output of
/// [`compact_labels`](crate::connectivity::compact_labels)), otherwise
/// [`DimensionError::LabelOutOfRange`] is returned. The table is indexed by label.
pub fn classify_segments(
    labels: &[i32],
    num_segments: usize,
    image: &RgbaBuffer,
    mask: &RgbaBuffer,
) -> Result<Vec<Segment>, DimensionError> {
    check_inputs(labels, num_segments, image, Some(mask))?;
    let mut color_sums: Vec<[u64; 3]> = vec![[0; 3]; num_segments];
    let mut counts: Vec<[u32; 3]> = vec![[0; 3]; num_segments];
    for ((label, pixel), mask_pixel) in labels.iter().zip(image.pixels()).zip(mask.pixels()) {
        let label = *label as usize;
        let sum = &mut color_sums[label];
        sum[0] += pixel[0] as u64;
        sum[1] += pixel[1] as u64;
        sum[2] += pixel[2] as u64;
        let count = &mut counts[label];
        count[0] += 1;
        match Stroke::from_pixel(mask_pixel) {
            Some(Stroke::Foreground) => count[1] += 1,
            Some(Stroke::Background) => count[2] += 1,
            None => {}
        }
    }
    Ok(color_sums
        .into_iter()
        .zip(counts)
        .map(|(sum, [pixel_count, foreground, background])| {
            let n = pixel_count.max(1) as f64;
            Segment {
                mean_color: sum.map(|s| (s as f64 / n) as f32),
                pixel_count,
                foreground_strokes: foreground,
                background_strokes: background,
                role: SegmentRole::from_stroke_counts(foreground, background),
            }
        })
        .collect())
}

/// 256-bin histograms of the R, G and B channels of every segment.
#[derive(Debug, Clone)]
pub struct SegmentHistograms {
    pub red: Vec<[u32; 256]>,
    pub green: Vec<[u32; 256]>,
    pub blue: Vec<[u32; 256]>,
}

/// Optional statistics pass, independent of [`classify_segments`].
pub fn segment_histograms(
    labels: &[i32],
    num_segments: usize,
    image: &RgbaBuffer,
) -> Result<SegmentHistograms, DimensionError> {
    check_inputs(labels, num_segments, image, None)?;
    let mut histograms = SegmentHistograms {
        red: vec![[0; 256]; num_segments],
        green: vec![[0; 256]; num_segments],
        blue: vec![[0; 256]; num_segments],
    };
    for (label, pixel) in labels.iter().zip(image.pixels()) {
        let label = *label as usize;
        histograms.red[label][pixel[0] as usize] += 1;
        histograms.green[label][pixel[1] as usize] += 1;
        histograms.blue[label][pixel[2] as usize] += 1;
    }
    Ok(histograms)
}

/// Neighbors of every segment under 4-connectivity.
///
/// `adjacency[a][&b]` is the number of horizontally or vertically adjacent pixel pairs with labels
/// `a` and `b`, i.e. the length of their shared boundary. The table is symmetric and a segment is
/// never its own neighbor.
pub fn segment_adjacency(
    labels: &[i32],
    width: usize,
    height: usize,
    num_segments: usize,
) -> Result<Vec<BTreeMap<usize, u32>>, DimensionError> {
    let expected = width
        .checked_mul(height)
        .ok_or(DimensionError::Overflow { width, height })?;
    if labels.len() != expected {
        return Err(DimensionError::LabelCount {
            len: labels.len(),
            expected,
        });
    }
    if num_segments > labels.len() {
        return Err(DimensionError::SegmentCount {
            num_segments,
            num_pixels: labels.len(),
        });
    }
    check_label_range(labels, num_segments)?;
    let mut adjacency = vec![BTreeMap::new(); num_segments];
    let mut link = |a: i32, b: i32| {
        if a != b {
            *adjacency[a as usize].entry(b as usize).or_insert(0) += 1;
            *adjacency[b as usize].entry(a as usize).or_insert(0) += 1;
        }
    };
    for (y, row) in labels.chunks_exact(width.max(1)).enumerate() {
        for (x, label) in row.iter().enumerate() {
            if x + 1 < width {
                link(*label, row[x + 1]);
            }
            if y + 1 < height {
                link(*label, labels[(y + 1) * width + x]);
            }
        }
    }
    Ok(adjacency)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stroke_colors_must_match_exactly() {
        assert_eq!(Stroke::from_pixel(&[0, 128, 0, 255]), Some(Stroke::Foreground));
        assert_eq!(Stroke::from_pixel(&[255, 0, 0, 255]), Some(Stroke::Background));
        assert_eq!(Stroke::from_pixel(&[0, 128, 0, 254]), None);
        assert_eq!(Stroke::from_pixel(&[0, 127, 0, 255]), None);
        assert_eq!(Stroke::from_pixel(&[0, 0, 0, 0]), None);
    }

    #[test]
    fn role_rule() {
        assert_eq!(SegmentRole::from_stroke_counts(3, 0), SegmentRole::Foreground);
        assert_eq!(SegmentRole::from_stroke_counts(0, 1), SegmentRole::Background);
        assert_eq!(SegmentRole::from_stroke_counts(2, 2), SegmentRole::Mixed);
        assert_eq!(SegmentRole::from_stroke_counts(0, 0), SegmentRole::Unknown);
    }

    #[test]
    fn classify_counts_and_means() {
        let image: Vec<u8> = [[10, 20, 30, 255], [30, 40, 50, 255], [7, 7, 7, 255], [9, 9, 9, 0]]
            .concat();
        let mask: Vec<u8> = [FOREGROUND_STROKE, BACKGROUND_STROKE, [1, 2, 3, 4], FOREGROUND_STROKE]
            .concat();
        let labels = [0, 0, 1, 2];
        let image = RgbaBuffer::new(&image, 2, 2).unwrap();
        let mask = RgbaBuffer::mask(&mask, 2, 2).unwrap();
        let segments = classify_segments(&labels, 3, &image, &mask).unwrap();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].mean_color, [20.0, 30.0, 40.0]);
        assert_eq!(segments[0].pixel_count, 2);
        assert_eq!(segments[0].role, SegmentRole::Mixed);
        assert_eq!(segments[1].role, SegmentRole::Unknown);
        assert_eq!(segments[1].mean_color, [7.0, 7.0, 7.0]);
        assert_eq!(segments[2].role, SegmentRole::Foreground);
        assert!(segments[2].is_foreground());
        assert_eq!(segments[2].foreground_strokes, 1);
    }

    #[test]
    fn classify_rejects_mismatched_inputs() {
        let image = vec![0u8; 16];
        let mask = vec![0u8; 16];
        let image = RgbaBuffer::new(&image, 2, 2).unwrap();
        let wide_mask = RgbaBuffer::mask(&mask, 4, 1).unwrap();
        let mask = RgbaBuffer::mask(&mask, 2, 2).unwrap();
        assert!(matches!(
            classify_segments(&[0, 0, 0, 0], 1, &image, &wide_mask),
            Err(DimensionError::MaskMismatch { .. })
        ));
        assert_eq!(
            classify_segments(&[0, 0, 0], 1, &image, &mask),
            Err(DimensionError::LabelCount {
                len: 3,
                expected: 4
            })
        );
        assert_eq!(
            classify_segments(&[0, 0, 2, 0], 2, &image, &mask),
            Err(DimensionError::LabelOutOfRange {
                index: 2,
                label: 2,
                bound: 2
            })
        );
        assert!(classify_segments(&[0, -1, 0, 0], 1, &image, &mask).is_err());
        assert!(segment_histograms(&[0, 0, 0, 5], 1, &image).is_err());
        assert_eq!(
            classify_segments(&[0, 0, 0, 0], usize::MAX, &image, &mask),
            Err(DimensionError::SegmentCount {
                num_segments: usize::MAX,
                num_pixels: 4
            })
        );
    }

    #[test]
    fn histograms_per_segment() {
        let image: Vec<u8> = [[1, 2, 3, 255], [1, 5, 6, 255], [200, 2, 3, 255]].concat();
        let image = RgbaBuffer::new(&image, 3, 1).unwrap();
        let h = segment_histograms(&[0, 0, 1], 2, &image).unwrap();
        assert_eq!(h.red[0][1], 2);
        assert_eq!(h.green[0][2], 1);
        assert_eq!(h.green[0][5], 1);
        assert_eq!(h.red[1][200], 1);
        assert_eq!(h.blue[1].iter().sum::<u32>(), 1);
    }

    #[test]
    fn adjacency_counts_shared_boundary() {
        #[rustfmt::skip]
        let labels = [
            0, 0, 1,
            0, 2, 1,
        ];
        let adjacency = segment_adjacency(&labels, 3, 2, 3).unwrap();
        // 0-1 on row 0, 0-2 on row 1 and column 1
        assert_eq!(adjacency[0], BTreeMap::from([(1, 1), (2, 2)]));
        assert_eq!(adjacency[1], BTreeMap::from([(0, 1), (2, 1)]));
        assert_eq!(adjacency[2], BTreeMap::from([(0, 2), (1, 1)]));
        let single = segment_adjacency(&[0, 0, 0, 0], 2, 2, 1).unwrap();
        assert!(single[0].is_empty());
        assert!(matches!(
            segment_adjacency(&labels, 3, 2, 2),
            Err(DimensionError::LabelOutOfRange { index: 4, .. })
        ));
        assert!(segment_adjacency(&labels, 2, 2, 3).is_err());
    }
}
