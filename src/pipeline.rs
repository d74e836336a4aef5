//! End-to-end entry points: image in, label map, segment table and cut-out out.

use crate::arrays::{LabImage, RgbaBuffer};
use crate::common::Config;
use crate::composite::{cutout, superpixel_preview};
use crate::connectivity::{compact_labels, eliminate_small_regions};
use crate::edge::compute_edges;
use crate::error::Error;
use crate::segment::{classify_segments, Segment, SegmentRole};
use crate::slic::{iterate_with_cancel, Clusters, IterationReport};
use log::{info, warn};
use std::sync::atomic::AtomicBool;

/// Final superpixel label map.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    pub width: usize,
    pub height: usize,
    /// Row-major region id of every pixel, in `0..num_segments`.
    pub index_map: Vec<i32>,
    pub num_segments: usize,
    /// How the clustering loop ended.
    pub report: IterationReport,
}

/// Segmentation plus the classified segment table and the cut-out buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub segmentation: Segmentation,
    /// Indexed by region id.
    pub segments: Vec<Segment>,
    /// RGBA8, opaque exactly on foreground segments.
    pub composite: Vec<u8>,
}

impl Extraction {
    /// Region ids with the given role.
    pub fn segments_with_role(&self, role: SegmentRole) -> impl Iterator<Item = usize> + '_ {
        self.segments
            .iter()
            .enumerate()
            .filter(move |(_, s)| s.role == role)
            .map(|(i, _)| i)
    }

    /// Mean-color rendering with black boundaries, for previews.
    pub fn preview(&self) -> Result<Vec<u8>, Error> {
        let s = &self.segmentation;
        Ok(superpixel_preview(
            &s.index_map,
            &self.segments,
            s.width,
            s.height,
        )?)
    }
}

/// Run SLIC, merge small fragments and compact the labels.
///
/// `image` is row-major RGBA8 of `width x height` pixels.
pub fn segment_image(
    image: &[u8],
    width: usize,
    height: usize,
    config: &Config,
) -> Result<Segmentation, Error> {
    segment_image_with_cancel(image, width, height, config, None)
}

/// Same as [`segment_image`] with a cooperative cancellation flag, checked after every clustering
/// pass. A cancelled run still returns a valid segmentation built from the last completed pass;
/// `report.cancelled` tells the caller it was cut short.
pub fn segment_image_with_cancel(
    image: &[u8],
    width: usize,
    height: usize,
    config: &Config,
    cancel: Option<&AtomicBool>,
) -> Result<Segmentation, Error> {
    let image = RgbaBuffer::new(image, width, height)?;
    config.validate(width, height)?;
    run_segmentation(&image, config, cancel)
}

fn run_segmentation(
    image: &RgbaBuffer,
    config: &Config,
    cancel: Option<&AtomicBool>,
) -> Result<Segmentation, Error> {
    let lab = LabImage::from_rgba(image);
    let edges = compute_edges(&lab);
    let mut clusters = Clusters::initialize_clusters(&lab, &edges, config);
    let num_clusters = clusters.clusters.len();
    let report = iterate_with_cancel(&lab, config, &mut clusters, cancel);
    if report.cancelled {
        warn!(
            "segmentation cancelled after {} iterations (residual {:.6})",
            report.iterations, report.residual
        );
    }
    let mut assignments = clusters.assignments;
    eliminate_small_regions(&mut assignments, config.min_region_size)?;
    let mut index_map = assignments.to_vec();
    let num_segments = compact_labels(&mut index_map)?;
    info!(
        "{}x{}: {} clusters -> {} segments in {} iterations (converged: {})",
        image.width,
        image.height,
        num_clusters,
        num_segments,
        report.iterations,
        report.converged
    );
    Ok(Segmentation {
        width: image.width,
        height: image.height,
        index_map,
        num_segments,
        report,
    })
}

/// Segment `image`, classify every segment by the strokes painted in `mask` and build the
/// cut-out containing only foreground segments.
pub fn extract_foreground(
    image: &[u8],
    mask: &[u8],
    width: usize,
    height: usize,
    config: &Config,
) -> Result<Extraction, Error> {
    let image = RgbaBuffer::new(image, width, height)?;
    let mask = RgbaBuffer::mask(mask, width, height)?;
    config.validate(width, height)?;
    let segmentation = run_segmentation(&image, config, None)?;
    classify(segmentation, &image, &mask)
}

/// Classify an existing segmentation against a new mask, e.g. after the user painted more strokes.
///
/// The label map is checked against `num_segments` first, so a hand-built [`Segmentation`] with
/// stray labels is rejected instead of indexing past the segment table.
pub fn reclassify(
    segmentation: Segmentation,
    image: &[u8],
    mask: &[u8],
) -> Result<Extraction, Error> {
    let image = RgbaBuffer::new(image, segmentation.width, segmentation.height)?;
    let mask = RgbaBuffer::mask(mask, segmentation.width, segmentation.height)?;
    classify(segmentation, &image, &mask)
}

fn classify(
    segmentation: Segmentation,
    image: &RgbaBuffer,
    mask: &RgbaBuffer,
) -> Result<Extraction, Error> {
    let segments = classify_segments(
        &segmentation.index_map,
        segmentation.num_segments,
        image,
        mask,
    )?;
    let composite = cutout(&segmentation.index_map, &segments, image)?;
    Ok(Extraction {
        segmentation,
        segments,
        composite,
    })
}
