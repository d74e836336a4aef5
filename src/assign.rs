use crate::arrays::{Array2D, LabImage};
use crate::cluster::Cluster;
use crate::common::{split_length_to_ranges, AssignThreadingStrategy, Config, DistanceMetric};
use crate::slic::Clusters;
use assume::assume;
use multiversion::multiversion;
use rayon::current_num_threads;
use rayon::prelude::*;
use std::ops::Range;

/// This function implements the assign step in SLIC algorithm.
///
/// `min_distances` is reset to infinity and every cluster claims the pixels of its search window
/// that are strictly closer to it than to any cluster visited before. The window and the spatial
/// term are both taken around the center rounded to the nearest pixel. Clusters are visited in
/// index order, so on a tie the lower cluster number keeps the pixel. Pixels outside of every
/// window keep their previous label.
pub fn assign(
    image: &LabImage,
    config: &Config,
    clusters: &mut Clusters,
    min_distances: &mut Array2D<f32>,
) {
    debug_assert_eq!(min_distances.width, image.width);
    debug_assert_eq!(min_distances.height, image.height);
    min_distances.fill(f32::INFINITY);
    let num_threads = current_num_threads();
    let width = image.width;
    let search_region_size = config.region_size as usize;
    let metric = config.distance_metric;

    if config.assign_threading_strategy == AssignThreadingStrategy::SingleThread
        || num_threads < 2
        || image.height < num_threads
    {
        assign_rows(
            image,
            &clusters.clusters,
            metric,
            search_region_size,
            0..image.height,
            clusters.assignments.data.as_mut_slice(),
            min_distances.data.as_mut_slice(),
        );
        return;
    }

    // Every band owns the rows of both buffers, so no synchronization is needed.
    let ranges = split_length_to_ranges(image.height, num_threads);
    let mut bands = Vec::with_capacity(ranges.len());
    let mut assignments_rest: &mut [i32] = clusters.assignments.data.as_mut_slice();
    let mut distances_rest: &mut [f32] = min_distances.data.as_mut_slice();
    for rows in ranges {
        let len = rows.len() * width;
        let (assignments_band, a_tail) = std::mem::take(&mut assignments_rest).split_at_mut(len);
        let (distances_band, d_tail) = std::mem::take(&mut distances_rest).split_at_mut(len);
        assignments_rest = a_tail;
        distances_rest = d_tail;
        bands.push((rows, assignments_band, distances_band));
    }
    let cluster_list = &clusters.clusters;
    bands
        .into_par_iter()
        .for_each(|(rows, assignments_band, distances_band)| {
            assign_rows(
                image,
                cluster_list,
                metric,
                search_region_size,
                rows,
                assignments_band,
                distances_band,
            )
        });
}

/// Assign step restricted to `rows`. `assignments` and `min_distances` hold exactly those rows.
#[multiversion(targets = "simd")]
fn assign_rows(
    image: &LabImage,
    clusters: &[Cluster],
    metric: DistanceMetric,
    search_region_size: usize,
    rows: Range<usize>,
    assignments: &mut [i32],
    min_distances: &mut [f32],
) {
    let width = image.width;
    debug_assert_eq!(assignments.len(), rows.len() * width);
    debug_assert_eq!(min_distances.len(), rows.len() * width);
    for cluster in clusters {
        let window = cluster.search_window(width, image.height, search_region_size);
        let top = window.top.max(rows.start);
        let bottom = window.bottom.min(rows.end);
        if top >= bottom || window.left >= window.right {
            continue;
        }
        let number = cluster.number as i32;
        let cx = cluster.x.round();
        let cy = cluster.y.round();
        for y in top..bottom {
            let dy = y as f32 - cy;
            let dy2 = dy * dy;
            let [l_row, a_row, b_row] = image.get_rows(y);
            let local_row = (y - rows.start) * width;
            for x in window.left..window.right {
                let dx = x as f32 - cx;
                let spatial = dx * dx + dy2;
                assume!(unsafe: x < l_row.len(), "x: {x} >= {}", l_row.len());
                assume!(unsafe: x < a_row.len(), "x: {x} >= {}", a_row.len());
                assume!(unsafe: x < b_row.len(), "x: {x} >= {}", b_row.len());
                let dl = l_row[x] - cluster.l;
                let da = a_row[x] - cluster.a;
                let db = b_row[x] - cluster.b;
                let color = dl * dl + da * da + db * db;
                let distance =
                    metric.distance(color, spatial, cluster.color_scale, cluster.spatial_scale);
                let idx = local_row + x;
                assume!(unsafe: idx < min_distances.len(), "idx: {idx} >= {}", min_distances.len());
                assume!(unsafe: idx < assignments.len(), "idx: {idx} >= {}", assignments.len());
                if distance < min_distances[idx] {
                    min_distances[idx] = distance;
                    assignments[idx] = number;
                }
            }
        }
    }
}
