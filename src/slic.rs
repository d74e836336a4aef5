use crate::arrays::{Array2D, LabImage};
use crate::assign::assign;
use crate::cluster::Cluster;
use crate::common::Config;
use log::{debug, trace};
use multiversion::multiversion;
use std::sync::atomic::{AtomicBool, Ordering};

/// Convenient struct for passing values around.
#[derive(Debug, Clone)]
pub struct Clusters {
    /// For every pixel in image this stores to which cluster it belongs (see `Cluster.number`).
    ///
    /// Starts zeroed, so every pixel holds a valid cluster number even if no search window ever
    /// reaches it.
    pub assignments: Array2D<i32>,
    pub clusters: Vec<Cluster>,
}

impl Clusters {
    /// Default initialize clusters function.
    ///
    /// Seeds are placed on a regular grid with spacing `region_size` and then moved to the pixel
    /// with the lowest edge energy in their 3x3 neighborhood (first minimum in row-major order).
    ///
    /// For custom implementations the needed filled fields in new cluster are `x`, `y`, `l`, `a`,
    /// `b`, both scales and unique `number` equal to the index in `clusters`.
    pub fn initialize_clusters(image: &LabImage, edges: &Array2D<f32>, config: &Config) -> Clusters {
        let (n_x, n_y) = config.grid_size(image.width, image.height);
        let mut clusters = Clusters {
            assignments: Array2D::from_fill(0i32, image.width, image.height),
            clusters: Vec::with_capacity(n_x * n_y),
        };
        let region_size = config.region_size as f64;
        let color_scale = config.color_scale();
        let spatial_scale = config.spatial_scale();
        for v in 0..n_y {
            for u in 0..n_x {
                let x = ((region_size * (u as f64 + 0.5)).round() as usize).min(image.width - 1);
                let y = ((region_size * (v as f64 + 0.5)).round() as usize).min(image.height - 1);
                let (center_x, center_y) = lowest_energy_neighbor(edges, x, y);
                let [l, a, b] = image.get_pixel(center_x, center_y);
                clusters.clusters.push(Cluster {
                    x: center_x as f32,
                    y: center_y as f32,
                    l,
                    a,
                    b,
                    color_scale,
                    spatial_scale,
                    number: clusters.clusters.len() as u32,
                    ..Cluster::default()
                });
            }
        }
        debug_assert_eq!(clusters.clusters.len(), n_x * n_y);
        clusters
    }
}

fn lowest_energy_neighbor(edges: &Array2D<f32>, x: usize, y: usize) -> (usize, usize) {
    let mut min_energy = f32::INFINITY;
    let mut best = (x, y);
    for yp in y.saturating_sub(1)..=(y + 1).min(edges.height - 1) {
        for xp in x.saturating_sub(1)..=(x + 1).min(edges.width - 1) {
            let energy = edges[(xp, yp)];
            if energy < min_energy {
                min_energy = energy;
                best = (xp, yp);
            }
        }
    }
    best
}

/// Outcome of the assign/update loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationReport {
    /// Number of completed assign/update passes.
    pub iterations: u16,
    /// Residual measured after the last pass.
    pub residual: f64,
    /// The residual dropped below `Config::residual_threshold`.
    pub converged: bool,
    /// The loop was stopped through the cancellation flag.
    pub cancelled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Assign,
    Recompute,
    CheckConvergence,
    Done,
}

/// This function is the main loop.
///
/// The steps are generally:
/// - up to `max_iterations` times
///     - assign
///     - update
///     - stop when the residual drops below `residual_threshold`
///
/// The final labels are left in `clusters.assignments`.
pub fn iterate(image: &LabImage, config: &Config, clusters: &mut Clusters) -> IterationReport {
    iterate_with_cancel(image, config, clusters, None)
}

/// Same as [`iterate`], but checks `cancel` after every completed pass. When it is set the loop
/// stops and `clusters.assignments` holds the labels of the last completed pass.
pub fn iterate_with_cancel(
    image: &LabImage,
    config: &Config,
    clusters: &mut Clusters,
    cancel: Option<&AtomicBool>,
) -> IterationReport {
    let mut min_distances = Array2D::from_fill(f32::INFINITY, image.width, image.height);
    let mut report = IterationReport {
        iterations: 0,
        residual: f64::INFINITY,
        converged: false,
        cancelled: false,
    };
    let mut next_clusters: Vec<Cluster> = Vec::new();
    let mut step = Step::Assign;
    while step != Step::Done {
        step = match step {
            Step::Assign => {
                assign(image, config, clusters, &mut min_distances);
                Step::Recompute
            }
            Step::Recompute => {
                next_clusters = update(clusters, image);
                Step::CheckConvergence
            }
            Step::CheckConvergence => {
                report.iterations += 1;
                report.residual = residual(&clusters.clusters, &next_clusters);
                debug!(
                    "iteration {}: residual {:.6}",
                    report.iterations, report.residual
                );
                if report.residual < config.residual_threshold {
                    report.converged = true;
                    Step::Done
                } else {
                    clusters.clusters.copy_from_slice(&next_clusters);
                    if report.iterations >= config.max_iterations {
                        Step::Done
                    } else if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
                        report.cancelled = true;
                        Step::Done
                    } else {
                        Step::Assign
                    }
                }
            }
            Step::Done => Step::Done,
        };
    }
    report
}

/// Sum of absolute differences over the flattened `(x, y, l, a, b)` centers.
pub fn residual(previous: &[Cluster], current: &[Cluster]) -> f64 {
    debug_assert_eq!(previous.len(), current.len());
    previous
        .iter()
        .zip(current)
        .flat_map(|(p, c)| p.center().into_iter().zip(c.center()))
        .map(|(p, c)| (p as f64 - c as f64).abs())
        .sum()
}

/// This function does the update step.
///
/// Returns the clusters with centers moved to the mean position and mean color of their members.
/// A cluster without members collapses to the origin with zero color; it can regain pixels in a
/// later pass. Runs on one thread so the summation order (and the result) is always the same.
#[multiversion(targets = "simd")]
pub fn update(clusters: &Clusters, image: &LabImage) -> Vec<Cluster> {
    let num_clusters = clusters.clusters.len();
    let mut num_cluster_members: Vec<u32> = vec![0; num_clusters];
    let mut cluster_acc: Vec<[f64; 5]> = vec![[0.0; 5]; num_clusters];
    for row in 0..image.height {
        let [l_row, a_row, b_row] = image.get_rows(row);
        let assignments_row = clusters.assignments.get_row(row);
        for (column, cluster_n) in assignments_row.iter().enumerate() {
            let cluster_n = *cluster_n as usize;
            num_cluster_members[cluster_n] += 1;
            let acc = &mut cluster_acc[cluster_n];
            acc[0] += column as f64;
            acc[1] += row as f64;
            acc[2] += l_row[column] as f64;
            acc[3] += a_row[column] as f64;
            acc[4] += b_row[column] as f64;
        }
    }
    clusters
        .clusters
        .iter()
        .map(|cluster| {
            let cluster_n = cluster.number as usize;
            let members = num_cluster_members[cluster_n];
            if members == 0 {
                trace!("cluster {cluster_n} has no members");
            }
            let inv = 1.0 / (members as f64).max(1e-8);
            let acc = &cluster_acc[cluster_n];
            Cluster {
                x: (acc[0] * inv) as f32,
                y: (acc[1] * inv) as f32,
                l: (acc[2] * inv) as f32,
                a: (acc[3] * inv) as f32,
                b: (acc[4] * inv) as f32,
                num_members: members,
                ..*cluster
            }
        })
        .collect()
}
