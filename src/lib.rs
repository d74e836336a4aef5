//! SLIC superpixels with stroke-driven foreground extraction.
//!
//! This crate segments an RGBA image into superpixels with SLIC (Simple Linear Iterative
//! Clustering) and then classifies every superpixel as foreground or background from a mask the
//! user painted: green `(0, 128, 0, 255)` strokes mark foreground, red `(255, 0, 0, 255)` strokes
//! mark background. The cut-out keeps the foreground superpixels and makes everything else
//! transparent.
//!
//! The steps are:
//!  - RGBA -> CIELAB conversion (`cielab`, `arrays::LabImage`)
//!  - gradient energy for seeding (`edge`)
//!  - grid seeding moved to the lowest-energy pixel of a 3x3 neighborhood (`slic`)
//!  - assign/update loop until the centers stop moving or the iteration cap is hit (`assign`,
//!    `slic`)
//!  - small fragments merged into a neighbor and labels compacted (`connectivity`)
//!  - segment statistics, adjacency and roles (`segment`)
//!  - cut-out and preview buffers (`composite`)
//!
//! The whole chain is available through `pipeline`:
//!
//! ```rust
//! use slic_cutout::common::Config;
//! use slic_cutout::pipeline::extract_foreground;
//! use slic_cutout::segment::{SegmentRole, FOREGROUND_STROKE};
//!
//! let (width, height) = (64, 48);
//! // left half dark, right half bright
//! let image: Vec<u8> = (0..width * height)
//!     .flat_map(|i| if i % width < width / 2 { [30, 30, 30, 255] } else { [220, 220, 220, 255] })
//!     .collect();
//! // one foreground stroke pixel on the bright half
//! let mut mask = vec![0u8; width * height * 4];
//! let stroke = (10 * width + 50) * 4;
//! mask[stroke..stroke + 4].copy_from_slice(&FOREGROUND_STROKE);
//!
//! let config = Config::default().with_region_size(16.0);
//! let extraction = extract_foreground(&image, &mask, width, height, &config).unwrap();
//!
//! let foreground: Vec<usize> = extraction.segments_with_role(SegmentRole::Foreground).collect();
//! assert_eq!(foreground.len(), 1);
//! assert_eq!(extraction.composite[stroke + 3], 255);
//! ```
//!
//! The computation is deterministic: the same inputs always produce the same labels, whatever
//! threading strategy is used. The library logs through the `log` facade and never installs a
//! logger.

pub mod arrays;
pub mod assign;
pub mod cielab;
pub mod cluster;
pub mod common;
pub mod composite;
pub mod connectivity;
pub mod edge;
pub mod error;
pub mod pipeline;
pub mod segment;
pub mod slic;

pub use common::Config;
pub use error::Error;
pub use pipeline::{extract_foreground, segment_image, Extraction, Segmentation};
