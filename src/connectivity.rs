use crate::arrays::Array2D;
use crate::error::DimensionError;

/// Neighbor offsets in the order they are inspected: +x, -x, +y, -y.
const DX4: [isize; 4] = [1, -1, 0, 0];
const DY4: [isize; 4] = [0, 0, 1, -1];

#[inline(always)]
fn neighbor(index: usize, direction: usize, width: usize, height: usize) -> Option<usize> {
    let x = (index % width) as isize + DX4[direction];
    let y = (index / width) as isize + DY4[direction];
    if x < 0 || y < 0 || x >= width as isize || y >= height as isize {
        return None;
    }
    Some(y as usize * width + x as usize)
}

/// Fails with the first label that is negative or not below `bound`.
pub fn check_label_range(labels: &[i32], bound: usize) -> Result<(), DimensionError> {
    match labels
        .iter()
        .position(|l| *l < 0 || *l as usize >= bound)
    {
        Some(index) => Err(DimensionError::LabelOutOfRange {
            index,
            label: labels[index],
            bound,
        }),
        None => Ok(()),
    }
}

/// This function implements the small region elimination (CCA) step.
///
/// The image is flood-filled in row-major order with 4-connectivity. For every newly discovered
/// component, the neighbors of its first pixel are inspected in the order +x, -x, +y, -y and the
/// last one that already belongs to a finished component becomes the absorber. Components with
/// fewer than `min_region_size` pixels take the absorber's label; larger ones keep their own.
///
/// Labels are not renumbered: two large components that came from the same cluster keep the same
/// label. Use [`compact_labels`] afterwards to get a dense range.
///
/// Labels must lie in `0..i32::MAX`.
pub fn eliminate_small_regions(
    assignments: &mut Array2D<i32>,
    min_region_size: u32,
) -> Result<(), DimensionError> {
    check_label_range(assignments.as_slice(), i32::MAX as usize)?;
    let width = assignments.width;
    let height = assignments.height;
    let num_pixels = width * height;
    // Labels shifted by one; zero marks unvisited pixels.
    let mut cleaned: Vec<i32> = vec![0; num_pixels];
    let mut segment: Vec<usize> = Vec::with_capacity(num_pixels.min(1 << 16));
    let labels = assignments.data.as_slice();

    for pixel in 0..num_pixels {
        if cleaned[pixel] != 0 {
            continue;
        }
        let label = labels[pixel];
        let own_label = label + 1;
        cleaned[pixel] = own_label;
        let mut absorber = own_label;
        for direction in 0..4 {
            if let Some(n) = neighbor(pixel, direction, width, height) {
                if cleaned[n] != 0 {
                    absorber = cleaned[n];
                }
            }
        }

        segment.clear();
        segment.push(pixel);
        let mut num_expanded = 0;
        while num_expanded < segment.len() {
            let open = segment[num_expanded];
            num_expanded += 1;
            for direction in 0..4 {
                if let Some(n) = neighbor(open, direction, width, height) {
                    if cleaned[n] == 0 && labels[n] == label {
                        cleaned[n] = own_label;
                        segment.push(n);
                    }
                }
            }
        }

        if segment.len() < min_region_size as usize {
            for &p in &segment {
                cleaned[p] = absorber;
            }
        }
    }

    for (label, cleaned_label) in assignments.data.iter_mut().zip(cleaned) {
        *label = cleaned_label - 1;
    }
    Ok(())
}

/// Renumber labels to `0..n` in order of first occurrence (row-major) and return `n`.
///
/// Labels must be non-negative. A map that is already compact is left unchanged.
pub fn compact_labels(labels: &mut [i32]) -> Result<usize, DimensionError> {
    check_label_range(labels, i32::MAX as usize)?;
    let max_label = labels.iter().copied().max().unwrap_or(-1);
    let mut substitute = vec![-1i32; (max_label + 1).max(0) as usize];
    let mut num_labels = 0i32;
    for label in labels.iter_mut() {
        let slot = &mut substitute[*label as usize];
        if *slot < 0 {
            *slot = num_labels;
            num_labels += 1;
        }
        *label = *slot;
    }
    Ok(num_labels as usize)
}

#[cfg(test)]
mod tests {
    use super::{check_label_range, compact_labels, eliminate_small_regions};
    use crate::arrays::Array2D;
    use crate::error::DimensionError;

    fn labels(data: &[i32], width: usize, height: usize) -> Array2D<i32> {
        Array2D::from_slice(data, width, height).unwrap()
    }

    #[test]
    fn small_island_is_absorbed() {
        #[rustfmt::skip]
        let mut map = labels(&[
            0, 0, 0, 0, 0,
            0, 0, 3, 0, 0,
            0, 0, 0, 0, 0,
            1, 1, 1, 1, 1,
            1, 1, 1, 1, 1,
        ], 5, 5);
        eliminate_small_regions(&mut map, 3).unwrap();
        #[rustfmt::skip]
        assert_eq!(map.as_slice(), &[
            0, 0, 0, 0, 0,
            0, 0, 0, 0, 0,
            0, 0, 0, 0, 0,
            1, 1, 1, 1, 1,
            1, 1, 1, 1, 1,
        ]);
    }

    #[test]
    fn absorber_is_last_visited_neighbor() {
        // the 2-pixel component of label 5 starts at (1, 1); its -x and +y neighbors (label 1)
        // and its -y neighbor (label 0) are finished, -y is inspected last
        #[rustfmt::skip]
        let mut map = labels(&[
            0, 0, 0,
            1, 5, 5,
            1, 1, 1,
        ], 3, 3);
        eliminate_small_regions(&mut map, 3).unwrap();
        #[rustfmt::skip]
        assert_eq!(map.as_slice(), &[
            0, 0, 0,
            1, 0, 0,
            1, 1, 1,
        ]);
    }

    #[test]
    fn split_cluster_keeps_label() {
        // cluster 2 is split in two large pieces, both keep label 2
        #[rustfmt::skip]
        let mut map = labels(&[
            2, 2, 0, 2, 2,
            2, 2, 0, 2, 2,
        ], 5, 2);
        eliminate_small_regions(&mut map, 2).unwrap();
        assert_eq!(map.as_slice(), &[2, 2, 0, 2, 2, 2, 2, 0, 2, 2]);
    }

    #[test]
    fn whole_image_below_minimum_merges_into_one() {
        #[rustfmt::skip]
        let mut map = labels(&[
            0, 0, 1, 1,
            0, 0, 1, 1,
            2, 2, 3, 3,
            2, 2, 3, 3,
        ], 4, 4);
        eliminate_small_regions(&mut map, 20).unwrap();
        assert!(map.as_slice().iter().all(|l| *l == 0));
    }

    #[test]
    fn no_small_component_survives() {
        // stripes of width 1 alternate, every stripe is a 1x6 component
        let data: Vec<i32> = (0..36).map(|i| ((i % 6) % 2) as i32).collect();
        let mut map = labels(&data, 6, 6);
        eliminate_small_regions(&mut map, 7).unwrap();
        assert!(map.as_slice().iter().all(|l| *l == 0));
    }

    #[test]
    fn compact_labels_first_occurrence() {
        let mut map = vec![7, 7, 3, 9, 3, 0];
        assert_eq!(compact_labels(&mut map), Ok(4));
        assert_eq!(map, vec![0, 0, 1, 2, 1, 3]);
    }

    #[test]
    fn compact_labels_is_idempotent() {
        let mut map = vec![0, 0, 1, 2, 1, 3, 3];
        let before = map.clone();
        assert_eq!(compact_labels(&mut map), Ok(4));
        assert_eq!(map, before);
        assert_eq!(compact_labels(&mut []), Ok(0));
    }

    #[test]
    fn negative_labels_are_rejected() {
        let mut map = vec![0, 1, -1, 1];
        assert_eq!(
            compact_labels(&mut map),
            Err(DimensionError::LabelOutOfRange {
                index: 2,
                label: -1,
                bound: i32::MAX as usize
            })
        );
        assert_eq!(map, vec![0, 1, -1, 1]);
        let mut grid = labels(&[0, 0, -3, 0], 2, 2);
        assert!(eliminate_small_regions(&mut grid, 2).is_err());
        assert_eq!(grid.as_slice(), &[0, 0, -3, 0]);
        let mut grid = labels(&[0, i32::MAX], 2, 1);
        assert!(eliminate_small_regions(&mut grid, 1).is_err());
    }

    #[test]
    fn label_range_check() {
        assert_eq!(check_label_range(&[0, 2, 1], 3), Ok(()));
        assert_eq!(check_label_range(&[], 0), Ok(()));
        assert_eq!(
            check_label_range(&[0, 3], 1),
            Err(DimensionError::LabelOutOfRange {
                index: 1,
                label: 3,
                bound: 1
            })
        );
    }
}
