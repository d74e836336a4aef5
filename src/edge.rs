//! Gradient energy of the Lab image, used to move seeds away from edges.

use crate::arrays::{Array2D, LabImage};

/// Per-pixel gradient energy.
///
/// For every interior pixel the squared central differences in x and y are summed over the
/// L, a and b planes. Border pixels have no full neighborhood and keep zero energy.
pub fn compute_edges(image: &LabImage) -> Array2D<f32> {
    let width = image.width;
    let height = image.height;
    let mut edges = Array2D::from_fill(0f32, width, height);
    if width < 3 || height < 3 {
        return edges;
    }
    for plane in &image.planes {
        for y in 1..height - 1 {
            let up = plane.get_row(y - 1);
            let row = plane.get_row(y);
            let down = plane.get_row(y + 1);
            let out = edges.get_row_mut(y);
            for x in 1..width - 1 {
                let dx = row[x - 1] - row[x + 1];
                let dy = down[x] - up[x];
                out[x] += dx * dx + dy * dy;
            }
        }
    }
    edges
}
