/// Struct of SLIC cluster/superpixel.
///
/// Fields `x`, `y`, `l`, `a`, `b`, `num_members` are updated by `slic::update()`. The scales are
/// fixed when the cluster is seeded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cluster {
    /// x position of center (column, may be fractional)
    pub x: f32,
    /// y position of center
    pub y: f32,
    /// Average L color of cluster
    pub l: f32,
    /// Average a color of cluster
    pub a: f32,
    /// Average b color of cluster
    pub b: f32,
    /// Normalization of the squared color distance
    pub color_scale: f32,
    /// Normalization of the squared spatial distance
    pub spatial_scale: f32,
    /// Number of cluster (used in assignment, equals its index)
    pub number: u32,
    /// Number of pixels assigned in the last update
    pub num_members: u32,
}

impl Default for Cluster {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            l: 0.0,
            a: 0.0,
            b: 0.0,
            color_scale: 1.0,
            spatial_scale: 1.0,
            number: u32::MAX,
            num_members: 0,
        }
    }
}

/// Half-open pixel window `[left, right) x [top, bottom)` searched by one cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SearchWindow {
    pub top: usize,
    pub bottom: usize,
    pub left: usize,
    pub right: usize,
}

impl SearchWindow {
    pub fn is_empty(&self) -> bool {
        self.top >= self.bottom || self.left >= self.right
    }
}

impl Cluster {
    /// Position and color as one vector, the quantity the residual is measured on.
    pub fn center(&self) -> [f32; 5] {
        [self.x, self.y, self.l, self.a, self.b]
    }

    /// Window of `2S x 2S` pixels around the rounded center, clipped to the image.
    #[inline(always)]
    pub(crate) fn search_window(
        &self,
        width: usize,
        height: usize,
        search_region_size: usize,
    ) -> SearchWindow {
        let s = search_region_size as i64;
        let cx = self.x.round() as i64;
        let cy = self.y.round() as i64;
        let clip = |v: i64, max: usize| v.clamp(0, max as i64) as usize;
        SearchWindow {
            top: clip(cy - s, height),
            bottom: clip(cy + s, height),
            left: clip(cx - s, width),
            right: clip(cx + s, width),
        }
    }
}
