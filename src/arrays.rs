use crate::cielab::rgba_to_cielab_pixel;
use crate::common::split_length_to_ranges;
use crate::error::DimensionError;
use aligned_vec::{AVec, ConstAlign};
use rayon::current_num_threads;
use rayon::prelude::*;
use std::ops::{Index, IndexMut};

const ALIGN: usize = 64;

#[derive(Debug, Clone)]
pub struct Array2D<T> {
    pub data: AVec<T, ConstAlign<ALIGN>>,
    pub width: usize,
    pub height: usize,
}

impl<T> Array2D<T> {
    pub fn from_fill(value: T, width: usize, height: usize) -> Self
    where
        T: Clone + Copy,
    {
        let data: AVec<T, ConstAlign<ALIGN>> =
            AVec::from_iter(ALIGN, (0..width * height).map(|_| value));
        Self {
            width,
            height,
            data,
        }
    }

    pub fn from_slice(data: &[T], width: usize, height: usize) -> Option<Self>
    where
        T: Clone,
    {
        if data.len() != width * height {
            return None;
        }
        Some(Self {
            width,
            height,
            data: AVec::from_slice(ALIGN, data),
        })
    }

    pub fn fill(&mut self, value: T)
    where
        T: Clone,
    {
        self.data.fill(value)
    }
    #[inline(always)]
    pub fn get_row(&self, row: usize) -> &[T] {
        debug_assert!(row < self.height);
        &self.data[(self.width * row)..(self.width * row + self.width)]
    }
    pub fn get_row_mut(&mut self, row: usize) -> &mut [T] {
        debug_assert!(row < self.height);
        &mut self.data[(self.width * row)..(self.width * row + self.width)]
    }
    #[inline(always)]
    pub fn get_index(&self, x: usize, y: usize) -> usize {
        debug_assert!(self.width > x);
        debug_assert!(self.height > y);
        self.width * y + x
    }
    pub fn as_slice(&self) -> &[T] {
        self.data.as_slice()
    }
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.data.to_vec()
    }
}
impl<T> Index<(usize, usize)> for Array2D<T> {
    type Output = T;
    fn index(&self, (x, y): (usize, usize)) -> &Self::Output {
        &self.data[self.get_index(x, y)]
    }
}
impl<T> IndexMut<(usize, usize)> for Array2D<T> {
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut Self::Output {
        let idx = self.get_index(x, y);
        &mut self.data[idx]
    }
}

/// Borrowed row-major RGBA8 buffer with validated dimensions.
#[derive(Debug, Clone, Copy)]
pub struct RgbaBuffer<'a> {
    pub data: &'a [u8],
    pub width: usize,
    pub height: usize,
}

impl<'a> RgbaBuffer<'a> {
    /// Wrap an image buffer. Fails if a dimension is zero or if the length is not `4 * w * h`.
    pub fn new(data: &'a [u8], width: usize, height: usize) -> Result<Self, DimensionError> {
        Self::named("image", data, width, height)
    }

    /// Same as [`RgbaBuffer::new`] for a stroke mask.
    pub fn mask(data: &'a [u8], width: usize, height: usize) -> Result<Self, DimensionError> {
        Self::named("mask", data, width, height)
    }

    fn named(
        buffer: &'static str,
        data: &'a [u8],
        width: usize,
        height: usize,
    ) -> Result<Self, DimensionError> {
        if width == 0 || height == 0 {
            return Err(DimensionError::Empty { width, height });
        }
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(4))
            .ok_or(DimensionError::Overflow { width, height })?;
        if data.len() != expected {
            return Err(DimensionError::LengthMismatch {
                buffer,
                len: data.len(),
                expected,
                width,
                height,
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    #[inline(always)]
    pub fn num_pixels(&self) -> usize {
        self.width * self.height
    }

    #[inline(always)]
    pub fn get_pixel(&self, x: usize, y: usize) -> &[u8] {
        debug_assert!(self.width > x);
        debug_assert!(self.height > y);
        let idx = (self.width * y + x) * 4;
        &self.data[idx..idx + 4]
    }

    pub fn pixels(&self) -> std::slice::ChunksExact<'a, u8> {
        self.data.chunks_exact(4)
    }
}

/// Image converted to CIELAB, stored as three planes (L, a, b).
#[derive(Debug, Clone)]
pub struct LabImage {
    pub planes: [Array2D<f32>; 3],
    pub width: usize,
    pub height: usize,
}

impl LabImage {
    /// Convert RGBA image to Lab planes. Row bands are converted in parallel.
    pub fn from_rgba(image: &RgbaBuffer) -> Self {
        let width = image.width;
        let height = image.height;
        let mut planes = [
            Array2D::from_fill(0f32, width, height),
            Array2D::from_fill(0f32, width, height),
            Array2D::from_fill(0f32, width, height),
        ];
        let ranges = split_length_to_ranges(height, current_num_threads().min(height));
        {
            let [l_plane, a_plane, b_plane] = &mut planes;
            let mut bands = Vec::with_capacity(ranges.len());
            let (mut l_rest, mut a_rest, mut b_rest): (&mut [f32], &mut [f32], &mut [f32]) = (
                l_plane.data.as_mut_slice(),
                a_plane.data.as_mut_slice(),
                b_plane.data.as_mut_slice(),
            );
            for rows in ranges {
                let len = rows.len() * width;
                let (l, l_tail) = std::mem::take(&mut l_rest).split_at_mut(len);
                let (a, a_tail) = std::mem::take(&mut a_rest).split_at_mut(len);
                let (b, b_tail) = std::mem::take(&mut b_rest).split_at_mut(len);
                (l_rest, a_rest, b_rest) = (l_tail, a_tail, b_tail);
                let input = &image.data[rows.start * width * 4..rows.end * width * 4];
                bands.push((input, l, a, b));
            }
            bands.into_par_iter().for_each(|(input, l, a, b)| {
                for (i, pixel) in input.chunks_exact(4).enumerate() {
                    let lab = rgba_to_cielab_pixel(pixel);
                    l[i] = lab[0];
                    a[i] = lab[1];
                    b[i] = lab[2];
                }
            });
        }
        Self {
            planes,
            width,
            height,
        }
    }

    #[inline(always)]
    pub fn get_pixel(&self, x: usize, y: usize) -> [f32; 3] {
        let idx = self.planes[0].get_index(x, y);
        [
            self.planes[0].data[idx],
            self.planes[1].data[idx],
            self.planes[2].data[idx],
        ]
    }

    /// Rows of all three planes.
    #[inline(always)]
    pub fn get_rows(&self, row: usize) -> [&[f32]; 3] {
        [
            self.planes[0].get_row(row),
            self.planes[1].get_row(row),
            self.planes[2].get_row(row),
        ]
    }
}
