/// Single-color RGBA image.
pub fn solid_rgba(width: usize, height: usize, color: [u8; 4]) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    color.repeat(width * height)
}

/// High-contrast RGBA checkerboard; the top-left cell is dark.
pub fn checkerboard_rgba(width: usize, height: usize, cell: usize) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    assert!(cell > 0, "cell size must be positive");

    let mut img = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for x in 0..width {
            let val = if (x / cell + y / cell) & 1 == 0 { 32u8 } else { 220u8 };
            img.extend_from_slice(&[val, val, val, 255]);
        }
    }
    img
}

/// Horizontal and vertical color ramps, no flat areas.
pub fn gradient_rgba(width: usize, height: usize) -> Vec<u8> {
    let mut img = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for x in 0..width {
            img.extend_from_slice(&[
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                ((x + y) * 127 / (width + height)) as u8,
                255,
            ]);
        }
    }
    img
}

/// Empty mask with the given stroke pixels painted in.
pub fn mask_with_strokes(width: usize, height: usize, strokes: &[(usize, usize, [u8; 4])]) -> Vec<u8> {
    let mut mask = vec![0u8; width * height * 4];
    for &(x, y, color) in strokes {
        let idx = (y * width + x) * 4;
        mask[idx..idx + 4].copy_from_slice(&color);
    }
    mask
}
