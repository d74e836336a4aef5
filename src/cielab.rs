use tables::{GAMMA_TBL, RGB_TO_XYZ};

pub(crate) mod tables {
    use static_init::dynamic;
    /// Linear RGB -> XYZ, row-major. Rows sum to one, so white maps to (1, 1, 1).
    pub const RGB_TO_XYZ: [f32; 9] = [
        0.488718, 0.31068, 0.200602, 0.176204, 0.812985, 0.0108109, 0.0, 0.0102048, 0.989795,
    ];
    pub const LAB_EPSILON: f32 = 0.008856;
    pub const LAB_KAPPA: f32 = 7.787_069;
    pub const LAB_OFFSET: f32 = 16.0 / 116.0;
    #[dynamic(65535)]
    pub static GAMMA_TBL: [f32; 256] = core::array::from_fn(|i| calculate_gamma(i as u8));

    fn calculate_gamma(a: u8) -> f32 {
        let v: f64 = a as f64 / 255.0;
        v.powf(2.2) as f32
    }
}

#[inline(always)]
fn lab_nonlin(t: f32) -> f32 {
    if t > tables::LAB_EPSILON {
        t.cbrt()
    } else {
        tables::LAB_KAPPA * t + tables::LAB_OFFSET
    }
}

/// Convert one RGBA8 pixel to XYZ. Alpha is ignored.
#[inline(always)]
pub fn rgba_to_xyz_pixel(rgba: &[u8]) -> [f32; 3] {
    let r = unsafe { GAMMA_TBL[rgba[0] as usize] };
    let g = unsafe { GAMMA_TBL[rgba[1] as usize] };
    let b = unsafe { GAMMA_TBL[rgba[2] as usize] };
    let m = &RGB_TO_XYZ;
    [
        m[0] * r + m[1] * g + m[2] * b,
        m[3] * r + m[4] * g + m[5] * b,
        m[6] * r + m[7] * g + m[8] * b,
    ]
}

/// Convert XYZ (white point normalized to 1) to CIELAB.
///
/// The output range is for:
///  - L - from 0 to 100
///  - a, b - roughly from -128 to 128
#[inline(always)]
pub fn xyz_to_cielab(xyz: [f32; 3]) -> [f32; 3] {
    let fx = lab_nonlin(xyz[0]);
    let fy = lab_nonlin(xyz[1]);
    let fz = lab_nonlin(xyz[2]);
    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

/// Convert pixel in RGBA8 to Lab.
#[inline(always)]
pub fn rgba_to_cielab_pixel(rgba: &[u8]) -> [f32; 3] {
    xyz_to_cielab(rgba_to_xyz_pixel(rgba))
}
