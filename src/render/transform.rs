// RustPixel
// copyright zipxing@hotmail.com 2022～2025

//! # View Projection Module
//!
//! Orthographic projection for the text world space: y spans [-1, 1], x
//! spans [-aspect, aspect] so glyphs keep their proportions in any window.
//! The view is identity.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewProjection {
    /// Column-major
    cols: [[f32; 4]; 4],
}

impl Default for ViewProjection {
    fn default() -> Self {
        Self::identity()
    }
}

impl ViewProjection {
    pub fn identity() -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Right handed orthographic projection with wgpu's [0, 1] depth range
    pub fn ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Self {
        let rl = right - left;
        let tb = top - bottom;
        let fn_ = far - near;
        Self {
            cols: [
                [2.0 / rl, 0.0, 0.0, 0.0],
                [0.0, 2.0 / tb, 0.0, 0.0],
                [0.0, 0.0, -1.0 / fn_, 0.0],
                [-(right + left) / rl, -(top + bottom) / tb, -near / fn_, 1.0],
            ],
        }
    }

    /// x in [-aspect, aspect], y in [-1, 1], z in [-1, 1]
    pub fn for_aspect(aspect: f32) -> Self {
        Self::ortho(-aspect, aspect, -1.0, 1.0, -1.0, 1.0)
    }

    pub fn for_window(width: u32, height: u32) -> Self {
        Self::for_aspect(width as f32 / height as f32)
    }

    /// Convert to 4x4 matrix for WGPU uniforms (column-major order)
    pub fn to_matrix4(&self) -> [[f32; 4]; 4] {
        self.cols
    }

    /// Convert to flat array for uniform buffer
    pub fn to_array(&self) -> [f32; 16] {
        let mut out = [0.0; 16];
        for (i, col) in self.cols.iter().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(col);
        }
        out
    }

    /// Clip space position of a world point (w is always 1 here)
    pub fn transform_point(&self, p: [f32; 3]) -> [f32; 3] {
        let c = &self.cols;
        let mut out = [0.0; 3];
        for (row, v) in out.iter_mut().enumerate() {
            *v = c[0][row] * p[0] + c[1][row] * p[1] + c[2][row] * p[2] + c[3][row];
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-6)
    }

    #[test]
    fn test_window_corners_map_to_clip_edges() {
        let vp = ViewProjection::for_window(800, 600);
        let aspect = 800.0 / 600.0;
        assert!(close(vp.transform_point([aspect, 1.0, 0.0]), [1.0, 1.0, 0.5]));
        assert!(close(vp.transform_point([-aspect, -1.0, 0.0]), [-1.0, -1.0, 0.5]));
        assert!(close(vp.transform_point([0.0, 0.0, 0.0]), [0.0, 0.0, 0.5]));
    }

    #[test]
    fn test_depth_range() {
        let vp = ViewProjection::for_aspect(1.0);
        assert!(close(vp.transform_point([0.0, 0.0, -1.0]), [0.0, 0.0, 1.0]));
        assert!(close(vp.transform_point([0.0, 0.0, 1.0]), [0.0, 0.0, 0.0]));
    }

    #[test]
    fn test_array_is_column_major() {
        let vp = ViewProjection::for_aspect(2.0);
        let a = vp.to_array();
        assert_eq!(a[0], 0.5);
        assert_eq!(a[5], 1.0);
        assert_eq!(a[15], 1.0);
        assert_eq!(&a[12..16], &vp.to_matrix4()[3]);
        assert_eq!(ViewProjection::default(), ViewProjection::identity());
    }
}
