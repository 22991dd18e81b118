//! Uniform (non-stretching) scale fitting.
//!
//! Both functions assume a strictly positive source size. A zero-area source
//! has no meaningful fit; callers check [`Size::is_positive`] first.

use crate::geometry::Size;

/// How a source rectangle is fitted into a destination rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    /// Entire source visible, may letterbox.
    Contain,
    /// Destination fully covered, source may be cropped.
    Cover,
}

impl Fit {
    /// Returns the uniform scale factor for fitting `src` into `dest`.
    #[must_use]
    pub fn scale(self, src: Size, dest: Size) -> f32 {
        match self {
            Self::Contain => contain_scale(src.width, src.height, dest.width, dest.height),
            Self::Cover => cover_scale(src.width, src.height, dest.width, dest.height),
        }
    }
}

/// `min(dest_w / src_w, dest_h / src_h)`.
#[must_use]
pub fn contain_scale(src_w: f32, src_h: f32, dest_w: f32, dest_h: f32) -> f32 {
    debug_assert!(src_w > 0.0 && src_h > 0.0, "contain fit of an empty source");
    (dest_w / src_w).min(dest_h / src_h)
}

/// `max(dest_w / src_w, dest_h / src_h)`.
#[must_use]
pub fn cover_scale(src_w: f32, src_h: f32, dest_w: f32, dest_h: f32) -> f32 {
    debug_assert!(src_w > 0.0 && src_h > 0.0, "cover fit of an empty source");
    (dest_w / src_w).max(dest_h / src_h)
}
