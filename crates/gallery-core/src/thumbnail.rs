//! Thumbnail sizing policy.

use std::sync::Arc;

use gallery_blob::{BlobResult, Dimensions, ImageTransformer};
use tracing::debug;

/// Target size for an image whose longer side exceeds `cap`.
///
/// Returns `None` when the image already fits. Otherwise both sides are
/// scaled by the same factor so the longer side equals `cap`; the shorter
/// side is rounded to the nearest pixel and never drops below one.
pub fn fit_within(dims: Dimensions, cap: u32) -> Option<Dimensions> {
    let (w, h) = (dims.width, dims.height);
    if w <= cap && h <= cap {
        return None;
    }
    let scale = |short: u32, long: u32| -> u32 {
        let (short, long, cap) = (short as u64, long as u64, cap as u64);
        ((short * cap + long / 2) / long).clamp(1, cap) as u32
    };
    if w >= h {
        Some(Dimensions::new(cap, scale(h, w)))
    } else {
        Some(Dimensions::new(scale(w, h), cap))
    }
}

/// Applies [`fit_within`] through an [`ImageTransformer`].
#[derive(Clone)]
pub struct Thumbnailer {
    transformer: Arc<dyn ImageTransformer>,
    cap: u32,
}

impl Thumbnailer {
    pub fn new(transformer: Arc<dyn ImageTransformer>, cap: u32) -> Self {
        Self { transformer, cap }
    }

    /// Bytes to publish for a staged image: resized if too large, otherwise
    /// an unchanged copy.
    pub fn prepare(&self, bytes: &[u8]) -> BlobResult<Vec<u8>> {
        let dims = self.transformer.dimensions(bytes)?;
        match fit_within(dims, self.cap) {
            Some(target) => {
                debug!(
                    from_w = dims.width,
                    from_h = dims.height,
                    to_w = target.width,
                    to_h = target.height,
                    "resizing thumbnail"
                );
                self.transformer.resize(bytes, target)
            }
            None => Ok(bytes.to_vec()),
        }
    }
}

impl std::fmt::Debug for Thumbnailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Thumbnailer").field("cap", &self.cap).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_blob::{RawImage, RawImageTransformer};
    use proptest::prelude::*;

    fn thumbnailer() -> Thumbnailer {
        Thumbnailer::new(Arc::new(RawImageTransformer), 200)
    }

    #[test]
    fn wide_image_is_capped() {
        assert_eq!(
            fit_within(Dimensions::new(400, 100), 200),
            Some(Dimensions::new(200, 50))
        );
    }

    #[test]
    fn tall_image_is_capped() {
        assert_eq!(
            fit_within(Dimensions::new(100, 1000), 200),
            Some(Dimensions::new(20, 200))
        );
    }

    #[test]
    fn one_oversized_side_is_enough() {
        assert_eq!(
            fit_within(Dimensions::new(201, 10), 200),
            Some(Dimensions::new(200, 10))
        );
    }

    #[test]
    fn small_image_fits() {
        assert_eq!(fit_within(Dimensions::new(150, 150), 200), None);
        assert_eq!(fit_within(Dimensions::new(200, 200), 200), None);
    }

    #[test]
    fn sliver_keeps_one_pixel() {
        assert_eq!(
            fit_within(Dimensions::new(10_000, 1), 200),
            Some(Dimensions::new(200, 1))
        );
    }

    #[test]
    fn prepare_copies_small_images_verbatim() {
        let bytes = RawImage::solid(150, 150, [1, 2, 3]).encode();
        assert_eq!(thumbnailer().prepare(&bytes).unwrap(), bytes);
    }

    #[test]
    fn prepare_resizes_large_images() {
        let bytes = RawImage::solid(400, 100, [1, 2, 3]).encode();
        let out = thumbnailer().prepare(&bytes).unwrap();
        let img = RawImage::decode(&out).unwrap();
        assert_eq!(img.dimensions(), Dimensions::new(200, 50));
    }

    #[test]
    fn prepare_rejects_non_images() {
        assert!(thumbnailer().prepare(b"not an image").is_err());
    }

    proptest! {
        #[test]
        fn policy_caps_and_keeps_aspect(w in 1u32..5000, h in 1u32..5000, cap in 1u32..500) {
            match fit_within(Dimensions::new(w, h), cap) {
                None => prop_assert!(w <= cap && h <= cap),
                Some(t) => {
                    prop_assert!(w > cap || h > cap);
                    prop_assert_eq!(t.larger_side(), cap);
                    prop_assert!(t.width >= 1 && t.height >= 1);
                    let (long, short, t_short) = if w >= h {
                        (w, h, t.height)
                    } else {
                        (h, w, t.width)
                    };
                    let exact = short as f64 * cap as f64 / long as f64;
                    prop_assert!(t_short == 1 || (t_short as f64 - exact).abs() <= 0.5 + 1e-9);
                }
            }
        }
    }
}
