//! Aspect-preserving "contain" fit of a world rectangle into the canvas.

use serde::{Deserialize, Serialize};

use crate::viewport::Rect;

/// Camera parameters handed to the renderer each frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraFit {
    /// World units per canvas pixel.
    pub zoom: f32,
    pub center_x: f32,
    pub center_y: f32,
}

/// Scale `(source_w, source_h)` uniformly so it fits inside the target.
/// The binding dimension is the width when the target is relatively taller
/// than the source, the height otherwise.
pub fn scale_to_fit(source_w: f32, source_h: f32, target_w: f32, target_h: f32) -> (f32, f32) {
    let target_ratio = target_h / target_w;
    let source_ratio = source_h / source_w;
    let scale = if target_ratio > source_ratio {
        target_w / source_w
    } else {
        target_h / source_h
    };
    (source_w * scale, source_h * scale)
}

/// Frame `viewport` on a `canvas_w` x `canvas_h` canvas.
///
/// Degenerate inputs (empty viewport or canvas) keep the centre and fall back
/// to a zoom of 1 instead of producing NaN or infinity.
pub fn fit(viewport: &Rect, canvas_w: f32, canvas_h: f32) -> CameraFit {
    let (center_x, center_y) = viewport.center();
    let (scaled_w, _) = scale_to_fit(viewport.width, viewport.height, canvas_w, canvas_h);
    let zoom = viewport.width / scaled_w;
    CameraFit {
        zoom: if zoom.is_finite() && zoom > 0.0 {
            zoom
        } else {
            1.0
        },
        center_x,
        center_y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_viewport_on_square_canvas_binds_width() {
        // target ratio 1.0 > source ratio 0.5: width binds, scale 2.
        let cam = fit(&Rect::new(0.0, 0.0, 200.0, 100.0), 400.0, 400.0);
        assert_eq!(scale_to_fit(200.0, 100.0, 400.0, 400.0), (400.0, 200.0));
        assert_eq!(cam.zoom, 0.5);
        assert_eq!((cam.center_x, cam.center_y), (100.0, 50.0));
    }

    #[test]
    fn tall_viewport_binds_height() {
        let cam = fit(&Rect::new(-50.0, -100.0, 100.0, 400.0), 400.0, 400.0);
        assert_eq!(cam.zoom, 1.0);
        assert_eq!((cam.center_x, cam.center_y), (0.0, 100.0));
        let (w, h) = scale_to_fit(100.0, 400.0, 800.0, 200.0);
        assert_eq!((w, h), (50.0, 200.0));
    }

    #[test]
    fn fitted_size_never_exceeds_canvas() {
        for (w, h, cw, ch) in [
            (10.0, 30.0, 640.0, 480.0),
            (300.0, 20.0, 640.0, 480.0),
            (1.0, 1.0, 1920.0, 1080.0),
        ] {
            let (sw, sh) = scale_to_fit(w, h, cw, ch);
            assert!(sw <= cw + 1e-3 && sh <= ch + 1e-3);
            assert!((sw - cw).abs() < 1e-3 || (sh - ch).abs() < 1e-3);
        }
    }

    #[test]
    fn degenerate_viewport_falls_back_to_unit_zoom() {
        let cam = fit(&Rect::new(5.0, 5.0, 0.0, 0.0), 400.0, 300.0);
        assert_eq!(cam.zoom, 1.0);
        assert_eq!((cam.center_x, cam.center_y), (5.0, 5.0));
    }
}
