use glam::{Affine2, Vec2};

/// The world rectangle shown in the window, anchored at the top left corner
/// with y pointing down.
///
/// The size is fixed when the window opens, so resizing the window stretches
/// the scene instead of revealing more of it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct View {
    pub size: Vec2,
}

impl View {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Vec2::new(width as f32, height as f32),
        }
    }

    pub fn map_pixel_to_coords(&self, pixel: Vec2, window_size: Vec2) -> Vec2 {
        pixel * self.size / window_size.max(Vec2::ONE)
    }

    /// World to clip space
    pub fn projection(&self) -> Affine2 {
        let size = self.size.max(Vec2::ONE);
        Affine2::from_scale_angle_translation(
            Vec2::new(2.0 / size.x, -2.0 / size.y),
            0.0,
            Vec2::new(-1.0, 1.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixels_map_one_to_one_at_the_initial_size() {
        let view = View::new(800, 600);
        let window = Vec2::new(800.0, 600.0);

        assert_eq!(
            view.map_pixel_to_coords(Vec2::new(123.0, 456.0), window),
            Vec2::new(123.0, 456.0)
        );
    }

    #[test]
    fn pixels_are_rescaled_after_a_resize() {
        let view = View::new(800, 600);
        let window = Vec2::new(1600.0, 300.0);

        assert_eq!(
            view.map_pixel_to_coords(Vec2::new(400.0, 150.0), window),
            Vec2::new(200.0, 300.0)
        );
    }

    #[test]
    fn minimized_window_does_not_divide_by_zero() {
        let view = View::new(800, 600);
        let coords = view.map_pixel_to_coords(Vec2::new(1.0, 1.0), Vec2::ZERO);

        assert!(coords.is_finite());
    }

    #[test]
    fn projection_maps_corners_to_clip_space() {
        let projection = View::new(800, 600).projection();

        assert!(projection
            .transform_point2(Vec2::ZERO)
            .abs_diff_eq(Vec2::new(-1.0, 1.0), 1e-6));
        assert!(projection
            .transform_point2(Vec2::new(800.0, 600.0))
            .abs_diff_eq(Vec2::new(1.0, -1.0), 1e-6));
        assert!(projection
            .transform_point2(Vec2::new(400.0, 300.0))
            .abs_diff_eq(Vec2::ZERO, 1e-6));
    }
}
