//! Backend independent drawing types shared by the particle pool and the renderer

use glam::{Affine2, Vec2};

#[repr(C)]
#[derive(bytemuck::Pod, bytemuck::Zeroable, Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    pub position: Vec2,
    pub color: [u8; 4],
}

impl Vertex {
    pub const WHITE: [u8; 4] = [255, 255, 255, 255];
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            color: Self::WHITE,
        }
    }
}

/// Position, rotation (in degrees), scale and origin of an object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalTransform {
    pub position: Vec2,
    pub rotation: f32,
    pub scale: Vec2,
    pub origin: Vec2,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
            origin: Vec2::ZERO,
        }
    }
}

impl LocalTransform {
    /// The origin is applied first, then scale, rotation and position.
    pub fn matrix(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(self.scale, self.rotation.to_radians(), self.position)
            * Affine2::from_translation(-self.origin)
    }
}

pub trait Transformable {
    fn local_transform(&self) -> &LocalTransform;
    fn local_transform_mut(&mut self) -> &mut LocalTransform;

    fn transform(&self) -> Affine2 {
        self.local_transform().matrix()
    }

    fn set_position(&mut self, position: Vec2) {
        self.local_transform_mut().position = position;
    }

    fn set_rotation(&mut self, degrees: f32) {
        self.local_transform_mut().rotation = degrees.rem_euclid(360.0);
    }

    fn set_scale(&mut self, scale: Vec2) {
        self.local_transform_mut().scale = scale;
    }

    fn set_origin(&mut self, origin: Vec2) {
        self.local_transform_mut().origin = origin;
    }
}

#[derive(Clone, Copy, Default)]
pub struct RenderStates<'a> {
    pub transform: Affine2,
    pub texture: Option<&'a wgpu::TextureView>,
}

pub trait RenderTarget {
    /// Submit `vertices` as unconnected points.
    fn draw_points(&mut self, vertices: &[Vertex], states: &RenderStates<'_>);

    fn draw<D: Drawable>(&mut self, drawable: &D)
    where
        Self: Sized,
    {
        drawable.draw(self, RenderStates::default());
    }
}

pub trait Drawable {
    fn draw(&self, target: &mut dyn RenderTarget, states: RenderStates<'_>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_transform_is_identity() {
        assert_eq!(LocalTransform::default().matrix(), Affine2::IDENTITY);
    }

    #[test]
    fn transform_applies_origin_scale_rotation_then_position() {
        let transform = LocalTransform {
            position: Vec2::new(10.0, 20.0),
            rotation: 90.0,
            scale: Vec2::splat(2.0),
            origin: Vec2::new(1.0, 0.0),
        };

        let point = transform.matrix().transform_point2(Vec2::new(2.0, 0.0));
        assert!(point.abs_diff_eq(Vec2::new(10.0, 22.0), 1e-4), "{point}");
    }

    struct Sprite(LocalTransform);

    impl Transformable for Sprite {
        fn local_transform(&self) -> &LocalTransform {
            &self.0
        }

        fn local_transform_mut(&mut self) -> &mut LocalTransform {
            &mut self.0
        }
    }

    #[test]
    fn rotation_wraps_into_a_full_turn() {
        let mut sprite = Sprite(LocalTransform::default());
        sprite.set_rotation(-90.0);
        assert_eq!(sprite.local_transform().rotation, 270.0);

        sprite.set_rotation(450.0);
        assert_eq!(sprite.local_transform().rotation, 90.0);
    }

    #[test]
    fn setters_feed_the_transform() {
        let mut sprite = Sprite(LocalTransform::default());
        sprite.set_position(Vec2::new(10.0, 20.0));
        sprite.set_scale(Vec2::new(2.0, 3.0));
        sprite.set_origin(Vec2::new(1.0, 1.0));

        assert_eq!(
            *sprite.local_transform(),
            LocalTransform {
                position: Vec2::new(10.0, 20.0),
                rotation: 0.0,
                scale: Vec2::new(2.0, 3.0),
                origin: Vec2::new(1.0, 1.0),
            }
        );

        // origin lands on the position, one unit away is scaled per axis
        let transform = sprite.transform();
        assert!(transform
            .transform_point2(Vec2::new(1.0, 1.0))
            .abs_diff_eq(Vec2::new(10.0, 20.0), 1e-5));
        assert!(transform
            .transform_point2(Vec2::new(2.0, 2.0))
            .abs_diff_eq(Vec2::new(12.0, 23.0), 1e-5));
    }
}
