use std::f32::consts::TAU;
use std::time::Duration;

use glam::Vec2;
use rand::{rngs::StdRng, Rng};

use crate::graphics::{Drawable, LocalTransform, RenderStates, RenderTarget, Transformable, Vertex};

/// Denominator of the fade ratio, not an upper bound on particle lifetimes.
pub const MAX_LIFETIME: Duration = Duration::from_secs(3);

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle {
    pub velocity: Vec2,
    pub lifetime: Duration,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParticleConfig {
    /// Give each particle a random color whenever it respawns
    pub randomize_color: bool,
}

/// A fixed pool of particles spawned from a single emitter.
///
/// `particles[i]` always describes `vertices[i]`.
pub struct ParticleSystem<R = StdRng> {
    particles: Vec<Particle>,
    vertices: Vec<Vertex>,
    max_lifetime: Duration,
    emitter: Vec2,

    config: ParticleConfig,
    transform: LocalTransform,
    rng: R,
}

impl<R: Rng> ParticleSystem<R> {
    pub fn new(count: usize, config: ParticleConfig, rng: R) -> Self {
        Self {
            particles: vec![Particle::default(); count],
            vertices: vec![Vertex::default(); count],
            max_lifetime: MAX_LIFETIME,
            emitter: Vec2::ZERO,

            config,
            transform: LocalTransform::default(),
            rng,
        }
    }

    pub fn set_emitter(&mut self, position: Vec2) {
        self.emitter = position;
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn update(&mut self, elapsed: Duration) {
        let dt = elapsed.as_secs_f32();

        for i in 0..self.particles.len() {
            let particle = &mut self.particles[i];
            particle.lifetime = particle.lifetime.saturating_sub(elapsed);

            if particle.lifetime.is_zero() {
                self.respawn(i);
            }

            let particle = &self.particles[i];
            let vertex = &mut self.vertices[i];
            vertex.position += particle.velocity * dt;

            let ratio = particle.lifetime.as_secs_f32() / self.max_lifetime.as_secs_f32();
            vertex.color[3] = (ratio.clamp(0.0, 1.0) * 255.0) as u8;
        }
    }

    fn respawn(&mut self, index: usize) {
        let angle = self.rng.gen_range(0.0..TAU);
        let speed = self.rng.gen_range(50.0..100.0f32);
        self.particles[index] = Particle {
            velocity: Vec2::from_angle(angle) * speed,
            lifetime: Duration::from_millis(self.rng.gen_range(1000..3000)),
        };

        let vertex = &mut self.vertices[index];
        if self.config.randomize_color {
            vertex.color = [self.rng.gen(), self.rng.gen(), self.rng.gen(), 255];
        }
        vertex.position = self.emitter;
    }
}

impl<R> Transformable for ParticleSystem<R> {
    fn local_transform(&self) -> &LocalTransform {
        &self.transform
    }

    fn local_transform_mut(&mut self) -> &mut LocalTransform {
        &mut self.transform
    }
}

impl<R: Rng> Drawable for ParticleSystem<R> {
    fn draw(&self, target: &mut dyn RenderTarget, mut states: RenderStates<'_>) {
        states.transform = states.transform * self.transform();
        states.texture = None;

        target.draw_points(self.vertices(), &states);
    }
}
