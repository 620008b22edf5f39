use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::particle::ParticleConfig;

/// A particle fountain that follows the mouse cursor
#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// Total particles in the pool
    #[arg(default_value_t = 10_000)]
    pub particles: u32,

    /// Limit the framerate
    ///
    /// if unset (or `0`) frames are rendered as fast as possible
    #[arg(short, long)]
    pub framerate: Option<u32>,

    #[arg(short, long, value_enum, default_value_t = Variant::Rainbow)]
    pub variant: Variant,

    /// Seed for the particle random generator, random if unset
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Window width in pixels
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = 600)]
    pub height: u32,
}

impl Args {
    pub fn frame_limit(&self) -> Option<Duration> {
        self.framerate
            .filter(|&fps| fps > 0)
            .map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Variant {
    /// Randomly colored particles, `Escape` closes the window
    Rainbow,
    /// White particles, only the close button quits
    Plain,
}

impl Variant {
    pub fn particle_config(self) -> ParticleConfig {
        ParticleConfig {
            randomize_color: self == Variant::Rainbow,
        }
    }

    pub fn escape_closes(self) -> bool {
        self == Variant::Rainbow
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["particle_fountain"]).unwrap();

        assert_eq!(args.particles, 10_000);
        assert_eq!(args.variant, Variant::Rainbow);
        assert_eq!((args.width, args.height), (800, 600));
        assert_eq!(args.seed, None);
        assert_eq!(args.frame_limit(), None);
    }

    #[test]
    fn plain_variant_with_framerate() {
        let args = Args::try_parse_from([
            "particle_fountain",
            "500",
            "--variant",
            "plain",
            "-f",
            "50",
            "--seed",
            "42",
        ])
        .unwrap();

        assert_eq!(args.particles, 500);
        assert!(!args.variant.particle_config().randomize_color);
        assert!(!args.variant.escape_closes());
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.frame_limit(), Some(Duration::from_millis(20)));
    }

    #[test]
    fn zero_framerate_is_unlimited() {
        let args = Args::try_parse_from(["particle_fountain", "-f", "0"]).unwrap();
        assert_eq!(args.frame_limit(), None);
    }

    #[test]
    fn rejects_unknown_variant() {
        assert!(Args::try_parse_from(["particle_fountain", "--variant", "sparkly"]).is_err());
    }
}
