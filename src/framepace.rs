use std::time::{Duration, Instant};

pub struct Framepacer {
    frame_start: Instant,
    frametime: Duration,
}

impl Framepacer {
    pub fn new() -> Self {
        Self {
            frame_start: Instant::now(),
            frametime: Duration::ZERO,
        }
    }

    /// Restarts the clock so the next frame doesn't count time spent before it.
    pub fn reset(&mut self) {
        self.frame_start = Instant::now();
        self.frametime = Duration::ZERO;
    }

    /// Duration of the last complete frame
    pub fn frametime(&self) -> Duration {
        self.frametime
    }

    pub fn framerate(&self) -> f32 {
        1.0 / self.frametime().as_secs_f32()
    }

    /// Starts a new frame and returns the time elapsed since the previous one began.
    pub fn begin_frame(&mut self) -> Duration {
        let now = Instant::now();
        self.frametime = now - self.frame_start;
        self.frame_start = now;

        self.frametime
    }

    pub fn end_frame(&mut self, limit_frametime: Option<Duration>) {
        let Some(limit) = limit_frametime.filter(|limit| !limit.is_zero()) else {
            return;
        };

        const ACCURACY: Duration = Duration::from_micros(100);
        let sleep_time = limit
            .saturating_sub(self.frame_start.elapsed())
            .saturating_sub(ACCURACY);

        if !sleep_time.is_zero() {
            std::thread::sleep(sleep_time);
        }

        while self.frame_start.elapsed() < limit {
            std::thread::yield_now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_frame_measures_time_since_previous_frame() {
        let mut framepace = Framepacer::new();
        framepace.begin_frame();

        std::thread::sleep(Duration::from_millis(5));
        let elapsed = framepace.begin_frame();

        assert!(elapsed >= Duration::from_millis(5));
        assert_eq!(framepace.frametime(), elapsed);
    }

    #[test]
    fn first_frame_after_reset_ignores_setup_time() {
        let mut framepace = Framepacer::new();
        std::thread::sleep(Duration::from_millis(300));
        framepace.reset();

        assert_eq!(framepace.frametime(), Duration::ZERO);
        assert!(framepace.begin_frame() < Duration::from_millis(100));
    }

    #[test]
    fn end_frame_waits_for_the_limit() {
        let mut framepace = Framepacer::new();
        framepace.begin_frame();
        framepace.end_frame(Some(Duration::from_millis(20)));

        let elapsed = framepace.begin_frame();
        assert!(elapsed >= Duration::from_millis(20));
        assert!(framepace.framerate() <= 50.5);
    }

    #[test]
    fn unlimited_frames_do_not_wait() {
        let mut framepace = Framepacer::new();
        framepace.begin_frame();
        framepace.end_frame(None);
        framepace.end_frame(Some(Duration::ZERO));

        assert!(framepace.begin_frame() < Duration::from_secs(1));
    }
}
