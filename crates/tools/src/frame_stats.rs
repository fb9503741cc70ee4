use std::collections::VecDeque;

/// Number of samples kept in each history.
pub const HISTORY_LEN: usize = 60;
/// Seconds of frame time averaged into one sample.
pub const SAMPLE_INTERVAL: f32 = 0.1;

/// Rolling framerate and frame-time histories for the editor graphs.
///
/// Frames are accumulated until [`SAMPLE_INTERVAL`] has passed, then the
/// window's average is pushed and the oldest sample dropped.
#[derive(Debug, Clone)]
pub struct FrameStats {
    framerate: VecDeque<f32>,
    frame_ms: VecDeque<f32>,
    elapsed: f32,
    frames: u32,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self {
            framerate: VecDeque::from(vec![0.0; HISTORY_LEN]),
            frame_ms: VecDeque::from(vec![0.0; HISTORY_LEN]),
            elapsed: 0.0,
            frames: 0,
        }
    }
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one frame of `dt` seconds. Returns true when a sample was
    /// pushed.
    pub fn record(&mut self, dt: f32) -> bool {
        if !dt.is_finite() || dt < 0.0 {
            return false;
        }
        self.elapsed += dt;
        self.frames += 1;
        if self.elapsed < SAMPLE_INTERVAL {
            return false;
        }

        let fps = self.frames as f32 / self.elapsed;
        let ms = 1000.0 * self.elapsed / self.frames as f32;
        push_sample(&mut self.framerate, fps);
        push_sample(&mut self.frame_ms, ms);
        tracing::trace!(fps, ms, "frame sample");
        self.elapsed = 0.0;
        self.frames = 0;
        true
    }

    /// Framerate samples, oldest first.
    pub fn framerate(&self) -> &VecDeque<f32> {
        &self.framerate
    }

    /// Frame time samples in milliseconds, oldest first.
    pub fn frame_ms(&self) -> &VecDeque<f32> {
        &self.frame_ms
    }

    pub fn latest_fps(&self) -> f32 {
        self.framerate.back().copied().unwrap_or(0.0)
    }

    pub fn latest_ms(&self) -> f32 {
        self.frame_ms.back().copied().unwrap_or(0.0)
    }

    /// Largest value in a history, for scaling graphs.
    pub fn peak(history: &VecDeque<f32>) -> f32 {
        history.iter().copied().fold(0.0, f32::max)
    }
}

fn push_sample(history: &mut VecDeque<f32>, value: f32) {
    if history.len() == HISTORY_LEN {
        history.pop_front();
    }
    history.push_back(value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histories_have_fixed_length() {
        let mut stats = FrameStats::new();
        assert_eq!(stats.framerate().len(), HISTORY_LEN);
        for _ in 0..1000 {
            stats.record(0.05);
        }
        assert_eq!(stats.framerate().len(), HISTORY_LEN);
        assert_eq!(stats.frame_ms().len(), HISTORY_LEN);
    }

    #[test]
    fn samples_every_interval() {
        let mut stats = FrameStats::new();
        // 60 fps: six frames come to 0.1 s.
        let pushed: Vec<bool> = (0..7).map(|_| stats.record(1.0 / 60.0)).collect();
        assert_eq!(pushed.iter().filter(|p| **p).count(), 1);
        assert!((stats.latest_fps() - 60.0).abs() < 1.0);
        assert!((stats.latest_ms() - 16.67).abs() < 0.5);
    }

    #[test]
    fn long_frame_samples_immediately() {
        let mut stats = FrameStats::new();
        assert!(stats.record(0.5));
        assert!((stats.latest_fps() - 2.0).abs() < 1e-4);
        assert!((stats.latest_ms() - 500.0).abs() < 1e-2);
    }

    #[test]
    fn bad_dt_is_ignored() {
        let mut stats = FrameStats::new();
        assert!(!stats.record(f32::NAN));
        assert!(!stats.record(-1.0));
        assert_eq!(stats.latest_fps(), 0.0);
    }

    #[test]
    fn peak_of_history() {
        let mut stats = FrameStats::new();
        stats.record(0.25);
        stats.record(0.125);
        assert_eq!(FrameStats::peak(stats.framerate()), 8.0);
    }
}
