use std::fmt::Display;
use std::time::Duration;

/// Running statistics of frame render times.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameTimes {
    pub count: usize,
    pub min: Duration,
    pub max: Duration,
    pub total: Duration,
}

impl FrameTimes {
    pub fn add_sample(&mut self, value: Duration) {
        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.total += value;
    }

    pub fn average(&self) -> Duration {
        if self.count == 0 {
            Duration::ZERO
        } else {
            self.total / self.count as u32
        }
    }

    pub fn frames_per_second(&self) -> f64 {
        if self.total.is_zero() {
            0.0
        } else {
            self.count as f64 / self.total.as_secs_f64()
        }
    }
}

impl Default for FrameTimes {
    fn default() -> Self {
        FrameTimes {
            count: 0,
            min: Duration::MAX,
            max: Duration::ZERO,
            total: Duration::ZERO,
        }
    }
}

impl Display for FrameTimes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            return write!(f, "no frames");
        }
        write!(
            f,
            "{:.1?} - {:.1?}; avg {:.1?}; {:.1} FPS; {} frames",
            self.min,
            self.max,
            self.average(),
            self.frames_per_second(),
            self.count
        )
    }
}
