use std::time::{Duration, Instant};

#[derive(Copy, Clone, Debug)]
pub struct Stopwatch {
    duration: Duration,
    last_instant: Instant,
    is_running: bool,
}

impl Stopwatch {
    pub fn new() -> Stopwatch {
        Stopwatch {
            duration: Duration::from_secs(0),
            last_instant: Instant::now(),
            is_running: false,
        }
    }

    pub fn start(&mut self) {
        self.update_time();
        self.is_running = true;
    }

    pub fn pause(&mut self) {
        self.update_time();
        self.is_running = false;
    }

    /// Elapsed running time in seconds.
    pub fn read(&mut self) -> f64 {
        self.update_time();
        self.duration.as_secs_f64()
    }

    fn update_time(&mut self) {
        let now = Instant::now();

        if self.is_running {
            self.duration += now - self.last_instant;
        }

        self.last_instant = now;
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Stopwatch::new()
    }
}
