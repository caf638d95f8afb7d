//! The logical simulation clock.
//!
//! Advances one integer second per `FixedUpdate` tick (1 Hz) while a run is
//! active and stops itself at the horizon. It is the sole trigger for
//! consulting the dispatch schedule; continuous vehicle interpolation is
//! driven separately by the render tick, so spawn timing stays accurate even
//! when the frame rate varies.

use bevy::prelude::*;

#[derive(Resource, Debug, Clone, Default)]
pub struct SimClock {
    /// Current simulated second of the run.
    pub second: u32,
    /// Total run duration in simulated seconds.
    pub horizon: u32,
    /// Whether the clock is still advancing. In-flight vehicles keep moving
    /// after this goes false; only spawning ends.
    pub running: bool,
}

impl SimClock {
    pub fn start(&mut self, horizon: u32) {
        self.second = 0;
        self.horizon = horizon;
        self.running = horizon > 0;
    }

    pub fn stop(&mut self) {
        self.second = 0;
        self.horizon = 0;
        self.running = false;
    }

    pub fn tick(&mut self) {
        if !self.running {
            return;
        }
        self.second += 1;
        if self.second >= self.horizon {
            self.running = false;
            info!("simulation clock reached horizon at {}s", self.horizon);
        }
    }
}

pub fn tick_sim_clock(mut clock: ResMut<SimClock>) {
    clock.tick();
}
