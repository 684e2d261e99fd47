//! Frame-rate normalised animation.
//!
//! The group spin is advanced by `speed / fps` on every displayed frame, so the
//! total rotation per wall-clock second stays close to `speed` whatever the
//! refresh rate of the display is.

use std::f64::consts::TAU;

use crate::scene::{NodeId, Scene};

/// Per-frame increment for an angular `speed` (units per second) at `fps`.
///
/// Very low measured fps yields a large single-frame jump; `fps == inf`
/// (zero elapsed time) yields 0.
#[inline]
pub fn base_speed(fps: f64, speed: f64) -> f64 {
    speed / fps
}

/// Timestamp of the last drawn frame, in milliseconds.
#[derive(Debug, Clone, Copy)]
pub struct FrameTimer {
    last_frame_ms: f64,
}

impl FrameTimer {
    pub fn new(now_ms: f64) -> Self {
        Self {
            last_frame_ms: now_ms,
        }
    }

    pub fn last_frame_ms(&self) -> f64 {
        self.last_frame_ms
    }

    /// Instantaneous fps since the previous tick. Overwrites the stored timestamp.
    pub fn tick(&mut self, now_ms: f64) -> f64 {
        let fps = 1000.0 / (now_ms - self.last_frame_ms);
        self.last_frame_ms = now_ms;
        fps
    }
}

/// Accumulates a Y rotation at a constant angular speed.
#[derive(Debug, Clone, Copy)]
pub struct Spinner {
    speed: f64,
    angle: f64,
}

impl Spinner {
    pub fn new(speed: f64) -> Self {
        Self { speed, angle: 0.0 }
    }

    /// Total angle advanced so far; never wraps.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// The same angle reduced to `[0, 2π)`.
    pub fn wrapped(&self) -> f64 {
        self.angle.rem_euclid(TAU)
    }

    /// Advances by `base_speed(fps, speed)`. A step that is not finite or runs
    /// against the spin direction (clock went backwards) is dropped.
    pub fn advance(&mut self, fps: f64) -> f64 {
        let step = base_speed(fps, self.speed);
        if !step.is_finite() || step * self.speed < 0.0 {
            return 0.0;
        }
        self.angle += step;
        step
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
}

/// The host-independent half of the render loop: time keeping and group spin.
/// Drawing and frame scheduling belong to whoever drives it.
#[derive(Debug)]
pub struct AnimationLoop {
    state: LoopState,
    timer: FrameTimer,
    spinner: Spinner,
    group: NodeId,
}

impl AnimationLoop {
    pub fn new(group: NodeId, speed: f64, now_ms: f64) -> Self {
        Self {
            state: LoopState::Idle,
            timer: FrameTimer::new(now_ms),
            spinner: Spinner::new(speed),
            group,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn spinner(&self) -> &Spinner {
        &self.spinner
    }

    /// Idle -> Running. Returns false if the loop was already running.
    pub fn start(&mut self) -> bool {
        if self.state == LoopState::Running {
            return false;
        }
        self.state = LoopState::Running;
        true
    }

    /// Runs one iteration: measure fps, spin the group, remember `now_ms`.
    /// Returns the measured fps.
    pub fn frame(&mut self, now_ms: f64, scene: &mut Scene) -> f64 {
        debug_assert_eq!(self.state, LoopState::Running);
        let fps = self.timer.tick(now_ms);
        self.spinner.advance(fps);
        scene.node_mut(self.group).transform.rotation.y = self.spinner.wrapped() as f32;
        fps
    }
}
