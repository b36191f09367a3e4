//! The frame loop as an explicit scheduler.
//!
//! [`FrameLoop`] decides whether a frame may run; [`AnimationDriver`] ties it
//! to an [`AnimationEngine`]. Neither needs a window, so the whole animation
//! can be stepped frame by frame from tests.

use crate::{animation::engine::AnimationEngine, data_structures::instance::InstanceSets};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Cancelled,
}

#[derive(Debug)]
pub struct FrameLoop {
    state: LoopState,
    frames: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            state: LoopState::Idle,
            frames: 0,
        }
    }

    /// Idle loops start running; a cancelled loop never restarts.
    pub fn start(&mut self) {
        if self.state == LoopState::Idle {
            self.state = LoopState::Running;
        }
    }

    /// Returns `true` only for the call that actually cancelled the loop.
    pub fn cancel(&mut self) -> bool {
        if self.state == LoopState::Cancelled {
            return false;
        }
        self.state = LoopState::Cancelled;
        true
    }

    /// Whether the next frame may run; counts the frames that do.
    pub fn begin_frame(&mut self) -> bool {
        if self.state != LoopState::Running {
            return false;
        }
        self.frames += 1;
        true
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct AnimationDriver {
    frame_loop: FrameLoop,
    engine: AnimationEngine,
}

impl AnimationDriver {
    pub fn new(engine: AnimationEngine) -> Self {
        Self {
            frame_loop: FrameLoop::new(),
            engine,
        }
    }

    pub fn start(&mut self) {
        self.frame_loop.start();
    }

    /// Runs one frame at scene time `t`. Returns `false`, leaving the
    /// entities untouched, if the loop is not running.
    pub fn frame(&mut self, t: f32) -> bool {
        if !self.frame_loop.begin_frame() {
            return false;
        }
        self.engine.tick(t);
        true
    }

    pub fn cancel(&mut self) -> bool {
        self.frame_loop.cancel()
    }

    pub fn collect(&self, out: &mut InstanceSets) {
        self.engine.collect(out);
    }

    pub fn engine(&self) -> &AnimationEngine {
        &self.engine
    }

    pub fn frame_loop(&self) -> &FrameLoop {
        &self.frame_loop
    }
}
