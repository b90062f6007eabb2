// Copyright 2025 the OSM Canvas Authors
// SPDX-License-Identifier: Apache-2.0

//! Coalescing render scheduler.
//!
//! Anything that changes what is on screen calls `invalidate`. A periodic
//! tick starts at most one render per tick, and only when a render is
//! pending and none is running. Invalidations that arrive while a render
//! is running collapse into a single follow-up render.

/// Where the scheduler is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing to do
    Idle,
    /// A render has been requested and will start on the next tick
    Pending,
    /// A render is running
    Rendering,
}

#[derive(Debug, Default)]
pub struct RenderScheduler {
    needs_render: bool,
    rendering: bool,
    frames: u64,
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a render. Idempotent.
    pub fn invalidate(&mut self) {
        self.needs_render = true;
    }

    pub fn phase(&self) -> Phase {
        if self.rendering {
            Phase::Rendering
        } else if self.needs_render {
            Phase::Pending
        } else {
            Phase::Idle
        }
    }

    /// Called once per tick. Returns true if a render should start now,
    /// in which case the caller must call `finish` when it is done.
    pub fn tick(&mut self) -> bool {
        if !self.needs_render || self.rendering {
            return false;
        }
        self.needs_render = false;
        self.rendering = true;
        true
    }

    /// Mark the running render as finished
    pub fn finish(&mut self) {
        if self.rendering {
            self.rendering = false;
            self.frames += 1;
        }
    }

    /// Tick and, if a render is due, run `render` to completion
    pub fn run_frame<R>(&mut self, render: impl FnOnce() -> R) -> Option<R> {
        if !self.tick() {
            return None;
        }
        let result = render();
        self.finish();
        Some(result)
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }
}
