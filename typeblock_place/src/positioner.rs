// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Vec2};
use typeblock_host::Viewport;

/// Default diagonal offset between blocks created at the same screen point.
pub const DEFAULT_STACK_STEP: f64 = 20.0;

/// Where new blocks are dropped.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum Positioning {
    /// At the pointer.
    #[default]
    Mouse,
    /// At a fixed offset, in screen units, from the surface origin.
    Fixed(Vec2),
}

/// Computes drop points in workspace coordinates.
///
/// Repeated placements at the same screen point are pushed diagonally by a
/// growing offset so blocks do not land exactly on top of each other. Any other
/// screen point resets the offset.
///
/// ```rust
/// use kurbo::{Point, Vec2};
/// use typeblock_host::Viewport;
/// use typeblock_place::{Positioner, Positioning};
///
/// let vp = Viewport::new(Vec2::new(100.0, 0.0), 2.0);
/// let mut pos = Positioner::new(Positioning::Mouse);
///
/// assert_eq!(pos.drop_point(&vp, Point::new(300.0, 200.0)), Point::new(100.0, 100.0));
/// assert_eq!(pos.drop_point(&vp, Point::new(300.0, 200.0)), Point::new(120.0, 120.0));
/// assert_eq!(pos.drop_point(&vp, Point::new(302.0, 200.0)), Point::new(101.0, 100.0));
/// ```
#[derive(Clone, Debug)]
pub struct Positioner {
    mode: Positioning,
    step: f64,
    last_screen: Option<Point>,
    stacked: u32,
}

impl Positioner {
    /// Creates a positioner with the default stacking step.
    #[must_use]
    pub fn new(mode: Positioning) -> Self {
        Self {
            mode,
            step: DEFAULT_STACK_STEP,
            last_screen: None,
            stacked: 0,
        }
    }

    /// Sets the diagonal stacking step, in workspace units.
    #[must_use]
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    /// Positioning mode.
    #[must_use]
    pub fn mode(&self) -> Positioning {
        self.mode
    }

    /// Screen point a placement uses for a given pointer position.
    #[must_use]
    pub fn screen_point(&self, pointer: Point) -> Point {
        match self.mode {
            Positioning::Mouse => pointer,
            Positioning::Fixed(offset) => Point::ZERO + offset,
        }
    }

    /// Workspace point for the next block, advancing the stacking offset.
    pub fn drop_point(&mut self, viewport: &Viewport, pointer: Point) -> Point {
        let screen = self.screen_point(pointer);
        if self.last_screen == Some(screen) {
            self.stacked += 1;
        } else {
            self.stacked = 0;
            self.last_screen = Some(screen);
        }
        let offset = self.step * f64::from(self.stacked);
        viewport.screen_to_workspace_point(screen) + Vec2::new(offset, offset)
    }

    /// Forgets the last placement.
    pub fn reset(&mut self) {
        self.last_screen = None;
        self.stacked = 0;
    }
}
