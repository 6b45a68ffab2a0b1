// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Point;
use typeblock_options::BlockOption;

/// The floating text input and its suggestion list, as drawn by the host.
///
/// The session decides what to show; implementations only present it and report
/// whether they are on screen.
pub trait FloatingInput {
    /// Opens the input at `at`, in screen coordinates.
    fn show(&mut self, at: Point);

    /// Replaces the suggestion list.
    fn set_options(&mut self, options: &[BlockOption]);

    /// Closes the input.
    fn hide(&mut self);

    /// Returns `true` while the input is on screen.
    fn is_visible(&self) -> bool;
}

/// A [`FloatingInput`] that only records what it was asked to present.
///
/// Useful for hosts that draw the list from [`Session::options`](crate::Session::options)
/// themselves, and in tests.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeadlessInput {
    /// Whether the input is open.
    pub visible: bool,
    /// Where it was last opened.
    pub anchor: Option<Point>,
    /// Last list presented.
    pub options: Vec<BlockOption>,
    /// How many times it was hidden while open.
    pub hide_count: usize,
}

impl FloatingInput for HeadlessInput {
    fn show(&mut self, at: Point) {
        self.visible = true;
        self.anchor = Some(at);
    }

    fn set_options(&mut self, options: &[BlockOption]) {
        self.options = options.to_vec();
    }

    fn hide(&mut self) {
        if self.visible {
            self.visible = false;
            self.hide_count += 1;
        }
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}
