// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Affine, Point, Rect, Vec2};

/// Scroll + zoom state of an editing surface.
///
/// `Viewport` maps workspace coordinates (where blocks live) into screen
/// coordinates (where the pointer and the floating input live):
///
/// `screen = workspace * scale + scroll`
///
/// Hosts report their current camera through
/// [`Workspace::viewport`](crate::Workspace::viewport); the placement code only
/// ever converts screen points into workspace points.
#[derive(Clone, Debug)]
pub struct Viewport {
    scale: f64,
    scroll: Vec2,
    min_scale: f64,
    max_scale: f64,
    workspace_to_screen: Affine,
    screen_to_workspace: Affine,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(Vec2::ZERO, 1.0)
    }
}

impl Viewport {
    /// Creates a viewport with the given scroll offset (screen units) and zoom scale.
    ///
    /// Scale is clamped to the range `[1e-3, 1e3]`.
    #[must_use]
    pub fn new(scroll: Vec2, scale: f64) -> Self {
        let mut vp = Self {
            scale: 1.0,
            scroll,
            min_scale: 1e-3,
            max_scale: 1e3,
            workspace_to_screen: Affine::IDENTITY,
            screen_to_workspace: Affine::IDENTITY,
        };
        vp.scale = scale.clamp(vp.min_scale, vp.max_scale);
        vp.rebuild_transforms();
        vp
    }

    /// Returns the current zoom scale.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Returns the current scroll offset in screen units.
    #[must_use]
    pub fn scroll(&self) -> Vec2 {
        self.scroll
    }

    /// Sets the zoom scale, clamping it into the configured range.
    pub fn set_scale(&mut self, scale: f64) {
        let clamped = scale.clamp(self.min_scale, self.max_scale);
        if (self.scale - clamped).abs() < f64::EPSILON {
            return;
        }
        self.scale = clamped;
        self.rebuild_transforms();
    }

    /// Scrolls by a delta in screen units.
    pub fn scroll_by(&mut self, delta: Vec2) {
        if delta == Vec2::ZERO {
            return;
        }
        self.scroll += delta;
        self.rebuild_transforms();
    }

    /// Zooms around an anchor point in screen coordinates.
    ///
    /// The workspace point under the anchor stays under the anchor.
    pub fn zoom_about_screen_point(&mut self, anchor: Point, factor: f64) {
        if factor <= 0.0 {
            return;
        }
        let old_scale = self.scale;
        let new_scale = (old_scale * factor).clamp(self.min_scale, self.max_scale);
        if (new_scale - old_scale).abs() < f64::EPSILON {
            return;
        }

        let anchored = self.screen_to_workspace_point(anchor);
        self.scale = new_scale;
        self.rebuild_transforms();
        let moved = self.workspace_to_screen_point(anchored);
        self.scroll_by(anchor - moved);
    }

    /// Converts a screen point into workspace coordinates.
    #[must_use]
    pub fn screen_to_workspace_point(&self, pt: Point) -> Point {
        self.screen_to_workspace * pt
    }

    /// Converts a workspace point into screen coordinates.
    #[must_use]
    pub fn workspace_to_screen_point(&self, pt: Point) -> Point {
        self.workspace_to_screen * pt
    }

    /// Converts a screen rectangle into workspace coordinates.
    #[must_use]
    pub fn screen_to_workspace_rect(&self, rect: Rect) -> Rect {
        // Axis-aligned uniform scale: transforming the two corners is enough.
        let p0 = self.screen_to_workspace * rect.origin();
        let p1 = self.screen_to_workspace * Point::new(rect.x1, rect.y1);
        Rect::from_points(p0, p1)
    }

    fn rebuild_transforms(&mut self) {
        self.workspace_to_screen = Affine::translate(self.scroll) * Affine::scale(self.scale);
        self.screen_to_workspace = self.workspace_to_screen.inverse();
    }
}

#[cfg(test)]
mod tests {
    use kurbo::{Point, Rect, Vec2};

    use super::Viewport;

    #[test]
    fn identity_by_default() {
        let vp = Viewport::default();
        let p = Point::new(12.0, -4.0);
        assert_eq!(vp.screen_to_workspace_point(p), p);
    }

    #[test]
    fn scroll_and_scale_are_undone() {
        let vp = Viewport::new(Vec2::new(100.0, 50.0), 2.0);
        let ws = vp.screen_to_workspace_point(Point::new(300.0, 250.0));
        assert!((ws.x - 100.0).abs() < 1e-9);
        assert!((ws.y - 100.0).abs() < 1e-9);

        let back = vp.workspace_to_screen_point(ws);
        assert!((back.x - 300.0).abs() < 1e-9);
        assert!((back.y - 250.0).abs() < 1e-9);
    }

    #[test]
    fn zoom_about_anchor_keeps_anchor_fixed() {
        let mut vp = Viewport::new(Vec2::new(30.0, 10.0), 1.0);
        let anchor = Point::new(400.0, 300.0);
        let before = vp.screen_to_workspace_point(anchor);

        vp.zoom_about_screen_point(anchor, 2.0);
        let after = vp.screen_to_workspace_point(anchor);

        assert!((vp.scale() - 2.0).abs() < 1e-12);
        assert!((after.x - before.x).abs() < 1e-9);
        assert!((after.y - before.y).abs() < 1e-9);
    }

    #[test]
    fn scale_is_clamped() {
        let mut vp = Viewport::default();
        vp.set_scale(1e9);
        assert!(vp.scale() <= 1e3);
        vp.set_scale(0.0);
        assert!(vp.scale() >= 1e-3);
    }

    #[test]
    fn rect_conversion_matches_points() {
        let vp = Viewport::new(Vec2::new(-20.0, 40.0), 0.5);
        let r = vp.screen_to_workspace_rect(Rect::new(0.0, 0.0, 100.0, 100.0));
        let p0 = vp.screen_to_workspace_point(Point::ZERO);
        assert!((r.x0 - p0.x).abs() < 1e-9);
        assert!((r.width() - 200.0).abs() < 1e-9);
    }
}
