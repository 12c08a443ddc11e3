//! Isometric projection between world units and screen pixels.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::ScreenRect;

/// Viewport extent assumed until an adapter reports the real surface size.
pub const DEFAULT_VIEWPORT: Vec2 = Vec2::new(1000.0, 600.0);

/// Zoom factor applied by a freshly constructed camera.
pub const DEFAULT_ZOOM: f32 = 2.0;

/// Tile edge length in pixels used until the arena configures its own tiles.
pub const DEFAULT_TILE_EXTENT: f32 = 32.0;

/// Border in screen pixels added around the viewport when culling drawables.
pub const CULLING_MARGIN: f32 = 16.0;

/// Camera that maps world coordinates onto an isometric screen plane.
///
/// The camera stores its own `position` in screen units. Projection itself is
/// independent of that position: [`IsoCamera::world_to_screen`] and
/// [`IsoCamera::screen_to_world`] are linear maps that only depend on zoom and
/// tile size, which keeps them usable for converting deltas as well as points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IsoCamera {
    position: Vec2,
    size: Vec2,
    zoom: f32,
    tile_width: f32,
    tile_height: f32,
}

impl IsoCamera {
    /// Creates a camera with the default viewport, zoom and tile size.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            position: Vec2::ZERO,
            size: DEFAULT_VIEWPORT,
            zoom: DEFAULT_ZOOM,
            tile_width: DEFAULT_TILE_EXTENT,
            tile_height: DEFAULT_TILE_EXTENT,
        }
    }

    /// Returns a copy of the camera using the provided zoom factor.
    #[must_use]
    pub const fn with_zoom(mut self, zoom: f32) -> Self {
        self.zoom = zoom;
        self
    }

    /// Returns a copy of the camera using the provided viewport extent.
    #[must_use]
    pub const fn with_viewport(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    /// Camera center expressed in screen units.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Moves the camera center to the provided screen-space location.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Centers the camera on the provided world-space location.
    pub fn center_on(&mut self, world: Vec2) {
        self.position = self.world_to_screen(world);
    }

    /// Viewport extent in screen pixels.
    #[must_use]
    pub const fn size(&self) -> Vec2 {
        self.size
    }

    /// Replaces the viewport extent.
    pub fn set_size(&mut self, size: Vec2) {
        self.size = size;
    }

    /// Current zoom factor.
    #[must_use]
    pub const fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Replaces the zoom factor. Zero is accepted and treated as degenerate.
    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom;
    }

    /// Tile width in pixels.
    #[must_use]
    pub const fn tile_width(&self) -> f32 {
        self.tile_width
    }

    /// Stored tile height in pixels.
    #[must_use]
    pub const fn tile_height(&self) -> f32 {
        self.tile_height
    }

    /// Configures the tile size.
    ///
    /// Tile art is authored with a doubled logical height, so the stored height
    /// is half of `doubled_height`.
    pub fn set_tile_size(&mut self, width: f32, doubled_height: f32) {
        self.tile_width = width;
        self.tile_height = doubled_height / 2.0;
    }

    /// Projects a world-space point (or delta) onto the screen plane.
    #[must_use]
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        let half_width = self.tile_width / 2.0;
        let half_height = self.tile_height / 2.0;
        Vec2::new(
            (world.x - world.y) * half_width * self.zoom,
            (world.x + world.y) * half_height * self.zoom,
        )
    }

    /// Maps a screen-space point (or delta) back into world units.
    ///
    /// Returns the origin when the zoom or tile size is too close to zero to
    /// invert.
    #[must_use]
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        let half_width = self.tile_width / 2.0;
        let half_height = self.tile_height / 2.0;
        if self.zoom.abs() < f32::EPSILON
            || half_width.abs() < f32::EPSILON
            || half_height.abs() < f32::EPSILON
        {
            return Vec2::ZERO;
        }

        let scaled = screen / self.zoom;
        let across = scaled.x / half_width;
        let down = scaled.y / half_height;
        Vec2::new((across + down) / 2.0, (down - across) / 2.0)
    }

    /// Screen-space rectangle visible through the camera, padded by the culling margin.
    #[must_use]
    pub fn bounds(&self) -> ScreenRect {
        ScreenRect::new(
            self.position.x - self.size.x / 2.0 + CULLING_MARGIN,
            self.position.y - self.size.y / 2.0 + CULLING_MARGIN,
            self.size.x + CULLING_MARGIN,
            self.size.y + CULLING_MARGIN,
        )
    }
}

impl Default for IsoCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f32 = 1e-4;

    fn assert_close(actual: Vec2, expected: Vec2) {
        assert!(
            (actual - expected).length() <= TOLERANCE,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn unit_axes_project_onto_diamond() {
        let camera = IsoCamera::new().with_zoom(1.0);

        assert_close(camera.world_to_screen(Vec2::new(1.0, 0.0)), Vec2::new(16.0, 16.0));
        assert_close(camera.world_to_screen(Vec2::new(0.0, 1.0)), Vec2::new(-16.0, 16.0));
        assert_close(camera.world_to_screen(Vec2::new(1.0, 1.0)), Vec2::new(0.0, 32.0));
    }

    #[test]
    fn projection_round_trips_for_non_zero_zoom() {
        let points = [
            Vec2::new(0.0, 0.0),
            Vec2::new(12.5, -3.25),
            Vec2::new(-40.0, 17.0),
            Vec2::new(0.001, 999.0),
        ];

        for zoom in [0.5, 1.0, 2.0, -1.5] {
            let mut camera = IsoCamera::new().with_zoom(zoom);
            camera.set_tile_size(64.0, 32.0);
            for point in points {
                let screen = camera.world_to_screen(point);
                let back = camera.screen_to_world(screen);
                assert!(
                    (back - point).length() <= TOLERANCE * point.length().max(1.0),
                    "expected {point:?} to survive zoom {zoom}, got {back:?}"
                );
            }
        }
    }

    #[test]
    fn zero_zoom_maps_everything_to_origin() {
        let camera = IsoCamera::new().with_zoom(0.0);

        for screen in [Vec2::new(5.0, 5.0), Vec2::new(-1e6, 3.0), Vec2::ZERO] {
            let world = camera.screen_to_world(screen);
            assert_eq!(world, Vec2::ZERO);
            assert!(world.is_finite());
        }
    }

    #[test]
    fn tile_size_setter_halves_height() {
        let mut camera = IsoCamera::new();
        camera.set_tile_size(64.0, 32.0);

        assert_eq!(camera.tile_width(), 64.0);
        assert_eq!(camera.tile_height(), 16.0);
    }

    #[test]
    fn bounds_are_centered_with_margin() {
        let mut camera = IsoCamera::new().with_viewport(Vec2::new(200.0, 100.0));
        camera.set_position(Vec2::new(50.0, 40.0));

        let bounds = camera.bounds();

        assert_eq!(bounds.left(), 50.0 - 100.0 + CULLING_MARGIN);
        assert_eq!(bounds.top(), 40.0 - 50.0 + CULLING_MARGIN);
        assert_eq!(bounds.width(), 200.0 + CULLING_MARGIN);
        assert_eq!(bounds.height(), 100.0 + CULLING_MARGIN);
    }

    #[test]
    fn centering_uses_projection() {
        let mut camera = IsoCamera::new();
        camera.center_on(Vec2::new(3.0, 1.0));

        assert_close(camera.position(), camera.world_to_screen(Vec2::new(3.0, 1.0)));
    }
}
