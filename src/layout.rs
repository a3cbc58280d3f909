//! Main window geometry

/// Window size in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowGeometry {
    pub width: i32,
    pub height: i32,
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self {
            width: 300,
            height: 200,
        }
    }
}

impl WindowGeometry {
    /// Top-left corner that centers the window on a screen of the given size.
    ///
    /// Integer division truncates toward zero, so an odd leftover pixel goes to the
    /// right/bottom edge. A screen smaller than the window yields negative coordinates.
    pub fn centered_on(&self, screen_width: i32, screen_height: i32) -> (i32, i32) {
        let left = (screen_width - self.width) / 2;
        let top = (screen_height - self.height) / 2;
        (left, top)
    }
}
