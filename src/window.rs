//! Main window placement

use crate::error::Result;
use crate::layout::WindowGeometry;
use tauri::{LogicalPosition, LogicalSize, WebviewWindow};

/// Label of the window declared in tauri.conf.json
pub const MAIN_WINDOW: &str = "main";

/// Size the window, center it on the primary display, then show it.
///
/// The window is declared hidden so it never flashes at the platform's default position.
pub fn place_main_window(window: &WebviewWindow) -> Result<()> {
    let geometry = WindowGeometry::default();
    window.set_size(LogicalSize::new(
        f64::from(geometry.width),
        f64::from(geometry.height),
    ))?;

    match window.primary_monitor()? {
        Some(monitor) => {
            let screen = monitor.size().to_logical::<f64>(monitor.scale_factor());
            let (left, top) = geometry.centered_on(screen.width as i32, screen.height as i32);
            tracing::debug!(
                screen_width = screen.width,
                screen_height = screen.height,
                left,
                top,
                "Centering main window"
            );
            window.set_position(LogicalPosition::new(f64::from(left), f64::from(top)))?;
        }
        None => {
            tracing::warn!("No primary monitor reported, leaving window at default position");
        }
    }

    window.show()?;
    Ok(())
}
