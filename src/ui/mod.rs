pub mod browser;
pub mod grid;
pub mod meter;
pub mod theme;

pub use browser::{render_browser, BrowserState};
pub use grid::{render_footer, render_pads, render_transport, GridState};
pub use meter::render_meter;
pub use theme::Theme;
