pub mod controller;
pub mod state;
pub mod surface;

pub use controller::PanelController;
pub use state::{DraftBuffer, StatusKind, TabInfo, ViewMode};
pub use surface::PanelSurface;
