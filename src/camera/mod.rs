//! Camera trait with a perspective implementation.

pub use self::camera::{project_viewport, RenderCamera};
pub use self::perspective::PerspectiveCamera;

mod camera;
mod perspective;
