//! The render pass lifecycle and a minimal frame driver.

pub use self::render_pass::{FrameContext, FrameInfo, PassSchedule, RenderPass};

mod render_pass;
