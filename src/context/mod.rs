//! wgpu context management.

pub use crate::context::context::Context;

mod context;
