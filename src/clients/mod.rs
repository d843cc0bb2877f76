pub mod renderer_client;

pub use renderer_client::{RenderFormat, RendererClient};
