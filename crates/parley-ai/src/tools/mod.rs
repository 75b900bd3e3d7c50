//! Tool contract and registry

mod registry;
mod traits;

pub use registry::ToolRegistry;
pub use traits::Tool;
