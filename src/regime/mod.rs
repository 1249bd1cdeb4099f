pub mod analyzer;
pub mod blender;
pub mod classifier;
pub mod transition;

pub use analyzer::*;
pub use blender::*;
pub use classifier::*;
pub use transition::*;
