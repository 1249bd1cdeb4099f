pub mod bar;
pub mod regime;
pub mod transition;

pub use bar::*;
pub use regime::*;
pub use transition::*;
