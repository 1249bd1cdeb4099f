pub mod loader;
pub mod profiles;
pub mod runtime;

pub use profiles::*;
pub use runtime::*;
