pub mod registry;
pub mod runner;
pub mod tasks;
pub mod work;

pub use registry::*;
pub use runner::*;
pub use tasks::*;
pub use work::*;
