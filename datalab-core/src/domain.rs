pub mod ids;
pub mod config;
pub mod task;
pub mod record;
pub mod edge_case;

pub use ids::*;
pub use config::*;
pub use task::*;
pub use record::*;
pub use edge_case::*;
