pub mod domain;
pub mod error;
pub mod query;
pub mod traits;

pub use domain::*;
pub use error::*;
pub use query::*;
pub use traits::*;
