pub mod search;
pub mod tasks;
