pub mod engine;
pub mod response;

pub use engine::QueryEngine;
pub use response::{DATASET_KEY, Response};
