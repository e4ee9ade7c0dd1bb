pub mod api;
pub mod builder;
pub mod config;
pub mod dataset;
pub mod error;
pub mod normalize;
pub mod prompt;
pub mod resolver;
pub mod wrapper;

pub use error::{Error, Result};
pub use normalize::DetectionResult;
pub use wrapper::Trex2Api;
