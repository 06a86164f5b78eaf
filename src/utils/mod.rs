pub mod error;
pub mod logging;
pub mod normalization;
pub mod similarity;

pub use error::*;
