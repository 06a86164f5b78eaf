pub mod settings;

pub use settings::{MatchingSettings, Settings};
