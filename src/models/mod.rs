pub mod analysis;
pub mod decision;
pub mod record;

pub use analysis::{AnalysisResult, ParDudoso, Resumen};
pub use decision::{PairKey, Verdict};
pub use record::Record;
