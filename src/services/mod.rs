pub mod ingest;
pub mod ledger;
pub mod matcher;
pub mod planilla;
pub mod ranks;

pub use ledger::DecisionLedger;
pub use matcher::Matcher;
