pub mod connector;
pub mod dashboard;
pub mod import;
pub mod persona;
pub mod segments;
pub mod sequence;

pub use connector::AccountConnector;
pub use dashboard::{DashboardService, DashboardStats};
pub use import::{ImportFormat, SpreadsheetImporter};
pub use persona::{match_trigger, preview_reply};
pub use segments::aggregate_segments;
pub use sequence::Sequence;
