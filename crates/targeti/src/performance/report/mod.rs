mod insights;
mod summary;
pub mod views;

pub use insights::STATUS_MESSAGE_LIMIT;
pub use summary::{PerformanceReport, ShopSnapshot};

pub(crate) use insights::generate_insights;
