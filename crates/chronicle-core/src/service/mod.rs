//! Application services over the repository traits.

pub mod activity;
pub mod digest;
pub mod milestone;

pub use activity::{ActivityService, Period, TimelineEntry, ToolStats};
pub use digest::daily_digest;
pub use milestone::MilestoneService;
