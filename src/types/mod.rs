pub mod event;
pub mod stats;
pub mod topic;

pub use event::{Event, EventData};
pub use stats::{ActivityLine, OrderStats, Stats, StatsReport, Summary, TodayBreakdown};
pub use topic::{EventKind, Topic};
