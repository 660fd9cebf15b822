pub mod task;
pub mod weekday;

pub use task::{FileTask, RunContext, RunMode, TargetDate, TaskStatus};
pub use weekday::{parse_weekday, weekday_name};
