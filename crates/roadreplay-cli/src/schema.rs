pub mod episode_log;
pub mod report;
