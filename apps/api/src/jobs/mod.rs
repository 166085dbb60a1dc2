// Job tracker: application records, their status timelines and per-user stats.

pub mod handlers;
pub mod models;
pub mod store;
