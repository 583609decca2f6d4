//! Daily Snapshot Store (C3).

pub mod models;
pub mod repository;

pub use models::{DailyBalance, end_of_day};
