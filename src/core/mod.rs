//! Services and state ownership built on the domain types.

pub mod services;
pub mod time;
pub mod tracker;

pub use time::{Clock, FixedClock, SystemClock};
pub use tracker::{ExpenseTracker, LoadMetadata, MonthActivation};
