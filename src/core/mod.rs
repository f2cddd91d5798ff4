pub mod auth;
pub mod backup;
pub mod calculator;
pub mod devices;
pub mod email;
pub mod log;
pub mod logs;
pub mod mobile;
pub mod reports;
pub mod rounding;
pub mod shifts;
pub mod statistics;
pub mod versioning;
pub mod workers;
