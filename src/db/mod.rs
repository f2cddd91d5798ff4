pub mod access;
pub mod devices;
pub mod employees;
pub mod initialize;
pub mod log;
pub mod migrate;
pub mod pool;
pub mod shifts;
pub mod stats;
