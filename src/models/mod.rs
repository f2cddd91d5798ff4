pub mod access;
pub mod admin_log;
pub mod day_kind;
pub mod device;
pub mod employee;
pub mod shift;

pub use access::{AccessLog, NewAccessLog, SecurityAlert};
pub use admin_log::AdminLog;
pub use day_kind::DayKind;
pub use device::{DeviceInfo, DeviceLog};
pub use employee::{Employee, NewEmployee, Rates};
pub use shift::{HolidayFlag, NewShift, Shift, SickFlag};
