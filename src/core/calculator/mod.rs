//! Attendance and payroll arithmetic. Pure functions over loaded rows;
//! database access lives in `core::reports`.

pub mod holidays;
pub mod payroll;
pub mod summary;

pub use holidays::is_public_holiday;
pub use payroll::{PayrollCalculator, ShiftPay, classify};
pub use summary::{AttendanceDetails, AttendanceSummary, DetailItem, build_details};
