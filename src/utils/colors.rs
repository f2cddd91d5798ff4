//! ANSI color constants for terminal output.

pub const RESET: &str = "\x1b[0m";
pub const GREY: &str = "\x1b[90m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Green when a worker is on shift, grey otherwise.
pub fn color_for_status(online: bool) -> &'static str {
    if online { GREEN } else { GREY }
}
