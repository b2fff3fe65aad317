//! Standard exit codes (BSD sysexits.h compatible)

/// Successful termination
pub const OK: i32 = 0;

/// Command line usage error, also a name rejected by check-name
pub const USAGE: i32 = 64;

/// Invalid view document, name or pattern
pub const DATAERR: i32 = 65;

/// View path does not resolve
pub const NOINPUT: i32 = 66;

/// Job source failed during a strict status query
pub const UNAVAILABLE: i32 = 69;

/// Internal software error
pub const SOFTWARE: i32 = 70;

/// Input/output error
pub const IOERR: i32 = 74;

/// Configuration error
pub const CONFIG: i32 = 78;
