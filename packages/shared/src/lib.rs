//! Utilities shared by the Tsubu packages: logging setup and time handling.

pub mod logger;
pub mod time;
