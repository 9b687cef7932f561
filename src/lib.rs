//! Google Calendar inspection tool: sign in, pull calendars and
//! events, search them two ways, and export the results as CSV.

pub mod cli;
pub mod core;
pub mod export;
pub mod flatten;
pub mod format;
pub mod google;
pub mod inspector;
pub mod search;
pub mod session;
