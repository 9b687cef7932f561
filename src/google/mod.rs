pub mod auth;
pub mod gcal;
