//! API route handlers

pub mod chat;
pub mod groups;
pub mod rate_limit;
pub mod study_sessions;
pub mod words;
