// src/models/mod.rs

pub mod attendance;
pub mod certificate;
pub mod question;
pub mod quiz_history;
pub mod session;
pub mod user;
