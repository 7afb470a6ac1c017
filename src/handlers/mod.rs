// src/handlers/mod.rs

pub mod admin;
pub mod attendance;
pub mod auth;
pub mod certificate;
pub mod profile;
pub mod quiz;
