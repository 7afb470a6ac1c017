// src/utils/mod.rs

pub mod codes;
pub mod html;
pub mod session_guard;
