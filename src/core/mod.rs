// src/core/mod.rs

pub mod backoff;
pub mod net;
pub mod oauth;
pub mod sanitize;
