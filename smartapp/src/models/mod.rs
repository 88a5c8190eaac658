//! Lifecycle wire model

pub mod config;
pub mod definition;
pub mod event;
pub mod lifecycle;
pub mod secret;
pub mod timestamp;
