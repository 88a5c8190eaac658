//! Outbound HTTP

pub mod keyserver;
