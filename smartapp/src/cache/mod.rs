//! In-memory caches

pub mod public_key;
