//! SmartApp Webhook Library
//!
//! Verifies, parses and dispatches SmartThings SmartApp lifecycle requests.

pub mod app;
pub mod authn;
pub mod cache;
pub mod context;
pub mod dispatch;
pub mod errors;
pub mod http;
pub mod logs;
pub mod models;
pub mod server;
pub mod storage;
pub mod utils;
pub mod wire;
