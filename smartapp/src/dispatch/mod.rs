//! Lifecycle dispatch

pub mod dispatcher;
pub mod handler;

pub use dispatcher::{DispatcherConfig, LifecycleDispatcher};
pub use handler::{EventHandler, LoggingEventHandler};
