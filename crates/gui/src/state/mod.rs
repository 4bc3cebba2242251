pub mod messages;

pub use messages::{AppMessage, LogEntry, LogLevel};
