// Todolist - personal todo list over a pluggable key-value store

pub mod config;
pub mod error;
pub mod grouping;
pub mod models;
pub mod notify;
pub mod pending;
pub mod phonetic;
pub mod repository;
pub mod store;

// Re-export main types for convenience
pub use config::{Backend, Config};
pub use error::{TodoError, TodoResult};
pub use grouping::{DateGroup, group_by_date, group_by_date_in, visible};
pub use models::{Clock, SystemClock, Todo, TodoPatch, TodoType};
pub use notify::{AlertRaised, Banner, NotificationBus, Severity, SubscriptionId};
pub use pending::{RefreshTicker, pending_label};
pub use repository::{DEFAULT_STORAGE_KEY, TodoRepository};
pub use store::{FileStore, KeyValueStore, MemoryStore, SqliteStore};
