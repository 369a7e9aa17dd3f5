//! querylab - an interactive SQL learning playground.
//!
//! The mock query engine lives in `querylab-core`. This crate adds what the
//! learning site wraps around it: file-backed storage, configuration, lesson
//! progress, cached sign-in state, and a client for the hosted row-store that
//! serves lessons and exercises.

pub mod cli;
pub mod config;
pub mod error;
pub mod health;
pub mod lessons;
pub mod progress;
pub mod rowstore;
pub mod session;
pub mod storage;

pub use config::{Config, RowStoreSettings};
pub use error::{LabError, LabResult};
pub use health::{check, HealthItem, HealthReport};
pub use lessons::{lesson_exercises, published_lessons, Exercise, Lesson};
pub use progress::{ProgressRecord, ProgressSummary, ProgressTracker};
pub use rowstore::{HttpRowStore, InMemoryRowStore, RowStore};
pub use session::SessionFlags;
pub use storage::FileStore;
