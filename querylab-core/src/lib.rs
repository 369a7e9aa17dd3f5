//! querylab-core - the mock query engine behind the SQL playground.
//!
//! Nothing here parses or executes SQL. A query string is checked for
//! superficial well-formedness, then matched against an ordered list of
//! scenario rules, each bound to a canned result table. Executions are timed,
//! kept in a bounded history, and queries can be bookmarked into a key-value
//! store.
//!
//! # Main Components
//!
//! - **Validator**: hard errors and soft warnings over surface syntax
//! - **Classifier**: first-match-wins decision list of regex scenarios
//! - **Playground**: owns history and saved queries, runs the pipeline
//! - **KeyValueStore**: persistence port for saved queries
//!
//! # Example
//!
//! ```rust
//! use querylab_core::{InMemoryStore, Playground};
//!
//! let mut playground = Playground::new(InMemoryStore::new());
//!
//! let execution = playground.run("SELECT * FROM students;").unwrap();
//! assert_eq!(execution.results.len(), 4);
//! assert_eq!(playground.history().len(), 1);
//!
//! assert!(playground.run("banana").is_err());
//! assert_eq!(playground.history().len(), 1);
//! ```

pub mod classifier;
pub mod error;
pub mod history;
pub mod plan;
pub mod playground;
pub mod saved;
pub mod storage;
pub mod validator;
pub mod value;

// Re-export main types for convenience
pub use classifier::{classify, Classification, Classifier, ScenarioRule};
pub use error::{PlaygroundError, PlaygroundResult};
pub use history::{QueryHistory, DEFAULT_HISTORY_CAPACITY};
pub use plan::execution_plan;
pub use playground::{ExecutionStatus, Playground, QueryExecution};
pub use saved::{load_saved_queries, SavedQuery, SAVED_QUERIES_KEY};
pub use storage::{InMemoryStore, KeyValueStore};
pub use validator::{validate, Severity, ValidationMessage, ValidationResult};
pub use value::{ResultRow, ResultSet, Scalar};
