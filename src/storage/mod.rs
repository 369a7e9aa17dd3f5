pub mod file_store;

pub use file_store::FileStore;
pub use querylab_core::{InMemoryStore, KeyValueStore};
