#![forbid(unsafe_code)]

pub mod files;
pub mod remote;
pub mod repository;
pub mod sqlite;

pub use files::{DirectoryCorpus, clean_movie_name};
pub use remote::{RemoteConfig, RemoteCorpus};
pub use repository::{CorpusSource, InMemoryCorpus, Storage, StorageError};
pub use sqlite::{SqliteCorpus, SqliteInitError};
