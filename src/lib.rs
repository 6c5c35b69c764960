pub mod config;
pub mod data;
pub mod debouncer;
pub mod notes;
pub mod state;
pub mod storage;
pub mod utils;

pub use data::filter::{Filter, FilteredView};
pub use data::pagination::Pagination;
pub use data::sort::{SortOrder, SortState, SortValue, Sortable};
pub use debouncer::{Debounced, Debouncer};
pub use notes::{clean_notes, parse_gross_from_notes};
pub use state::async_state::{AsyncResource, AsyncState};
pub use state::executor::AsyncExecutor;
pub use storage::persisted::{DiagnosticSink, FallbackPolicy, Persisted};
pub use storage::{FileStorage, MemoryStorage, StorageProvider};
