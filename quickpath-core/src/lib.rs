pub mod error;

pub mod config;

pub mod cache {
    pub mod prefix_cache;
    pub use prefix_cache::{CacheKey, PrefixCache};
}

pub mod completion {
    pub mod query;
    pub use query::Query;

    pub mod ranker;

    pub mod selection;
    pub use selection::SelectionCursor;
}

pub mod controller {
    pub mod coordinator;
    pub use coordinator::{CompletionEvent, QueryCoordinator};

    pub mod engine;
    pub use engine::{CompletionEngine, EngineCommand, EngineHandle};
}

pub mod model {
    pub mod entry;
    pub use entry::{Entry, ResultSet};
}

pub mod fs {
    pub mod enumerator;
    pub mod roots;
}

pub mod logging;
pub use logging::Logger;

pub mod util {
    pub mod debounce;
}

pub use error::AppError;

pub use controller::{CompletionEngine, CompletionEvent, EngineHandle};
