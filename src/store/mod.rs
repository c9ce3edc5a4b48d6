//! Session store implementations

mod graph_store;
mod queries;
mod traits;

pub use graph_store::{GraphStore, GraphStoreBuilder};
pub use traits::{SessionStore, SetOutcome};
