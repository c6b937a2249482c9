//! # Persistence Layer
//!
//! Storage collaborator for the pick'em core. Pick sets, usage history,
//! weekly scores and season standings are addressed by composite keys.
//!
//! ## Architecture
//!
//! - **PickemStore**: async trait the coordinators program against
//! - **InMemoryStore**: single-lock in-memory implementation with
//!   compare-and-swap pick set writes and atomic batch commits
//! - **Snapshot**: JSON file capture of a whole store
//!
//! ## Usage
//!
//! ```rust
//! use persistence::{InMemoryStore, PickemStore};
//! use pick_ledger::{LeagueId, WeekKey};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = InMemoryStore::new();
//!     let week = WeekKey::new(LeagueId::new("office"), 2025, 1);
//!     assert!(store.list_pick_sets(&week).await?.is_empty());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod memory;
pub mod snapshot;
pub mod store;

pub use error::{PersistenceError, Result};
pub use memory::InMemoryStore;
pub use snapshot::StoreSnapshot;
pub use store::{BackfillCommit, LockCommit, PickemStore};
