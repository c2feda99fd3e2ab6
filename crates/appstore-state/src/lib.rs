//! Persistence gateway for the app store.
//!
//! Backed by [redb](https://docs.rs/redb), provides persistent and in-memory
//! storage for apps, clusters, environments, installed apps, their version
//! history, default cluster components, chart versions and releases.
//!
//! # Architecture
//!
//! All rows are JSON-serialized into redb's `&[u8]` value columns under
//! `u64` ids allocated from a sequence table, so id order is creation order.
//! Nothing is ever hard-deleted except engine-owned releases; entities carry
//! an `active` flag instead.
//!
//! Writes happen inside a [`UnitOfWork`] (one redb write transaction).
//! Reads go through [`StateReader`], implemented by both a unit of work and
//! a read-only [`Snapshot`].
//!
//! The `StateStore` is `Clone` + `Send` + `Sync` (backed by `Arc<Database>`).

pub mod error;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{StateError, StateResult};
pub use store::{Snapshot, StateReader, StateStore, UnitOfWork};
pub use types::*;
