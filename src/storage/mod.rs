//! Object storage layer for the lake
//!
//! This module provides a small abstraction over the bucket the jobs land
//! data in, organized into logical components:
//! - `store`: the `ObjectStore` trait and a local-directory backend
//! - `gcs`: Google Cloud Storage backend over the JSON API
//! - `paths`: bronze/silver path conventions and latest-partition lookup
//! - `lake`: table-level reads and writes on top of a store

pub mod gcs;
pub mod lake;
pub mod paths;
pub mod store;

#[cfg(test)]
mod tests;

pub use gcs::GcsStore;
pub use lake::Lake;
pub use paths::Partition;
pub use store::{LocalStore, ObjectMeta, ObjectStore};
