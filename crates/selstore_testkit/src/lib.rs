//! # selstore testkit
//!
//! Test utilities for selstore.
//!
//! This crate provides:
//! - CID generators and a small linked test tree with scripted visit orders
//! - A traversal driver standing in for a real traversal engine
//! - Fake loaders and datastores that count calls or fail on demand
//! - Common selectors in data-model form
//! - Property-based test generators using proptest
//! - Fuzz testing harnesses
//! - Stress testing utilities
//!
//! ## Usage
//!
//! ```rust
//! use selstore_testkit::prelude::*;
//!
//! let tree = TestTree::new();
//! with_temp_store(|store| {
//!     let mut writer = store
//!         .new_traversal(&tree.root_cid(), &explore_all_recursively(), tree.loader())
//!         .unwrap();
//!     drive_traversal(&mut writer, &tree.explore_all_plan());
//!     writer.commit().unwrap();
//!
//!     let replayed = store
//!         .get(&tree.root_cid(), &explore_all_recursively())
//!         .unwrap()
//!         .collect_links()
//!         .unwrap();
//!     assert_eq!(replayed, expected_links(&tree.explore_all_plan()));
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod fuzz;
pub mod generators;
pub mod selectors;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::selectors::*;
}

pub use fixtures::*;
pub use fuzz::*;
pub use generators::*;
pub use selectors::*;
pub use stress::*;
