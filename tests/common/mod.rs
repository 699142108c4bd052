//! Common test infrastructure
//!
//! Integration tests should only import from this module, not from the
//! internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestData, LATEST_TERM};
//!
//! #[test]
//! fn test_latest_term() {
//!     let data = TestData::standard();
//!     let loaded = data.load();
//!     assert!(loaded.sections.iter().any(|s| s.term == LATEST_TERM));
//! }
//! ```

mod constants;
mod fixtures;

pub use constants::*;
pub use fixtures::TestData;
