//! Shared constants for integration tests
//!
//! When the fixture data changes, update only this file and `fixtures.rs`.

// ============================================================================
// Terms
// ============================================================================

pub const OLDEST_TERM: &str = "2023FA";
pub const MIDDLE_TERM: &str = "2024SP";
pub const LATEST_TERM: &str = "2024FA";

// ============================================================================
// Latest-term sections
// ============================================================================

/// 4 of 10 seats taken, exactly at the default low-enrollment cutoff.
pub const HEALTHY_SECTION: &str = "ENS-101-A";

/// A single student.
pub const LOW_SECTION: &str = "ENS-102-A";

/// No seats left.
pub const FULL_SECTION: &str = "ENS-103-A";

/// No students at all.
pub const EMPTY_SECTION: &str = "ENS-104-A";

/// Three instruments but a single enrolled count.
pub const MALFORMED_SECTION: &str = "ENS-105-A";

pub const LATEST_TERM_SECTIONS: usize = 5;
pub const TOTAL_SECTIONS: usize = 9;

// ============================================================================
// Faculty
// ============================================================================

pub const FACULTY_SMITH: &str = "Smith, Ann";
pub const FACULTY_LEE: &str = "Lee, Sam";
