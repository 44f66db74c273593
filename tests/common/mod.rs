//! Common test utilities for ismip-hom.
//!
//! This module provides shared utilities for the integration tests.

// Re-export all common test utilities
pub mod assertions;
pub mod test_data;
