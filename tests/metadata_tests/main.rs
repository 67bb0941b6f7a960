//! Metadata test suite
