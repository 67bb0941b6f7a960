//! Codec test suite
//!
//! Key scheme and record envelope.

mod key_tests;
