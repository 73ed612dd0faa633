//! Unit tests for the label text format.
//!
//! These tests verify serialization, deserialization, skipped-line reporting
//! and file handling.

mod label_file_tests;
mod roundtrip_tests;
