//! Property-based tests for issuance and decoding.
