//! Integration tests for Catalog-Sync
//!
//! These tests use wiremock to stand in for the remote catalog and a
//! temporary SQLite database for the key/value store.

mod sync_tests;
