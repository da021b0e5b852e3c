//! Command implementations for the find-repos CLI

pub mod find;
