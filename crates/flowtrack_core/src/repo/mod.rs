//! Persistence repositories.
//!
//! # Responsibility
//! - Own every SQL statement touching task storage.
//! - Keep callers working with domain types, never rows.

pub mod task_repo;
