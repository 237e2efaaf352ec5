//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and reminder calls into use-case level APIs.
//! - Keep UI/FFI layers decoupled from storage and delivery details.

pub mod task_service;
