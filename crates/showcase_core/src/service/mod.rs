//! Core use-case services.
//!
//! # Responsibility
//! - Validate caller input and orchestrate repository calls.
//! - Keep binaries and other front ends decoupled from storage details.

pub mod sampling_service;
