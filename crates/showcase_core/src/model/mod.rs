//! Catalog domain model and sampling value types.
//!
//! # Responsibility
//! - Define catalog entities (owners, creators, works, venues, programs) with
//!   their field/column descriptor tables colocated.
//! - Define sampling inputs and outputs: seeds, page windows, label paths,
//!   sampled items.
//!
//! # Invariants
//! - Every catalog entity is identified by a stable UUID stored as TEXT.
//! - Relations (`owner`, `venue`, `creator`) are attached after
//!   materialization and are never part of a descriptor table.

pub mod creator;
pub mod label_path;
pub mod mime;
pub mod owner;
pub mod page;
pub mod program;
pub mod seed;
pub mod venue;
pub mod work;
