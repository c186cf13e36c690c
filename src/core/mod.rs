//! # Core Module
//!
//! Shared-state primitives used by the engine and its collaborators.
//!
//! The engine itself runs on a single frame thread and owns its world outright. The only
//! state that has to cross threads is the state of the remote mutation store, whose change
//! notifications may be delivered from elsewhere; `MtResource` is the handle it is kept in.

pub mod mt_resource;

pub use mt_resource::MtResource;
