//! conveyor-core
//!
//! Core building blocks for the Conveyor task queue.
//!
//! - **domain**: the task aggregate and its value types (identifier,
//!   status, profile, job name, attribute bags, errors)
//! - **codec**: storage round-trip form for tasks crossing a process
//!   boundary
//! - **view**: read-only external form served to operators
//! - **runtime**: executable job contract + name -> factory registry
//! - **queue**: queue port + in-memory implementation
//! - **worker**: consumption loop / worker group
//! - **api**: HTTP control-plane (list / submit / inspect / stats)
//! - **observability**: queue counters

pub mod api;
pub mod codec;
pub mod domain;
pub mod observability;
pub mod queue;
pub mod runtime;
pub mod view;
pub mod worker;
