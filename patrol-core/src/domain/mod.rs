//! Core domain types
//!
//! These types are shared between the controller (which produces them while
//! driving a run), the server (which serves them) and the CLI (which renders them).

pub mod destination;
pub mod job;
pub mod probe;
pub mod request;
pub mod run;
