//! Ping Patrol Core
//!
//! Core types shared by the Ping Patrol services.
//!
//! This crate contains:
//! - Domain types: test requests, run identities, job status snapshots and probe results
//! - DTOs: request and error bodies exchanged over the HTTP API

pub mod domain;
pub mod dto;
