//! Data Transfer Objects for the HTTP API
//!
//! Lightweight request and response bodies exchanged between the server
//! and its clients.
