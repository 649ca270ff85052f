//! Route handlers, one module per resource. Each module exposes `routes()`
//! for mounting under its prefix.

pub mod auth;
pub mod clients;
pub mod health;
pub mod presentations;
pub mod upload;
