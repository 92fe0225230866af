//! Retirement savings projection: a validated compound-accumulation engine plus the
//! HTTP, dashboard and command-line surfaces that call it.

pub mod api;
pub mod core;
