//! Terminal client for the JSONPlaceholder demo API.
//!
//! Screens read through a shared [`cache::QueryCache`]: identical requests in
//! flight are merged, and a successful mutation marks every cached response
//! carrying a matching tag stale so watching screens refetch.

pub mod api;
pub mod app;
pub mod cache;
pub mod commands;
pub mod config;
pub mod event;
pub mod logging;
pub mod query;
pub mod routes;
pub mod ui;
