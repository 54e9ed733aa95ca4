//! Client library for the wasfeines recipe API.
//!
//! The stores in here hold cached projections of server state. [`app::App`]
//! owns them and is the only place user actions enter the library.

pub mod api;
pub mod app;
pub mod config;
pub mod draft;
pub mod error;
pub mod feed;
pub mod lifetime;
pub mod models;
pub mod server;
pub mod views;
