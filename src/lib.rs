//! Convert source code between programming languages using a remote
//! text-completion endpoint.

pub mod clipboard;
pub mod config;
pub mod controller;
pub mod error;
pub mod fence;
pub mod languages;
pub mod retry;
pub mod security;
pub mod server;
pub mod translation;
