//! Wayfare: a travel-journal client for a hosted relational backend.
//!
//! The binary's subcommands are the application's views. All persistence and
//! authentication live in the hosted service; this crate is the rendering and
//! form layer in front of it, plus the derived-state logic (feed filtering,
//! the secret-key gate, the comment-thread codec, repost resolution).

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
pub mod util;
