//! Tuiter backend library.
//!
//! A REST API for a small social network with a movie-review side: users,
//! tuits, likes and dislikes, follows, bookmarks, messages, movies, reviews,
//! acting credits and watchlists, stored in SQLite.

// Allow raw string hashes for safety - they're harmless and prevent issues if content changes
#![allow(clippy::needless_raw_string_hashes)]

pub mod auth;
pub mod config;
pub mod db;
pub mod web;
