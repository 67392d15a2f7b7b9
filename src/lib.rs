//! Quillpress - a small content-publishing blog engine
//!
//! Lists published posts, renders post pages with comments and similar
//! posts, shares posts by email, and runs ranked full-text search.

pub mod api;
pub mod config;
pub mod db;
pub mod forms;
pub mod models;
pub mod services;
pub mod theme;
