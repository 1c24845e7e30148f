//! Neurahive backend library.
//!
//! Authentication, role-based authorization and user management for the
//! agent platform.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod user;
