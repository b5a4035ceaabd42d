//! Core types and trait definitions for the Shelf book-review platform.
//!
//! Entities, commands, repository traits and the services that enforce the
//! business rules. No HTTP or SQL lives here: `shelf-store-sqlite` implements
//! the repositories and `shelf-api` puts the services behind axum.
//!
//! [`memory::MemoryStore`] implements every repository in-process and backs
//! the test suites.

// Repository traits spell out `+ Send` on their futures; impls use `async fn`.
#![allow(async_fn_in_trait)]

pub mod book;
pub mod criteria;
pub mod crud;
pub mod error;
pub mod follow;
pub mod memory;
pub mod password;
pub mod rating;
pub mod review;
pub mod service;
pub mod store;
pub mod user;
pub mod view;

pub use error::{Error, Resource, Result};
