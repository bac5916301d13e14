//! Request handlers, grouped by surface.
//!
//! Every handler returns `Result<_, ApiError>`; authorization goes through
//! [`crate::policy`] and payload checks through [`crate::validation`].

pub mod accounts;
pub mod admin;
pub mod experiences;
pub mod public;
