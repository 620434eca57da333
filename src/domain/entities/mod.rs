//! Core domain entities.
//!
//! - [`Link`] - A stored short code to URL mapping with its click counter
//! - [`NewLink`] - Input for creating a link

pub mod link;

pub use link::{Link, NewLink};
