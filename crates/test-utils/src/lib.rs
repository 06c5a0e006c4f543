//! # Mock Provider

pub mod data;
pub mod platform;

mod store;

pub use platform::{Fault, Platform};
