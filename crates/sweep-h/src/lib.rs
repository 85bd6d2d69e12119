//! Headless Chromium backend for sweep, driven over CDP.

pub mod backend;
pub mod cdp;
pub mod inject;

pub use backend::{HeadlessBackend, HeadlessPage};
