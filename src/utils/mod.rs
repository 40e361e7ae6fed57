//! Shared helpers: hashing, HTML start-tag scanning, path/URL handling, pluralization.

pub mod hash;
pub mod html;
pub mod path;
mod plural;

pub use plural::plural_count;
