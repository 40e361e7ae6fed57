//! Path and URL utilities.
//!
//! Pure functions for path manipulation. No side effects.
//!
//! - [`fs`]: Filesystem path normalization (`normalize_path`, `is_within`)
//! - [`route`]: URL utilities (`is_external_link`, `resolve_reference`, `root_relative_url`)

pub mod fs;
pub mod route;

pub use fs::{is_within, normalize_path};
pub use route::{UrlPathError, resolve_reference, root_relative_url};
