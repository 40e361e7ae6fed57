//! Asset discovery, compilation, copying and the build manifest.

pub mod bundle;
pub mod compile;
pub mod copy;
pub mod manifest;
pub mod scan;

pub use bundle::{BundleOptions, BundledAsset, bundle_entries};
pub use copy::copy_tree;
pub use manifest::Manifest;
pub use scan::{ENTRY_EXTENSIONS, find_entry_points, walk_files};
