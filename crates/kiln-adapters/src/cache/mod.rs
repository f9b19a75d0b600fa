//! Bundle cache adapters.

mod local;

pub use local::LocalBundleCache;
