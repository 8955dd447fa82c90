pub mod structs;

pub use structs::{Cache, CacheMeta};
