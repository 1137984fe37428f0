pub mod loader;
pub mod snapshot;

pub use loader::{load_products, parse_products};
pub use snapshot::{BlobEntry, IndexSnapshotStore, SnapshotError, SnapshotManifest, BLOB_NAMES};
