#![doc = include_str!("../README.md")]

pub mod catalog;
pub mod discover;
pub mod error;
pub mod evaluator;
pub mod host;
pub mod matcher;
pub mod reconciler;
pub mod report;
pub mod scanner;
pub mod store;
pub mod types;
pub mod version;
pub mod versioninfo;

// --- 주요 타입 re-export ---

pub use catalog::Catalog;
pub use error::ScannerError;
pub use evaluator::{BadVersionMatch, BoundStatus, RangeEvaluation, find_bad_version, is_bad_version};
pub use matcher::{PackageMatcher, RegexPackageMatcher};
pub use reconciler::{InventoryReconciler, ReconcileOutcome};
pub use report::{BadVersionAlert, FolderReport, FolderStatus, SweepReport};
pub use scanner::{InventoryScanner, InventoryScannerBuilder};
pub use store::{InventoryStore, MemoryStore, SqliteStore};
pub use types::{
    BadVersionRange, DiscoveredBinary, HostIdentity, InventoryRecord, Package, Signature,
    VersionQuad,
};
pub use version::{DottedVersion, compare};
pub use versioninfo::{BinaryVersionInfo, PeVersionReader, VersionInfoReader};
