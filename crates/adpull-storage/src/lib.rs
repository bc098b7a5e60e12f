//! # Adpull Storage
//!
//! Local persistence: the data-directory layout, the per-day SQLite
//! upsert of ad performance rows, and the account-structure TSV export.

pub mod layout;
pub mod performance;
pub mod structure;

pub use layout::{account_structure_path, ensure_parent_dir, performance_db_path};
pub use performance::{upsert_performance, PerformanceRow};
pub use structure::{write_account_structure, AccountStructureRow, STRUCTURE_HEADER};
