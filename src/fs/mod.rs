//! FileSystem abstraction for testable file operations

mod backup;
mod mock;
mod real;
mod r#trait;

pub use backup::{backup_path, move_aside, move_aside_at};
pub use mock::MockFileSystem;
pub use r#trait::{FileSystem, FileType};
pub use real::RealFileSystem;
