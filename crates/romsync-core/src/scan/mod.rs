//! Local device scanners.
//!
//! Both scanners degrade instead of failing: an unreadable directory is
//! logged and contributes nothing, so one bad platform never aborts a scan.

mod hash;
mod roms;
mod saves;

pub use hash::hash_file;
pub use roms::{scan_all_roms, scan_platform_roms, should_skip_file, LocalRomsBySlug};
pub use saves::find_save_files;
