//! Vendor key file loading.

use std::path::Path;

use crate::error::{RegdefError, RegdefResult};

/// Read the vendor key file verbatim.
pub fn load_vendor_key(path: &Path) -> RegdefResult<String> {
    if !path.exists() {
        return Err(RegdefError::FileMissing {
            path: path.to_path_buf(),
        });
    }

    std::fs::read_to_string(path).map_err(|e| RegdefError::FileUnreadable {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
