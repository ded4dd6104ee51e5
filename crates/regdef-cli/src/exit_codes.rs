//! Exit codes for `regdef`.
//! Pipeline failures use `RegdefError::exit_code`; these cover the rest.

pub const SUCCESS: i32 = 0;
pub const OUTPUT_ERROR: i32 = 6; // Output file could not be written
