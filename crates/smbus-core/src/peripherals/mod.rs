//! Peripheral device models attachable to an [`SmbusBus`](crate::SmbusBus).

/// Xcalibur-class register-file video encoder.
pub mod register_file;

pub use register_file::RegisterFileDevice;
