pub mod csv;
pub mod format;
pub mod html;

pub use format::{decode, detect_format, encode, FileFormat};
