pub mod arch;
pub mod image;
