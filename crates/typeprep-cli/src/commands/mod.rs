pub mod prepare;
pub mod version;
