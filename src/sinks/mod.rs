pub mod database;
pub mod manifest;

pub use self::database::write_database;
pub use self::manifest::{Manifest, write_manifest};
