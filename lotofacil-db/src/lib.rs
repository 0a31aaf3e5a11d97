pub mod db;
pub mod models;
pub mod source;

pub use rusqlite;
