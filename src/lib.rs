pub mod bootstrap;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod notify;
pub mod pages;
pub mod persist;
pub mod providers;
pub mod registry;
pub mod updates;

mod utils;

pub use bootstrap::Tome;
pub use error::TomeError;
