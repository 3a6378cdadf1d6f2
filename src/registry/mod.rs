mod client;
mod query;

pub use client::RegistryClient;
pub use query::{LOCAL_ONLY_FILTER, encode_search_text, search_terms};
