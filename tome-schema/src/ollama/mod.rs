mod tag_list;

pub use tag_list::{OllamaModel, OllamaTagList};
