mod model_list;

pub use model_list::{GeminiModel, GeminiModelList};
