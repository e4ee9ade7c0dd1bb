mod raw;
mod types;

pub use raw::{
    RawCategoryPrompt, RawEmbeddingItem, RawEmbeddingPrompt, RawGenericPrompt,
    RawInteractiveItem, load_json, parse_embedding, parse_generic, parse_interactive,
};
pub use types::*;
