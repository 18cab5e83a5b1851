// src/options/mod.rs
mod keys;
mod resolver;
mod store;

pub use keys::{
    FieldKind, OptionKey, DEFAULT_GREETING, DEFAULT_PROMPT_LABEL, DEFAULT_PROMPT_TEXT,
    DEFAULT_REFRESH_URL, DEFAULT_START_URL, DEFAULT_WORKFLOW_ID,
};
pub use resolver::{ChatkitOptions, OptionsResolver, OPTION_NAME};
pub use store::{FileOptionsStore, MemoryOptionsStore, OptionsStore};

use std::collections::BTreeMap;

/// Stored configuration mapping, key name to value.
pub type OptionMap = BTreeMap<String, String>;

#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("options file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("options file is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),
}
