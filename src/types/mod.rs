pub mod error;

pub use error::{ErrorCategory, ErrorClassifier, ForgeError, LlmError, Result};
