#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Text embeddings and cosine similarity.
pub mod embedding;
/// Grammar and spelling checking.
pub mod grammar;

pub use embedding::{Embedder, OpenAiEmbedder, cosine_similarity};
pub use grammar::{GrammarCheck, GrammarChecker, LanguageTool, LanguageToolError};
