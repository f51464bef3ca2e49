#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Maximum score any single criterion can award.
pub const CRITERION_MAX_SCORE: f64 = 5.0;

/// Criterion name for semantic relevance against the reference answer.
pub const RELEVANCE: &str = "Relevance";

/// Criterion name for the grammar and spelling check.
pub const GRAMMAR_AND_SPELLING: &str = "Grammar and Spelling";

/// Criterion name for word-count range adherence.
pub const WORD_COUNT_ADHERENCE: &str = "Word Count Adherence";

/// Prefix for relevance lines in the combined feedback.
pub const RELEVANCE_LABEL: &str = "Relevance";

/// Prefix for grammar lines in the combined feedback.
pub const GRAMMAR_LABEL: &str = "Grammar/Spelling";

/// Prefix for word-count lines in the combined feedback.
pub const WORD_COUNT_LABEL: &str = "Word Count";

/// Used when no criterion produced any feedback.
pub const FALLBACK_FEEDBACK: &str = "Evaluation complete. No specific feedback items generated.";

/// Score awarded when the word count misses the range on either side.
pub const WORD_COUNT_PENALTY_SCORE: f64 = 2.5;

/// How many grammar issue descriptions are quoted in feedback.
pub const GRAMMAR_ISSUES_QUOTED: usize = 3;

/// Issue-count buckets for the grammar criterion, as `(max issues, score)`.
/// Counts above the last bucket score zero.
pub const GRAMMAR_BUCKETS: [(usize, f64); 5] = [(0, 5.0), (2, 4.0), (4, 3.0), (6, 2.0), (8, 1.0)];

/// Characters of surrounding text shown on either side of a grammar match.
pub const GRAMMAR_CONTEXT_CHARS: usize = 20;

/// LanguageTool rule id for US English spelling mistakes.
pub const SPELLING_RULE_ID: &str = "MORFOLOGIK_RULE_EN_US";

/// Default OpenAI-compatible endpoint for embeddings.
pub const DEFAULT_EMBEDDING_ENDPOINT: &str = "https://api.openai.com/v1";

/// Default embedding model identifier.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Default LanguageTool server.
pub const DEFAULT_LANGUAGETOOL_URL: &str = "http://localhost:8081";

/// Default language passed to LanguageTool.
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Default socket address for the HTTP service.
pub const DEFAULT_BIND: &str = "0.0.0.0:5000";
