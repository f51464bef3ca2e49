#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use itertools::Itertools;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    constants::{GRAMMAR_CONTEXT_CHARS, SPELLING_RULE_ID},
    util,
};

/// Outcome of asking a grammar checker about a piece of text.
#[derive(Debug, Clone, PartialEq)]
pub enum GrammarCheck {
    /// The checker ran. `issues` holds human-readable descriptions in the
    /// order they were found; `count` is the total number of findings.
    Completed {
        /// Issue descriptions.
        issues: Vec<String>,
        /// Number of issues found.
        count:  usize,
    },
    /// The checker was reachable as a component but could not analyse the
    /// text. `reason` is shown to the teacher verbatim.
    ToolFailed {
        /// Why the check did not run.
        reason: String,
    },
}

impl GrammarCheck {
    /// A check that found nothing.
    pub fn clean() -> Self {
        GrammarCheck::Completed {
            issues: Vec::new(),
            count:  0,
        }
    }

    /// A completed check whose count is the number of descriptions.
    pub fn issues<I, S>(issues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let issues: Vec<String> = issues.into_iter().map(Into::into).collect();
        let count = issues.len();
        GrammarCheck::Completed { issues, count }
    }
}

/// A grammar and spelling checker.
///
/// An `Err` means the checker itself could not be set up; this is reported
/// differently from [`GrammarCheck::ToolFailed`] and from a clean result.
pub trait GrammarChecker: Send + Sync {
    /// Checks `text`. Flawless text yields [`GrammarCheck::clean`].
    fn check(&self, text: &str) -> Result<GrammarCheck>;
}

/// Errors raised while connecting to a LanguageTool server.
#[derive(thiserror::Error, Debug)]
pub enum LanguageToolError {
    /// The server did not answer.
    #[error("LanguageTool server at {url} could not be reached")]
    Unreachable {
        /// Server base URL.
        url:    String,
        /// Underlying HTTP error.
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with something other than the expected JSON.
    #[error("LanguageTool server at {url} returned an unexpected response")]
    InvalidResponse {
        /// Server base URL.
        url:    String,
        /// Underlying decoding error.
        #[source]
        source: reqwest::Error,
    },
    /// The server does not offer the configured language.
    #[error("LanguageTool server at {url} does not support language `{language}`")]
    UnsupportedLanguage {
        /// Server base URL.
        url:      String,
        /// Requested language code.
        language: String,
    },
}

/// One entry of `GET /v2/languages`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LanguageEntry {
    /// Short code, e.g. `en`.
    code:      String,
    /// Full code, e.g. `en-US`.
    long_code: String,
}

/// Body of `POST /v2/check`.
#[derive(Debug, Deserialize)]
struct CheckResponse {
    /// Findings, in text order.
    #[serde(default)]
    matches: Vec<CheckMatch>,
}

/// A single LanguageTool finding.
#[derive(Debug, Deserialize)]
struct CheckMatch {
    /// Human-readable explanation.
    message:      String,
    /// Start of the flagged span, in characters.
    offset:       usize,
    /// Length of the flagged span, in characters.
    length:       usize,
    /// Suggested corrections.
    #[serde(default)]
    replacements: Vec<Replacement>,
    /// Surrounding text, when the server sends it.
    #[serde(default)]
    context:      Option<MatchContext>,
    /// The rule that fired.
    rule:         Rule,
}

/// A suggested correction.
#[derive(Debug, Deserialize)]
struct Replacement {
    /// Replacement text.
    value: String,
}

/// Context block of a finding; only its presence matters here.
#[derive(Debug, Deserialize)]
struct MatchContext {
    /// Excerpt of the checked text.
    #[allow(dead_code)]
    text: String,
}

/// Rule metadata of a finding.
#[derive(Debug, Deserialize)]
struct Rule {
    /// Rule identifier.
    id: String,
}

/// An initialized connection to a LanguageTool server.
#[derive(Debug)]
struct Session {
    /// Language code accepted by the server.
    language: String,
}

/// Grammar checking backed by a LanguageTool HTTP server.
///
/// The server handshake runs at most once per handle, on first use; callers
/// that race on first use wait for the same handshake. A failed handshake is
/// not cached.
pub struct LanguageTool {
    /// Server base URL, without trailing slash.
    base_url: String,
    /// Requested language code.
    language: String,
    /// Shared HTTP client.
    client:   Client,
    /// Established session, once the handshake succeeded.
    session:  Mutex<Option<Arc<Session>>>,
}

impl LanguageTool {
    /// Creates a handle; nothing is sent until the first check.
    pub fn new(base_url: impl Into<String>, language: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            language: language.into(),
            client,
            session: Mutex::new(None),
        }
    }

    /// Returns the server base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether the handshake has completed.
    pub fn is_initialized(&self) -> bool {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Returns the session, performing the handshake if needed.
    fn session(&self) -> Result<Arc<Session>> {
        let mut slot = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(session) = slot.as_ref() {
            return Ok(Arc::clone(session));
        }

        tracing::info!(url = %self.base_url, language = %self.language, "Initializing LanguageTool");
        let session = Arc::new(util::block_on(self.handshake())??);
        *slot = Some(Arc::clone(&session));
        Ok(session)
    }

    /// Confirms the server is up and supports the configured language.
    async fn handshake(&self) -> Result<Session, LanguageToolError> {
        let url = format!("{}/v2/languages", self.base_url);
        let languages: Vec<LanguageEntry> = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|source| LanguageToolError::Unreachable {
                url: self.base_url.clone(),
                source,
            })?
            .json()
            .await
            .map_err(|source| LanguageToolError::InvalidResponse {
                url: self.base_url.clone(),
                source,
            })?;

        languages
            .iter()
            .find(|entry| {
                entry.long_code.eq_ignore_ascii_case(&self.language)
                    || entry.code.eq_ignore_ascii_case(&self.language)
            })
            .map(|entry| Session {
                language: entry.long_code.clone(),
            })
            .ok_or_else(|| LanguageToolError::UnsupportedLanguage {
                url:      self.base_url.clone(),
                language: self.language.clone(),
            })
    }

    /// Sends `text` to `/v2/check`.
    async fn request_check(
        &self,
        session: &Session,
        text: &str,
    ) -> Result<CheckResponse, LanguageToolError> {
        let url = format!("{}/v2/check", self.base_url);
        self.client
            .post(&url)
            .form(&[("text", text), ("language", session.language.as_str())])
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|source| LanguageToolError::Unreachable {
                url: self.base_url.clone(),
                source,
            })?
            .json()
            .await
            .map_err(|source| LanguageToolError::InvalidResponse {
                url: self.base_url.clone(),
                source,
            })
    }
}

impl GrammarChecker for LanguageTool {
    fn check(&self, text: &str) -> Result<GrammarCheck> {
        if text.trim().is_empty() {
            return Ok(GrammarCheck::clean());
        }

        let session = self.session()?;
        match util::block_on(self.request_check(&session, text))? {
            Ok(response) => {
                let issues: Vec<String> =
                    response.matches.iter().map(|m| describe_match(m, text)).collect();
                let count = issues.len();
                Ok(GrammarCheck::Completed { issues, count })
            }
            Err(e) => {
                tracing::error!("Grammar check failed: {e:#}");
                Ok(GrammarCheck::ToolFailed {
                    reason: format!(
                        "LanguageTool Error: Could not perform grammar/spelling check due to: \
                         {e}. Please ensure the LanguageTool server at {} is running.",
                        self.base_url
                    ),
                })
            }
        }
    }
}

/// Renders a finding as a one-line description: spelling suggestions when
/// available, otherwise the flagged span in its surrounding text.
fn describe_match(m: &CheckMatch, text: &str) -> String {
    let mut message = format!("Issue: '{}'.", m.message);

    if m.rule.id == SPELLING_RULE_ID
        && !m.replacements.is_empty()
        && m.message.starts_with("Possible spelling mistake")
    {
        let suggestions = m.replacements.iter().take(3).map(|r| r.value.as_str()).join(", ");
        message.push_str(&format!(" Did you mean: {suggestions}?"));
    } else if m.context.is_some() {
        let chars: Vec<char> = text.chars().collect();
        let start = m.offset.min(chars.len());
        let end = m.offset.saturating_add(m.length).min(chars.len());
        let before: String = chars[start.saturating_sub(GRAMMAR_CONTEXT_CHARS)..start]
            .iter()
            .collect();
        let flagged: String = chars[start..end].iter().collect();
        let after: String = chars[end..end.saturating_add(GRAMMAR_CONTEXT_CHARS).min(chars.len())]
            .iter()
            .collect();
        message.push_str(&format!(" Context: ...{before}[{flagged}]{after}..."));
    }

    message
}
