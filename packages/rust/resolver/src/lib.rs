//! Source classification and content resolution.
//!
//! A source spec is one raw string from a job record: a URL, an inline
//! Base64 blob, or literal text. [`classify`] assigns the kind;
//! [`Resolver::resolve`] turns the spec into normalized plain text or a
//! typed failure. Failures never abort the run — the pipeline records
//! them per source and keeps going.

mod classify;
mod fetch;

use linkmill_shared::{LinkmillError, ResolvedContent, Result, SourceKind};
use tracing::{debug, instrument};

pub use classify::{base64_payload, classify};
pub use fetch::{Fetcher, HttpFetcher};

/// Resolves source specs into normalized text via an injected [`Fetcher`].
pub struct Resolver<F: Fetcher> {
    fetcher: F,
}

impl<F: Fetcher> Resolver<F> {
    /// Create a resolver backed by the given fetch capability.
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Resolve one source spec into normalized plain text.
    ///
    /// URL bodies get a second Base64 detection pass: a URL may point at
    /// Base64-encoded content, which is decoded transparently. Decode
    /// failures (valid-looking Base64 that is not UTF-8) are
    /// [`LinkmillError::Decode`]; transport failures are
    /// [`LinkmillError::Fetch`]. The plain-text path cannot fail.
    #[instrument(skip(self), fields(kind = tracing::field::Empty))]
    pub async fn resolve(&self, spec: &str) -> Result<ResolvedContent> {
        let kind = classify(spec);
        tracing::Span::current().record("kind", tracing::field::display(kind));

        match kind {
            SourceKind::Url => {
                let body = self.fetcher.fetch(spec).await?;

                // The fetched body may itself be Base64-encoded.
                match base64_payload(&body) {
                    Some(decoded) => {
                        let text = String::from_utf8(decoded).map_err(|e| {
                            LinkmillError::decode(format!("{spec}: body is not UTF-8 text: {e}"))
                        })?;
                        debug!(spec, "URL body decoded from Base64");
                        Ok(ResolvedContent {
                            text,
                            kind: SourceKind::Base64Text,
                            origin: spec.to_string(),
                        })
                    }
                    None => Ok(ResolvedContent {
                        text: body,
                        kind: SourceKind::PlainText,
                        origin: spec.to_string(),
                    }),
                }
            }

            SourceKind::Base64Text => {
                // classify() already proved the round-trip, so the decode
                // itself cannot fail here; UTF-8 conversion still can.
                let decoded = base64_payload(spec)
                    .ok_or_else(|| LinkmillError::decode("source no longer decodes as Base64"))?;
                let text = String::from_utf8(decoded).map_err(|e| {
                    LinkmillError::decode(format!("Base64 source is not UTF-8 text: {e}"))
                })?;
                Ok(ResolvedContent {
                    text,
                    kind: SourceKind::Base64Text,
                    origin: spec.to_string(),
                })
            }

            SourceKind::PlainText => Ok(ResolvedContent {
                text: spec.to_string(),
                kind: SourceKind::PlainText,
                origin: spec.to_string(),
            }),
        }
    }
}
