pub mod cache;
pub mod client;
pub mod orchestrate;
pub mod resolver;

use cassette_core::module::{Module, Perturbation, SequenceSource};
use thiserror::Error;

pub use cache::SequenceCache;
pub use orchestrate::{resolve_cassette, resolve_modules, ResolutionWarning};
pub use resolver::{GeneResolver, ResolverConfig};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned HTTP {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("rate limited after {0} attempts")]
    RateLimited(u32),
    #[error("invalid gene symbol {0:?}")]
    InvalidSymbol(String),
    #[error("no gene found for symbol {0:?}")]
    GeneNotFound(String),
    #[error("no {requested} sequence available for {symbol:?}{}", alternate_hint(.alternate))]
    NoSource {
        symbol: String,
        requested: Perturbation,
        alternate: Option<Perturbation>,
    },
    #[error("unexpected payload from sequence source: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("invalid symbol pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("sequence cache error: {0}")]
    Cache(#[from] rusqlite::Error),
}

fn alternate_hint(alternate: &Option<Perturbation>) -> String {
    match alternate {
        Some(p) => format!("; try {p} instead"),
        None => String::new(),
    }
}

/// Options controlling one resolution pass.
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    /// Bypass cache and currency checks, always refetch.
    pub force_refresh: bool,
    /// Require the source kind to match the declared perturbation.
    pub enforce_type_source: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            force_refresh: false,
            enforce_type_source: true,
        }
    }
}

/// A successfully resolved sequence plus its provenance.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub sequence: String,
    pub source: SequenceSource,
}

/// Anything that can produce a sequence for a module.
pub trait SequenceResolver: Sync {
    fn resolve(&self, module: &Module, options: &ResolveOptions)
        -> Result<Resolved, ResolveError>;
}
