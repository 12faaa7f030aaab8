//! Gene-database-backed sequence resolution: cDNA for expression
//! payloads, guide/hairpin designs for disruption payloads.

use cassette_core::module::{Module, Perturbation, SequenceSource};
use cassette_core::ops;
use regex::Regex;
use serde::Deserialize;

use crate::client::RestClient;
use crate::{ResolveError, ResolveOptions, Resolved, SequenceResolver};

/// Endpoints and identity for the external gene databases.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub ensembl_base_url: String,
    pub grch37_base_url: String,
    /// Companion guide-catalog service holding gRNA/shRNA designs.
    pub guide_base_url: String,
    pub user_agent: String,
    pub species: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            ensembl_base_url: "https://rest.ensembl.org".to_string(),
            grch37_base_url: "https://grch37.rest.ensembl.org".to_string(),
            guide_base_url: "http://127.0.0.1:8402".to_string(),
            user_agent: "cassette-resolve/0.1".to_string(),
            species: "homo_sapiens".to_string(),
        }
    }
}

/// Ensembl cross-reference entry. Only the fields we read are modeled;
/// everything else in the payload is ignored.
#[derive(Debug, Deserialize)]
struct Xref {
    id: String,
    #[serde(rename = "type")]
    kind: String,
}

/// One guide-catalog design. The catalog is a companion service under
/// our control, so its payload is validated strictly: unknown fields
/// are rejected instead of silently passed through.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GuideEntry {
    symbol: String,
    kind: GuideKind,
    sequence: String,
    #[serde(default)]
    strand: Option<char>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum GuideKind {
    GuideRna,
    ShortHairpin,
}

impl GuideKind {
    fn perturbation(&self) -> Perturbation {
        match self {
            GuideKind::GuideRna => Perturbation::Knockout,
            GuideKind::ShortHairpin => Perturbation::Knockdown,
        }
    }

    fn source(&self) -> SequenceSource {
        match self {
            GuideKind::GuideRna => SequenceSource::GuideRna,
            GuideKind::ShortHairpin => SequenceSource::ShortHairpin,
        }
    }
}

pub struct GeneResolver {
    grch38: RestClient,
    grch37: RestClient,
    guides: RestClient,
    species: String,
    symbol_re: Regex,
}

impl GeneResolver {
    pub fn new(config: &ResolverConfig) -> Result<Self, ResolveError> {
        Ok(Self {
            grch38: RestClient::new(&config.ensembl_base_url, &config.user_agent)?,
            grch37: RestClient::new(&config.grch37_base_url, &config.user_agent)?,
            guides: RestClient::new(&config.guide_base_url, &config.user_agent)?,
            species: config.species.clone(),
            symbol_re: Regex::new("^[A-Za-z0-9_.-]+$")?,
        })
    }

    fn check_symbol(&self, symbol: &str) -> Result<(), ResolveError> {
        if self.symbol_re.is_match(symbol) {
            Ok(())
        } else {
            Err(ResolveError::InvalidSymbol(symbol.to_string()))
        }
    }

    /// cDNA lookup: GRCh38 first, GRCh37 fallback. The provenance tag
    /// records which build answered.
    fn fetch_cdna(&self, symbol: &str) -> Result<Resolved, ResolveError> {
        match self.fetch_cdna_from(&self.grch38, symbol) {
            Ok(sequence) => Ok(Resolved {
                sequence,
                source: SequenceSource::Grch38Cdna,
            }),
            Err(primary) => {
                log::warn!("GRCh38 lookup failed for {symbol}: {primary}; trying GRCh37");
                let sequence = self
                    .fetch_cdna_from(&self.grch37, symbol)
                    .map_err(|_| primary)?;
                Ok(Resolved {
                    sequence,
                    source: SequenceSource::Grch37Cdna,
                })
            }
        }
    }

    fn fetch_cdna_from(
        &self,
        client: &RestClient,
        symbol: &str,
    ) -> Result<String, ResolveError> {
        let path = format!("/xrefs/symbol/{}/{}", self.species, symbol);
        let xrefs: Vec<Xref> = serde_json::from_value(client.get_json(&path)?)?;
        let gene = xrefs
            .into_iter()
            .find(|x| x.kind == "gene")
            .ok_or_else(|| ResolveError::GeneNotFound(symbol.to_string()))?;
        let sequence = client.get_text(&format!("/sequence/id/{}?type=cdna", gene.id))?;
        Ok(normalize(&sequence))
    }

    fn fetch_guide(
        &self,
        symbol: &str,
        requested: Perturbation,
        enforce: bool,
    ) -> Result<Resolved, ResolveError> {
        let payload = self.guides.get_json(&format!("/guides/{symbol}"))?;
        let entries: Vec<GuideEntry> = serde_json::from_value(payload)?;

        let wanted = match requested {
            Perturbation::Knockout => GuideKind::GuideRna,
            _ => GuideKind::ShortHairpin,
        };
        let matching = entries
            .iter()
            .filter(|e| e.symbol.eq_ignore_ascii_case(symbol));

        let mut fallback = None;
        for entry in matching {
            if entry.kind == wanted {
                return Ok(to_resolved(entry));
            }
            fallback.get_or_insert(entry);
        }

        match fallback {
            Some(entry) if !enforce => Ok(to_resolved(entry)),
            Some(entry) => Err(ResolveError::NoSource {
                symbol: symbol.to_string(),
                requested,
                alternate: Some(entry.kind.perturbation()),
            }),
            None => Err(ResolveError::NoSource {
                symbol: symbol.to_string(),
                requested,
                alternate: None,
            }),
        }
    }
}

impl SequenceResolver for GeneResolver {
    fn resolve(
        &self,
        module: &Module,
        options: &ResolveOptions,
    ) -> Result<Resolved, ResolveError> {
        self.check_symbol(&module.name)?;
        match module.perturbation {
            Perturbation::Overexpression | Perturbation::Knockin => {
                self.fetch_cdna(&module.name)
            }
            Perturbation::Knockout | Perturbation::Knockdown => self.fetch_guide(
                &module.name,
                module.perturbation,
                options.enforce_type_source,
            ),
            Perturbation::Synthetic | Perturbation::Hardcoded => {
                Err(ResolveError::NoSource {
                    symbol: module.name.clone(),
                    requested: module.perturbation,
                    alternate: None,
                })
            }
        }
    }
}

fn to_resolved(entry: &GuideEntry) -> Resolved {
    let mut sequence = normalize(&entry.sequence);
    // Catalog designs are stored on the genomic strand
    if entry.strand == Some('-') {
        sequence = ops::reverse_complement(&sequence);
    }
    Resolved {
        sequence,
        source: entry.kind.source(),
    }
}

/// Strip whitespace and digits from a fetched sequence body and
/// uppercase the bases.
fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}
