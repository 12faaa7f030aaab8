use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The perturbation a module applies to its target gene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Perturbation {
    Overexpression,
    Knockout,
    Knockdown,
    Knockin,
    Synthetic,
    Hardcoded,
}

impl Perturbation {
    /// Short tag used in segment labels, e.g. "BATF [OE]".
    pub fn tag(&self) -> &'static str {
        match self {
            Perturbation::Overexpression => "OE",
            Perturbation::Knockout => "KO",
            Perturbation::Knockdown => "KD",
            Perturbation::Knockin => "KI",
            Perturbation::Synthetic => "SYN",
            Perturbation::Hardcoded => "HC",
        }
    }

    /// Expression-type payloads sort before disruption-type payloads
    /// during assembly.
    pub fn is_disruption(&self) -> bool {
        matches!(self, Perturbation::Knockout | Perturbation::Knockdown)
    }

    /// Whether a sequence for this perturbation can be fetched from an
    /// external source. Synthetic and hardcoded payloads are always
    /// user-supplied.
    pub fn is_resolvable(&self) -> bool {
        matches!(
            self,
            Perturbation::Overexpression
                | Perturbation::Knockout
                | Perturbation::Knockdown
                | Perturbation::Knockin
        )
    }
}

impl std::fmt::Display for Perturbation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Perturbation::Overexpression => write!(f, "overexpression"),
            Perturbation::Knockout => write!(f, "knockout"),
            Perturbation::Knockdown => write!(f, "knockdown"),
            Perturbation::Knockin => write!(f, "knockin"),
            Perturbation::Synthetic => write!(f, "synthetic"),
            Perturbation::Hardcoded => write!(f, "hardcoded"),
        }
    }
}

/// Provenance tag recording which external data source produced a
/// module's sequence. A source that no longer matches the module's
/// declared perturbation marks the sequence as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceSource {
    Grch38Cdna,
    Grch37Cdna,
    GuideRna,
    ShortHairpin,
    Synthetic,
}

impl SequenceSource {
    /// Whether a sequence from this source is valid for the given
    /// perturbation. Overexpression accepts either reference build;
    /// knockin additionally accepts synthetic payloads.
    pub fn satisfies(&self, perturbation: Perturbation) -> bool {
        match perturbation {
            Perturbation::Overexpression => {
                matches!(self, SequenceSource::Grch38Cdna | SequenceSource::Grch37Cdna)
            }
            Perturbation::Knockout => matches!(self, SequenceSource::GuideRna),
            Perturbation::Knockdown => matches!(self, SequenceSource::ShortHairpin),
            Perturbation::Knockin => matches!(
                self,
                SequenceSource::Grch38Cdna
                    | SequenceSource::Grch37Cdna
                    | SequenceSource::Synthetic
            ),
            Perturbation::Synthetic | Perturbation::Hardcoded => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SequenceSource::Grch38Cdna => "grch38_cdna",
            SequenceSource::Grch37Cdna => "grch37_cdna",
            SequenceSource::GuideRna => "guide_rna",
            SequenceSource::ShortHairpin => "short_hairpin",
            SequenceSource::Synthetic => "synthetic",
        }
    }

    pub fn from_str_tag(s: &str) -> Option<Self> {
        match s {
            "grch38_cdna" => Some(SequenceSource::Grch38Cdna),
            "grch37_cdna" => Some(SequenceSource::Grch37Cdna),
            "guide_rna" => Some(SequenceSource::GuideRna),
            "short_hairpin" => Some(SequenceSource::ShortHairpin),
            "synthetic" => Some(SequenceSource::Synthetic),
            _ => None,
        }
    }
}

/// One perturbation unit: a gene targeted for overexpression, knockout,
/// knockdown, or knock-in, plus its (possibly still unresolved)
/// nucleotide sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub id: Uuid,
    /// Gene symbol or custom label.
    pub name: String,
    pub perturbation: Perturbation,
    /// Nucleotide sequence, empty until resolved.
    #[serde(default)]
    pub sequence: String,
    #[serde(default)]
    pub source: Option<SequenceSource>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Module {
    pub fn new(name: impl Into<String>, perturbation: Perturbation) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            perturbation,
            sequence: String::new(),
            source: None,
            description: None,
        }
    }

    pub fn with_sequence(
        name: impl Into<String>,
        perturbation: Perturbation,
        sequence: impl Into<String>,
        source: SequenceSource,
    ) -> Self {
        let mut m = Self::new(name, perturbation);
        m.sequence = sequence.into().to_uppercase();
        m.source = Some(source);
        m
    }

    /// Segment label for this module, e.g. "PDCD1 [KO]".
    pub fn label(&self) -> String {
        format!("{} [{}]", self.name, self.perturbation.tag())
    }

    /// The sequence is authoritative only while its provenance matches
    /// the declared perturbation; anything else must be re-resolved
    /// before assembly.
    pub fn is_current(&self) -> bool {
        if self.sequence.is_empty() {
            return false;
        }
        if !self.perturbation.is_resolvable() {
            return true;
        }
        match self.source {
            Some(src) => src.satisfies(self.perturbation),
            None => false,
        }
    }
}
