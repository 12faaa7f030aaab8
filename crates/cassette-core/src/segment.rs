use serde::{Deserialize, Serialize};

use crate::module::{Module, Perturbation};

/// What kind of element a segment is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    /// A perturbation module's own payload.
    Module,
    /// A joining motif inserted between payloads (intron, T2A, adaptors).
    Linker,
    /// A fixed terminal block (stuffer, barcode site, polyA).
    Hardcoded,
}

/// One annotated span of the assembled construct. Concatenating the
/// `sequence` fields of a segment list, in order, yields the full
/// construct sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub name: String,
    /// Nucleotides; may contain a placeholder `N` run, or be empty when
    /// a module's sequence could not be resolved.
    pub sequence: String,
    pub kind: SegmentKind,
    /// Present only for `kind == Module`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Perturbation>,
}

impl Segment {
    pub fn linker(name: &str, sequence: &str) -> Self {
        Self {
            name: name.to_string(),
            sequence: sequence.to_string(),
            kind: SegmentKind::Linker,
            action: None,
        }
    }

    pub fn hardcoded(name: &str, sequence: &str) -> Self {
        Self {
            name: name.to_string(),
            sequence: sequence.to_string(),
            kind: SegmentKind::Hardcoded,
            action: None,
        }
    }

    pub fn from_module(module: &Module) -> Self {
        Self {
            name: module.label(),
            sequence: module.sequence.clone(),
            kind: SegmentKind::Module,
            action: Some(module.perturbation),
        }
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// Concatenate a segment list into the full construct sequence.
pub fn concat_sequence(segments: &[Segment]) -> String {
    let total: usize = segments.iter().map(Segment::len).sum();
    let mut out = String::with_capacity(total);
    for s in segments {
        out.push_str(&s.sequence);
    }
    out
}
