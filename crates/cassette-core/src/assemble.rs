//! The cassette assembly grammar: module list in, ordered segment list out.

use crate::linker;
use crate::module::{Module, Perturbation};
use crate::segment::Segment;

pub const INTRON_NAME: &str = "Intron";
pub const T2A_NAME: &str = "T2A";
pub const STOP_TRIPLEX_ADAPTOR_NAME: &str = "STOP-Triplex-Adaptor";
pub const STOP_NAME: &str = "STOP";
pub const TRIPLEX_NAME: &str = "Triplex";
pub const ADAPTOR_NAME: &str = "Adaptor";
pub const STUFFER_NAME: &str = "Internal Stuffer";
pub const BARCODES_NAME: &str = "Barcodes";
pub const POLYA_NAME: &str = "polyA";

/// Stable partition of modules into assembly order: expression payloads
/// (overexpression, knockin, plus user-supplied synthetic/hardcoded
/// payloads) first, disruption payloads (knockout, knockdown) last.
/// Relative input order is preserved within each group.
pub fn reorder(modules: &[Module]) -> Vec<&Module> {
    let mut ordered: Vec<&Module> = Vec::with_capacity(modules.len());
    ordered.extend(modules.iter().filter(|m| !m.perturbation.is_disruption()));
    ordered.extend(modules.iter().filter(|m| m.perturbation.is_disruption()));
    ordered
}

/// Assemble an ordered module list into the canonical annotated segment
/// list. Pure: modules must already carry their resolved sequences; a
/// module with an empty sequence contributes a zero-length segment.
///
/// The barcode site is always emitted in placeholder form; substituting
/// a concrete barcode is the integrator's job.
pub fn assemble(modules: &[Module]) -> Vec<Segment> {
    let ordered = reorder(modules);
    if ordered.is_empty() {
        return Vec::new();
    }

    let first_disruption = ordered.iter().position(|m| m.perturbation.is_disruption());
    let has_knockin = ordered
        .iter()
        .any(|m| m.perturbation == Perturbation::Knockin);
    let last = ordered.len() - 1;

    let mut segments = Vec::new();

    for (i, module) in ordered.iter().enumerate() {
        match module.perturbation {
            Perturbation::Overexpression | Perturbation::Knockin => {
                segments.push(Segment::linker(INTRON_NAME, linker::INTRON));
            }
            Perturbation::Knockout | Perturbation::Knockdown => {
                if Some(i) == first_disruption {
                    segments.push(Segment::linker(
                        STOP_TRIPLEX_ADAPTOR_NAME,
                        &stop_triplex_adaptor(),
                    ));
                } else {
                    segments.push(Segment::linker(ADAPTOR_NAME, linker::ADAPTOR));
                }
            }
            Perturbation::Synthetic | Perturbation::Hardcoded => {}
        }

        segments.push(Segment::from_module(module));

        if module.perturbation == Perturbation::Overexpression && i != last {
            segments.push(Segment::linker(T2A_NAME, linker::T2A));
        }
        if module.perturbation == Perturbation::Knockin {
            push_barcode_site(&mut segments);
        }
    }

    // Cassettes without a knock-in still get exactly one barcode site,
    // appended globally.
    if !has_knockin {
        push_barcode_site(&mut segments);
    }

    if ordered[last].perturbation.is_disruption() {
        segments.push(Segment::hardcoded(POLYA_NAME, linker::POLY_A));
    }

    segments
}

/// The combined stop / triplex / adaptor block placed before the first
/// disruption payload.
pub fn stop_triplex_adaptor() -> String {
    let mut s = String::with_capacity(
        linker::STOP_CODONS.len() + linker::TRIPLEX.len() + linker::ADAPTOR.len(),
    );
    s.push_str(linker::STOP_CODONS);
    s.push_str(linker::TRIPLEX);
    s.push_str(linker::ADAPTOR);
    s
}

fn push_barcode_site(segments: &mut Vec<Segment>) {
    segments.push(Segment::hardcoded(STUFFER_NAME, linker::INTERNAL_STUFFER));
    segments.push(Segment::hardcoded(BARCODES_NAME, linker::BARCODE_PLACEHOLDER));
}
