//! Post-assembly barcode substitution.

use crate::assemble::BARCODES_NAME;
use crate::linker::BARCODE_ANCHOR;
use crate::segment::Segment;

/// A usable barcode is a non-empty string over {A, C, G, T},
/// case-insensitive.
pub fn is_valid_barcode(barcode: &str) -> bool {
    !barcode.is_empty()
        && barcode
            .chars()
            .all(|c| matches!(c.to_ascii_uppercase(), 'A' | 'C' | 'G' | 'T'))
}

/// Substitute a concrete barcode into every placeholder segment of an
/// already-assembled segment list.
///
/// The leading `N` run of each `Barcodes` segment is replaced by the
/// uppercased barcode; if the barcode already ends with the fixed anchor
/// motif that the placeholder tail begins with, the duplicate anchor is
/// dropped from the tail. An invalid barcode leaves the input unchanged.
pub fn integrate_barcode(segments: &[Segment], barcode: &str) -> Vec<Segment> {
    if !is_valid_barcode(barcode) {
        return segments.to_vec();
    }
    let barcode = barcode.to_uppercase();

    segments
        .iter()
        .map(|s| {
            if s.name != BARCODES_NAME {
                return s.clone();
            }
            let mut out = s.clone();
            out.sequence = substitute(&s.sequence, &barcode);
            out
        })
        .collect()
}

fn substitute(placeholder: &str, barcode: &str) -> String {
    let n_run = placeholder
        .chars()
        .take_while(|c| matches!(c, 'N' | 'n'))
        .count();
    let mut tail = &placeholder[n_run..];
    if tail.starts_with(BARCODE_ANCHOR) && barcode.ends_with(BARCODE_ANCHOR) {
        tail = &tail[BARCODE_ANCHOR.len()..];
    }
    format!("{barcode}{tail}")
}
