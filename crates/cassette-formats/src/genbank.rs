//! GenBank flat-file writer for assembled constructs.
//!
//! The column widths, the 60/10 ORIGIN layout, and the `//` terminator
//! are load-bearing: downstream sequence editors reject records that
//! deviate from them.

use cassette_core::segment::{concat_sequence, Segment, SegmentKind};

const LOCUS_NAME_WIDTH: usize = 16;

/// Render a construct name, its ordered segment list, and an optional
/// predicted-function description into a GenBank record.
///
/// An empty segment list produces a valid, empty-bodied record.
pub fn serialize(name: &str, segments: &[Segment], definition: Option<&str>) -> String {
    let total: usize = segments.iter().map(Segment::len).sum();
    let mut out = String::new();

    let name_field: String = name.chars().take(LOCUS_NAME_WIDTH).collect();
    out.push_str(&format!(
        "LOCUS       {:<width$}{:>12} bp    DNA\n",
        name_field,
        total,
        width = LOCUS_NAME_WIDTH
    ));

    out.push_str(&format!(
        "DEFINITION  {}\n",
        definition.unwrap_or("Synthetic construct")
    ));

    if !segments.is_empty() {
        out.push_str("FEATURES             Location/Qualifiers\n");

        let mut pos = 0usize;
        for seg in segments {
            let len = seg.len();
            if len == 0 {
                // Unresolved payloads occupy no bases; emitting them
                // would break the coordinate partition.
                continue;
            }
            let start = pos + 1;
            let end = pos + len;
            pos = end;

            out.push_str(&format!("     {:<16}{}..{}\n", "misc_feature", start, end));
            out.push_str(&format!(
                "                     /label=\"{}\"\n",
                feature_label(seg)
            ));
        }
    }

    out.push_str("ORIGIN\n");
    let bases: Vec<char> = concat_sequence(segments).to_lowercase().chars().collect();
    for (chunk_idx, chunk) in bases.chunks(60).enumerate() {
        out.push_str(&format!("{:>9}", chunk_idx * 60 + 1));
        for sub_chunk in chunk.chunks(10) {
            out.push(' ');
            out.extend(sub_chunk.iter());
        }
        out.push('\n');
    }

    out.push_str("//\n");
    out
}

/// Module segments are labeled "<name> [<TAG>]"; a name that already
/// carries a bracketed tag is used as-is to avoid double tagging.
fn feature_label(seg: &Segment) -> String {
    if seg.kind == SegmentKind::Module && !seg.name.trim_end().ends_with(']') {
        if let Some(action) = seg.action {
            return format!("{} [{}]", seg.name, action.tag());
        }
    }
    seg.name.clone()
}
