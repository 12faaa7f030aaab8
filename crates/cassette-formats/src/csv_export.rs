//! Batch CSV export with a globally stable column schema.
//!
//! Cassettes in one batch rarely share a shape: module counts differ and
//! hardcoded linkers repeat different numbers of times. The exporter
//! first walks every cassette's segment list to build one global ordered
//! token list, then fills each row against that schema, leaving columns
//! empty where a cassette has fewer occurrences.

use std::collections::{HashMap, HashSet};

use cassette_core::assemble::{self, STOP_NAME, STOP_TRIPLEX_ADAPTOR_NAME, TRIPLEX_NAME};
use cassette_core::linker;
use cassette_core::segment::{concat_sequence, Segment, SegmentKind};
use cassette_core::Cassette;
use rayon::prelude::*;

use crate::ExportError;

const FIXED_HEADER: [&str; 5] = [
    "cassette_id",
    "barcode",
    "barcode_index",
    "modules",
    "final_length",
];

/// One column-producing slot in the global schema, in the order it first
/// became necessary across the cassette set.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SchemaToken {
    /// Nth occurrence of a non-module component within one cassette.
    Component { key: String, occurrence: usize },
    /// Kth module of a cassette (1-based); expands to name + sequence.
    ModuleSlot(usize),
}

/// Serialize a batch of cassettes into one CSV string. Assembly runs in
/// parallel across cassettes; rows are emitted in input order.
pub fn export_batch(cassettes: &[Cassette]) -> Result<String, ExportError> {
    let assembled: Vec<Vec<Segment>> = cassettes
        .par_iter()
        .map(|c| assemble::assemble(&c.modules))
        .collect();
    let exploded: Vec<Vec<Segment>> = assembled.iter().map(|s| explode(s)).collect();

    let tokens = build_schema(&exploded);
    log::debug!(
        "batch schema: {} cassettes, {} tokens",
        cassettes.len(),
        tokens.len()
    );

    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());

    writer.write_record(header(&tokens))?;
    for (i, cassette) in cassettes.iter().enumerate() {
        writer.write_record(row(cassette, &assembled[i], &exploded[i], &tokens))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(csv::IntoInnerError::into_error)?;
    Ok(String::from_utf8(bytes)?)
}

/// Split compound segments so each schema slot maps to one atomic
/// biological element.
fn explode(segments: &[Segment]) -> Vec<Segment> {
    let mut out = Vec::with_capacity(segments.len() + 2);
    for seg in segments {
        if seg.name == STOP_TRIPLEX_ADAPTOR_NAME {
            out.push(Segment::linker(STOP_NAME, linker::STOP_CODONS));
            out.push(Segment::linker(TRIPLEX_NAME, linker::TRIPLEX));
            out.push(Segment::linker(assemble::ADAPTOR_NAME, linker::ADAPTOR));
        } else {
            out.push(seg.clone());
        }
    }
    out
}

/// Column key for a non-module component: lower-cased name with runs of
/// non-alphanumeric characters collapsed to `_`.
fn component_key(name: &str) -> String {
    let mut key = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !key.is_empty() {
                key.push('_');
            }
            pending_sep = false;
            key.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    key
}

fn build_schema(exploded: &[Vec<Segment>]) -> Vec<SchemaToken> {
    let mut tokens = Vec::new();
    let mut seen_components: HashSet<(String, usize)> = HashSet::new();
    let mut seen_slots: HashSet<usize> = HashSet::new();

    for segments in exploded {
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut module_slot = 0usize;

        for seg in segments {
            if seg.kind == SegmentKind::Module {
                module_slot += 1;
                if seen_slots.insert(module_slot) {
                    tokens.push(SchemaToken::ModuleSlot(module_slot));
                }
            } else {
                let key = component_key(&seg.name);
                let occurrence = counts
                    .entry(key.clone())
                    .and_modify(|n| *n += 1)
                    .or_insert(1);
                if seen_components.insert((key.clone(), *occurrence)) {
                    tokens.push(SchemaToken::Component {
                        key,
                        occurrence: *occurrence,
                    });
                }
            }
        }
    }

    tokens
}

fn header(tokens: &[SchemaToken]) -> Vec<String> {
    let mut header: Vec<String> = FIXED_HEADER.iter().map(|s| s.to_string()).collect();
    for token in tokens {
        match token {
            SchemaToken::Component { key, occurrence } => {
                header.push(format!("{key}_{occurrence}_sequence"));
            }
            SchemaToken::ModuleSlot(k) => {
                header.push(format!("module_{k}_name"));
                header.push(format!("module_{k}_sequence"));
            }
        }
    }
    header.push("final_sequence".to_string());
    header
}

fn row(
    cassette: &Cassette,
    segments: &[Segment],
    exploded: &[Segment],
    tokens: &[SchemaToken],
) -> Vec<String> {
    let (barcode_index, barcode) = cassette.split_barcode();
    let full_sequence = concat_sequence(segments);

    let mut row = vec![
        cassette.id.to_string(),
        barcode.unwrap_or_default().to_string(),
        barcode_index.unwrap_or_default().to_string(),
        cassette.module_summary(),
        full_sequence.len().to_string(),
    ];

    // Bucket this cassette's occurrences against the global schema.
    let mut components: HashMap<(String, usize), &str> = HashMap::new();
    let mut modules: Vec<(&str, &str)> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for seg in exploded {
        if seg.kind == SegmentKind::Module {
            modules.push((seg.name.as_str(), seg.sequence.as_str()));
        } else {
            let key = component_key(&seg.name);
            let occurrence = counts
                .entry(key.clone())
                .and_modify(|n| *n += 1)
                .or_insert(1);
            components.insert((key, *occurrence), seg.sequence.as_str());
        }
    }

    for token in tokens {
        match token {
            SchemaToken::Component { key, occurrence } => {
                let value = components
                    .get(&(key.clone(), *occurrence))
                    .copied()
                    .unwrap_or_default();
                row.push(value.to_string());
            }
            SchemaToken::ModuleSlot(k) => match modules.get(k - 1) {
                Some((name, sequence)) => {
                    row.push(name.to_string());
                    row.push(sequence.to_string());
                }
                None => {
                    row.push(String::new());
                    row.push(String::new());
                }
            },
        }
    }

    row.push(full_sequence);
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use cassette_core::module::{Module, Perturbation, SequenceSource};

    fn oe(name: &str) -> Module {
        Module::with_sequence(
            name,
            Perturbation::Overexpression,
            "ATGGAGCAAGGC",
            SequenceSource::Grch38Cdna,
        )
    }

    fn ko(name: &str) -> Module {
        Module::with_sequence(
            name,
            Perturbation::Knockout,
            "GACGTAGACGTAGACGTAGA",
            SequenceSource::GuideRna,
        )
    }

    fn cassette(name: &str, modules: Vec<Module>) -> Cassette {
        let mut c = Cassette::new(name);
        for m in modules {
            c.add_module(m);
        }
        c
    }

    fn header_of(csv_text: &str) -> Vec<String> {
        csv_text
            .lines()
            .next()
            .unwrap()
            .split(',')
            .map(|f| f.trim_matches('"').to_string())
            .collect()
    }

    #[test]
    fn test_component_key() {
        assert_eq!(component_key("Internal Stuffer"), "internal_stuffer");
        assert_eq!(component_key("polyA"), "polya");
        assert_eq!(component_key("T2A"), "t2a");
        assert_eq!(component_key("STOP-Triplex-Adaptor"), "stop_triplex_adaptor");
    }

    #[test]
    fn test_schema_grows_to_widest_cassette() {
        let a = cassette("a", vec![oe("BATF"), ko("PDCD1")]);
        let b = cassette("b", vec![oe("BATF"), oe("TCF7"), ko("PDCD1")]);
        let out = export_batch(&[a, b]).unwrap();
        let header = header_of(&out);

        for col in [
            "module_1_name",
            "module_1_sequence",
            "module_2_name",
            "module_3_name",
            "module_3_sequence",
        ] {
            assert!(header.contains(&col.to_string()), "missing column {col}");
        }
    }

    #[test]
    fn test_compound_segment_explodes_into_columns() {
        let a = cassette("a", vec![oe("BATF"), ko("PDCD1")]);
        let out = export_batch(&[a]).unwrap();
        let header = header_of(&out);

        for col in [
            "stop_1_sequence",
            "triplex_1_sequence",
            "adaptor_1_sequence",
            "intron_1_sequence",
            "t2a_1_sequence",
            "internal_stuffer_1_sequence",
            "barcodes_1_sequence",
            "polya_1_sequence",
        ] {
            assert!(header.contains(&col.to_string()), "missing column {col}");
        }
        assert!(!header.contains(&"stop_triplex_adaptor_1_sequence".to_string()));
    }

    #[test]
    fn test_fixed_columns_and_trailing_final_sequence() {
        let a = cassette("a", vec![oe("BATF")]);
        let out = export_batch(&[a]).unwrap();
        let header = header_of(&out);
        assert_eq!(
            &header[..5],
            &[
                "cassette_id",
                "barcode",
                "barcode_index",
                "modules",
                "final_length"
            ]
        );
        assert_eq!(header.last().unwrap(), "final_sequence");
    }

    #[test]
    fn test_barcode_index_split() {
        let mut a = cassette("a", vec![oe("BATF")]);
        a.barcode = Some("42|ACGTACGT".to_string());
        let mut b = cassette("b", vec![oe("TCF7")]);
        b.barcode = Some("TTTTGGGG".to_string());
        let out = export_batch(&[a, b]).unwrap();

        let rows: Vec<&str> = out.lines().collect();
        assert!(rows[1].contains("\"ACGTACGT\",\"42\""));
        assert!(rows[2].contains("\"TTTTGGGG\",\"\""));
    }

    #[test]
    fn test_every_field_is_quoted() {
        let a = cassette("a", vec![oe("BATF")]);
        let out = export_batch(&[a]).unwrap();
        for line in out.lines() {
            assert!(line.starts_with('"') && line.ends_with('"'));
        }
    }

    #[test]
    fn test_shorter_cassette_leaves_columns_empty() {
        let a = cassette("a", vec![oe("BATF")]);
        let b = cassette("b", vec![oe("BATF"), oe("TCF7")]);
        let out = export_batch(&[a, b]).unwrap();
        let header = header_of(&out);
        let slot = header.iter().position(|h| h == "module_2_name").unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(out.as_bytes());
        let records: Vec<csv::StringRecord> =
            reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(&records[0][slot], "");
        assert_eq!(&records[1][slot], "TCF7 [OE]");
    }

    #[test]
    fn test_final_sequence_keeps_placeholder() {
        let a = cassette("a", vec![oe("BATF")]);
        let out = export_batch(&[a]).unwrap();
        // Barcode substitution never happens during batch export
        assert!(out.contains("NNNNNNNNNNN"));
    }

    #[test]
    fn test_rows_preserve_input_order() {
        let batch: Vec<Cassette> = (0..8)
            .map(|i| cassette(&format!("c{i}"), vec![oe("BATF")]))
            .collect();
        let ids: Vec<String> = batch.iter().map(|c| c.id.to_string()).collect();
        let out = export_batch(&batch).unwrap();
        let row_ids: Vec<String> = out
            .lines()
            .skip(1)
            .map(|l| l.split(',').next().unwrap().trim_matches('"').to_string())
            .collect();
        assert_eq!(row_ids, ids);
    }

    #[test]
    fn test_empty_batch() {
        let out = export_batch(&[]).unwrap();
        let header = header_of(&out);
        assert_eq!(header.first().unwrap(), "cassette_id");
        assert_eq!(header.last().unwrap(), "final_sequence");
        assert_eq!(out.lines().count(), 1);
    }
}
