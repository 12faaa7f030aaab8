use cassette_core::module::Module;

/// Serialize one module as a single-record FASTA string:
/// `>name [TAG] - description` followed by the raw sequence.
pub fn serialize_module(module: &Module) -> String {
    let mut out = String::with_capacity(module.sequence.len() + 64);
    out.push('>');
    out.push_str(&module.label());
    if let Some(description) = module.description.as_deref() {
        out.push_str(" - ");
        out.push_str(description);
    }
    out.push('\n');
    out.push_str(&module.sequence);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cassette_core::module::{Perturbation, SequenceSource};

    #[test]
    fn test_single_record_with_description() {
        let mut m = Module::with_sequence(
            "PDCD1",
            Perturbation::Knockout,
            "GACGTAGACGTAGACGTAGA",
            SequenceSource::GuideRna,
        );
        m.description = Some("checkpoint receptor".to_string());
        assert_eq!(
            serialize_module(&m),
            ">PDCD1 [KO] - checkpoint receptor\nGACGTAGACGTAGACGTAGA\n"
        );
    }

    #[test]
    fn test_description_omitted_when_absent() {
        let m = Module::with_sequence(
            "BATF",
            Perturbation::Overexpression,
            "ATGGCC",
            SequenceSource::Grch38Cdna,
        );
        assert_eq!(serialize_module(&m), ">BATF [OE]\nATGGCC\n");
    }
}
