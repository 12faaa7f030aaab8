use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::module::Module;
use crate::ops;

/// One ordered construct: perturbation modules plus an optional barcode.
///
/// A barcode may carry a pool index encoded as `"<index>|<sequence>"`;
/// the left part is an opaque index label, the right part the actual
/// nucleotide barcode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cassette {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub modules: Vec<Module>,
    #[serde(default)]
    pub barcode: Option<String>,
}

impl Cassette {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            modules: Vec::new(),
            barcode: None,
        }
    }

    pub fn add_module(&mut self, module: Module) {
        self.modules.push(module);
    }

    /// Explicit reorder operation: move the module at `from` so it ends
    /// up at `to`. Out-of-range indices are clamped to the list.
    pub fn move_module(&mut self, from: usize, to: usize) {
        if self.modules.is_empty() || from >= self.modules.len() {
            return;
        }
        let module = self.modules.remove(from);
        let to = to.min(self.modules.len());
        self.modules.insert(to, module);
    }

    /// Split the barcode into its pool-index label and nucleotide parts.
    pub fn split_barcode(&self) -> (Option<&str>, Option<&str>) {
        match self.barcode.as_deref() {
            None => (None, None),
            Some(raw) => match raw.split_once('|') {
                Some((index, sequence)) => (Some(index), Some(sequence)),
                None => (None, Some(raw)),
            },
        }
    }

    /// `" + "`-joined module summary, e.g. "BATF [OE] + PDCD1 [KO]".
    pub fn module_summary(&self) -> String {
        self.modules
            .iter()
            .map(Module::label)
            .collect::<Vec<_>>()
            .join(" + ")
    }

    /// GC fraction across all module payloads currently held.
    pub fn gc_content(&self) -> f64 {
        let joined: String = self.modules.iter().map(|m| m.sequence.as_str()).collect();
        ops::gc_content(&joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{Perturbation, SequenceSource};

    fn cassette_with(names: &[&str]) -> Cassette {
        let mut c = Cassette::new("test");
        for n in names {
            c.add_module(Module::new(*n, Perturbation::Overexpression));
        }
        c
    }

    #[test]
    fn test_move_module() {
        let mut c = cassette_with(&["a", "b", "c"]);
        c.move_module(0, 2);
        let order: Vec<&str> = c.modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_move_module_clamps_out_of_range() {
        let mut c = cassette_with(&["a", "b"]);
        c.move_module(1, 99);
        let order: Vec<&str> = c.modules.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(order, vec!["a", "b"]);
        c.move_module(99, 0); // no-op
        assert_eq!(c.modules.len(), 2);
    }

    #[test]
    fn test_split_barcode_with_index() {
        let mut c = Cassette::new("test");
        c.barcode = Some("42|ACGTACGT".to_string());
        assert_eq!(c.split_barcode(), (Some("42"), Some("ACGTACGT")));
    }

    #[test]
    fn test_split_barcode_without_index() {
        let mut c = Cassette::new("test");
        c.barcode = Some("ACGTACGT".to_string());
        assert_eq!(c.split_barcode(), (None, Some("ACGTACGT")));
        c.barcode = None;
        assert_eq!(c.split_barcode(), (None, None));
    }

    #[test]
    fn test_module_summary() {
        let mut c = Cassette::new("test");
        c.add_module(Module::new("BATF", Perturbation::Overexpression));
        c.add_module(Module::new("PDCD1", Perturbation::Knockout));
        assert_eq!(c.module_summary(), "BATF [OE] + PDCD1 [KO]");
    }

    #[test]
    fn test_gc_content() {
        let mut c = Cassette::new("test");
        c.add_module(Module::with_sequence(
            "x",
            Perturbation::Overexpression,
            "GGCC",
            SequenceSource::Grch38Cdna,
        ));
        c.add_module(Module::with_sequence(
            "y",
            Perturbation::Overexpression,
            "AATT",
            SequenceSource::Grch38Cdna,
        ));
        assert!((c.gc_content() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut c = Cassette::new("demo");
        c.barcode = Some("7|ACGT".to_string());
        c.add_module(Module::new("BATF", Perturbation::Overexpression));
        let json = serde_json::to_string(&c).unwrap();
        let back: Cassette = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, c.id);
        assert_eq!(back.modules.len(), 1);
        assert_eq!(back.barcode.as_deref(), Some("7|ACGT"));
    }
}
