pub mod assemble;
pub mod barcode;
pub mod cassette;
pub mod linker;
pub mod module;
pub mod ops;
pub mod segment;

pub use cassette::Cassette;
pub use module::{Module, Perturbation, SequenceSource};
pub use segment::{Segment, SegmentKind};
