//! Fixed nucleotide constants inserted by the assembly grammar.
//!
//! These are the canonical single-cassette constants; every linker is a
//! plain uppercase ACGT string except the barcode placeholder, whose
//! leading `N` run marks the substitution site.

/// Chimeric intron placed in front of every expression payload.
pub const INTRON: &str = "GTAAGTATCAAGGTTACAAGACAGGTTTAAGGAGACCAATAGAAACTGGGCTTGTCGAGACAGAGAAGACTCTTGCGTTTCTGATAGGCACCTATTGGTCTTACTGACATCCACTTTGCCTTTCTCTCCACAG";

/// T2A self-cleaving peptide, inserted between consecutive
/// overexpression payloads.
pub const T2A: &str = "GAGGGCAGAGGAAGTCTGCTAACATGCGGTGACGTCGAGGAGAATCCTGGCCCA";

/// Tandem stop codons terminating the upstream expression cassette.
pub const STOP_CODONS: &str = "TAATAA";

/// Triplex-forming stability element protecting the 3' end of the
/// upstream transcript.
pub const TRIPLEX: &str = "GGGTTCGATTCCCGGCCAATGCACGGGGAAAGATGGTGGAATTGGCACGTCTGAGCGATTCGCAGGTGTCCAGGGTCAGGAGTCCACTTGGCAGACGAAACACGGCACCA";

/// Capture adaptor preceding each disruption payload.
pub const ADAPTOR: &str = "GTTCAGAGTTCTACAGTCCGACGATC";

/// Internal stuffer separating the construct body from the barcode site.
pub const INTERNAL_STUFFER: &str = "CTAGAGGATCTATTTCCGGTGAATTCCTCGAGACTCTAGGGCCTCTAGACCA";

/// SV40 late polyadenylation signal appended after a terminal disruption
/// payload.
pub const POLY_A: &str = "AATAAAAGATCTTTATTTTCATTAGATCTGTGTGTTGGTTTTTTGTGTG";

/// Barcode substitution site: a run of `N` placeholder bases followed by
/// the fixed anchor motif. The integrator replaces the `N` run and
/// de-duplicates the anchor.
pub const BARCODE_PLACEHOLDER: &str = "NNNNNNNNNNNAGCG";

/// Anchor motif terminating every concrete barcode; also the fixed tail
/// of [`BARCODE_PLACEHOLDER`].
pub const BARCODE_ANCHOR: &str = "AGCG";
