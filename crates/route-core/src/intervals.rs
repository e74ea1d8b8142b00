use crate::{contig_header::Contig, error::SvError, strand::Strand};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A located element. Coordinates are 0-based, half-open and on `strand()`.
pub trait GenomeInterval {
    fn location(&self) -> &GenomicRegion;

    fn contig_index(&self) -> usize {
        self.location().contig_index
    }

    fn strand(&self) -> Strand {
        self.location().strand
    }

    fn start(&self) -> u64 {
        self.location().start
    }

    fn end(&self) -> u64 {
        self.location().end
    }

    fn length(&self) -> u64 {
        self.location().length()
    }

    fn start_on_strand(&self, strand: Strand) -> u64 {
        self.location().start_on_strand(strand)
    }

    fn end_on_strand(&self, strand: Strand) -> u64 {
        self.location().end_on_strand(strand)
    }

    fn overlaps<O: GenomeInterval + ?Sized>(&self, other: &O) -> bool {
        self.location().overlaps_with(other.location())
    }

    fn contains<O: GenomeInterval + ?Sized>(&self, other: &O) -> bool {
        self.location().contains_region(other.location())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenomicRegion {
    pub contig_index: usize,

    /// Needed to flip coordinates between strands.
    pub contig_length: u64,

    pub strand: Strand,

    /// 0-based, inclusive.
    pub start: u64,

    /// 0-based, exclusive.
    pub end: u64,
}

impl GenomicRegion {
    pub fn new(contig: &Contig, strand: Strand, start: u64, end: u64) -> Result<Self, SvError> {
        if start > end || end > contig.length {
            return Err(SvError::ValueError(format!(
                "Invalid region {}:{}-{} on a contig of length {}",
                contig.name, start, end, contig.length
            )));
        }
        Ok(Self {
            contig_index: contig.index,
            contig_length: contig.length,
            strand,
            start,
            end,
        })
    }

    /// A zero-length region just before `pos`.
    pub fn position(contig: &Contig, strand: Strand, pos: u64) -> Result<Self, SvError> {
        Self::new(contig, strand, pos, pos)
    }

    pub fn length(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn start_on_strand(&self, strand: Strand) -> u64 {
        if strand == self.strand {
            self.start
        } else {
            self.contig_length - self.end
        }
    }

    pub fn end_on_strand(&self, strand: Strand) -> u64 {
        if strand == self.strand {
            self.end
        } else {
            self.contig_length - self.start
        }
    }

    pub fn with_strand(&self, strand: Strand) -> Self {
        Self {
            contig_index: self.contig_index,
            contig_length: self.contig_length,
            strand,
            start: self.start_on_strand(strand),
            end: self.end_on_strand(strand),
        }
    }

    /// Same contig, same strand, new coordinates.
    pub fn with_coordinates(&self, start: u64, end: u64) -> Self {
        Self {
            start,
            end,
            ..self.clone()
        }
    }

    pub fn overlaps_with(&self, other: &GenomicRegion) -> bool {
        self.contig_index == other.contig_index
            && Coordinates::overlap(
                self.start,
                self.end,
                other.start_on_strand(self.strand),
                other.end_on_strand(self.strand),
            )
    }

    pub fn contains_region(&self, other: &GenomicRegion) -> bool {
        self.contig_index == other.contig_index
            && Coordinates::a_contains_b(
                self.start,
                self.end,
                other.start_on_strand(self.strand),
                other.end_on_strand(self.strand),
            )
    }

    pub fn overlap_length(&self, other: &GenomicRegion) -> u64 {
        if self.contig_index != other.contig_index {
            return 0;
        }
        Coordinates::overlap_length(
            self.start,
            self.end,
            other.start_on_strand(self.strand),
            other.end_on_strand(self.strand),
        )
    }
}

impl GenomeInterval for GenomicRegion {
    fn location(&self) -> &GenomicRegion {
        self
    }
}

impl fmt::Display for GenomicRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}({})",
            self.contig_index, self.start, self.end, self.strand
        )
    }
}

/// A span without a contig, e.g. an exon relative to its transcript's strand.
/// 0-based, half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinates {
    pub start: u64,
    pub end: u64,
}

impl Coordinates {
    pub fn new(start: u64, end: u64) -> Result<Self, SvError> {
        if start > end {
            return Err(SvError::ValueError(format!(
                "Start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn length(&self) -> u64 {
        self.end - self.start
    }

    /// Flip onto the opposite strand of a contig with the given length.
    pub fn invert(&self, contig_length: u64) -> Self {
        Self {
            start: contig_length - self.end,
            end: contig_length - self.start,
        }
    }

    pub fn overlap(a_start: u64, a_end: u64, b_start: u64, b_end: u64) -> bool {
        a_start < b_end && b_start < a_end
    }

    pub fn a_contains_b(a_start: u64, a_end: u64, b_start: u64, b_end: u64) -> bool {
        a_start <= b_start && b_end <= a_end
    }

    pub fn overlap_length(a_start: u64, a_end: u64, b_start: u64, b_end: u64) -> u64 {
        let start = a_start.max(b_start);
        let end = a_end.min(b_end);
        end.saturating_sub(start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn contig() -> Contig {
        Contig::new(0, "chr1", 100)
    }

    fn region(strand: Strand, start: u64, end: u64) -> GenomicRegion {
        GenomicRegion::new(&contig(), strand, start, end).unwrap()
    }

    #[test]
    fn test_invalid_region() {
        assert!(GenomicRegion::new(&contig(), Strand::Forward, 10, 5).is_err());
        assert!(GenomicRegion::new(&contig(), Strand::Forward, 10, 101).is_err());
    }

    #[test]
    fn test_with_strand() {
        let r = region(Strand::Forward, 10, 30);
        let flipped = r.with_strand(Strand::Reverse);
        assert_eq!((flipped.start, flipped.end), (70, 90));
        assert_eq!(flipped.with_strand(Strand::Forward), r);
    }

    #[rstest]
    #[case((Strand::Forward, 10, 20), (Strand::Forward, 19, 30), true)]
    #[case((Strand::Forward, 10, 20), (Strand::Forward, 20, 30), false)]
    #[case((Strand::Forward, 10, 20), (Strand::Reverse, 80, 85), true)]
    #[case((Strand::Forward, 10, 20), (Strand::Reverse, 90, 95), false)]
    #[case((Strand::Forward, 10, 20), (Strand::Forward, 15, 15), true)]
    fn test_overlaps(
        #[case] a: (Strand, u64, u64),
        #[case] b: (Strand, u64, u64),
        #[case] expected: bool,
    ) {
        let a = region(a.0, a.1, a.2);
        let b = region(b.0, b.1, b.2);
        assert_eq!(a.overlaps(&b), expected);
        assert_eq!(b.overlaps(&a), expected);
    }

    #[rstest]
    #[case(0, 100, 10, 20, true)]
    #[case(10, 20, 10, 20, true)]
    #[case(10, 20, 5, 20, false)]
    #[case(10, 20, 20, 20, true)]
    fn test_contains(
        #[case] a_start: u64,
        #[case] a_end: u64,
        #[case] b_start: u64,
        #[case] b_end: u64,
        #[case] expected: bool,
    ) {
        let a = region(Strand::Forward, a_start, a_end);
        let b = region(Strand::Forward, b_start, b_end);
        assert_eq!(a.contains(&b), expected);
    }

    #[rstest]
    #[case(0, 10, 5, 15, 5)]
    #[case(0, 10, 10, 15, 0)]
    #[case(5, 15, 0, 100, 10)]
    fn test_overlap_length(
        #[case] a_start: u64,
        #[case] a_end: u64,
        #[case] b_start: u64,
        #[case] b_end: u64,
        #[case] expected: u64,
    ) {
        assert_eq!(
            Coordinates::overlap_length(a_start, a_end, b_start, b_end),
            expected
        );
    }
}
