//! Fixtures shared by unit tests.

use crate::{
    annotations::Annotations,
    contig_header::Contig,
    feature::{Enhancer, Gene, TadBoundary, Transcript},
    intervals::{Coordinates, GenomicRegion},
    strand::Strand,
};

pub fn chr1() -> Contig {
    Contig::new(0, "chr1", 1000)
}

pub fn chr2() -> Contig {
    Contig::new(1, "chr2", 2000)
}

pub fn region(contig: &Contig, start: u64, end: u64) -> GenomicRegion {
    GenomicRegion::new(contig, Strand::Forward, start, end).unwrap()
}

/// Gene with a single transcript. Every coordinate is on `strand`.
pub fn gene(
    accession: &str,
    contig: &Contig,
    strand: Strand,
    start: u64,
    end: u64,
    exons: &[(u64, u64)],
    cds: Option<(u64, u64)>,
) -> Gene {
    let location = GenomicRegion::new(contig, strand, start, end).unwrap();
    Gene {
        accession: accession.to_string(),
        symbol: accession.to_string(),
        location: location.clone(),
        transcripts: vec![Transcript {
            accession: format!("{}.1", accession),
            location,
            exons: exons
                .iter()
                .map(|&(start, end)| Coordinates { start, end })
                .collect(),
            coding: cds.map(|(start, end)| Coordinates { start, end }),
        }],
    }
}

pub fn enhancer(id: &str, contig: &Contig, start: u64, end: u64) -> Enhancer {
    Enhancer {
        id: id.to_string(),
        location: region(contig, start, end),
        tissue: "brain".to_string(),
        tissue_specificity: 0.5,
        developmental: false,
    }
}

pub fn tad(id: &str, contig: &Contig, start: u64, end: u64, stability: f64) -> TadBoundary {
    TadBoundary {
        id: id.to_string(),
        location: region(contig, start, end),
        stability,
    }
}

pub fn annotations(
    genes: Vec<Gene>,
    enhancers: Vec<Enhancer>,
    tad_boundaries: Vec<TadBoundary>,
) -> Annotations {
    Annotations::new(genes, enhancers, tad_boundaries, Vec::new())
}

