use super::SequenceImpactCalculator;
use crate::{
    feature::{Gene, Transcript},
    intervals::{Coordinates, GenomeInterval},
    projection::Projection,
    route::{Event, Segment},
};
use log::warn;

// Fitness values of insertions into the coding sequence.
const INSERTION_SHIFTS_FRAME: f64 = 0.1;
const INSERTION_KEEPS_FRAME: f64 = 0.8;

// Splice regions added around internal exon boundaries.
const ACCEPTOR_PADDING: i64 = 25;
const DONOR_PADDING: i64 = 6;

/// Scores genes by the events hitting their promoter, exons and reading frame.
#[derive(Debug, Clone)]
pub struct GeneSequenceImpactCalculator {
    gene_factor: f64,
    promoter_length: u64,
    promoter_fitness_gain: f64,
}

impl GeneSequenceImpactCalculator {
    pub fn new(gene_factor: f64, promoter_length: u64, promoter_fitness_gain: f64) -> Self {
        if promoter_fitness_gain > 1.0 {
            warn!(
                "Promoter fitness gain {} cannot be greater than 1. Clipping to 1",
                promoter_fitness_gain
            );
        }
        Self {
            gene_factor,
            promoter_length,
            promoter_fitness_gain: promoter_fitness_gain.min(1.0),
        }
    }

    fn event_fitness(&self, event: Event) -> f64 {
        match event {
            Event::Gap => self.gene_factor,
            Event::Snv => 0.85 * self.gene_factor,
            Event::Insertion => 0.1 * self.gene_factor,
            Event::Duplication | Event::Deletion | Event::Inversion | Event::Breakend => 0.0,
        }
    }

    /// Most severe fitness among the non-gap segments hitting a promoter, if any does.
    fn check_promoter(&self, segments: &[Segment], transcripts: &[Transcript]) -> Option<f64> {
        let mut score: Option<f64> = None;

        for tx in transcripts {
            let tx_start = tx.start();
            let promoter_start = tx_start.saturating_sub(self.promoter_length);
            let promoter_end = tx_start;

            for segment in segments
                .iter()
                .filter(|s| s.event() != Event::Gap && s.contig_index() == tx.contig_index())
            {
                let segment_start = segment.start_on_strand(tx.strand());
                let segment_end = segment.end_on_strand(tx.strand());
                if !Coordinates::overlap(promoter_start, promoter_end, segment_start, segment_end) {
                    continue;
                }

                let fitness = match segment.event() {
                    // an inversion of the entire promoter is not deleterious
                    Event::Inversion
                        if Coordinates::a_contains_b(
                            segment_start,
                            segment_end,
                            promoter_start,
                            promoter_end,
                        ) =>
                    {
                        1.0
                    }
                    event => self.event_fitness(event),
                };
                let fitness = (fitness + self.gene_factor * self.promoter_fitness_gain)
                    .min(1.0)
                    .min(self.gene_factor);

                score = Some(score.map_or(fitness, |s| s.min(fitness)));
            }
        }
        score
    }

    fn score_intra_segment(&self, projection: &Projection<'_, Gene>) -> f64 {
        match projection.start_event() {
            // the entire gene is deleted
            Event::Deletion => 0.0,
            // scored once per copy
            Event::Duplication => self.no_impact(),
            event @ (Event::Breakend | Event::Snv | Event::Insertion) => {
                warn!(
                    "Gene {} is unexpectedly located within a {} segment",
                    projection.source.accession, event
                );
                self.no_impact()
            }
            Event::Gap | Event::Inversion => self.no_impact(),
        }
    }

    fn score_inter_segment(&self, projection: &Projection<'_, Gene>) -> f64 {
        let causal: Vec<&Segment> = projection
            .spanned_segments()
            .filter(|s| s.event() != Event::Gap)
            .collect();

        projection
            .source
            .transcripts
            .iter()
            .map(|tx| self.score_transcript(&causal, tx))
            .fold(self.no_impact(), f64::min)
    }

    fn score_transcript(&self, segments: &[&Segment], tx: &Transcript) -> f64 {
        let Some(utr) = UtrData::of(tx) else {
            // non-coding transcripts are not scored
            return self.no_impact();
        };
        let exons = PaddedExon::of(tx, &utr);

        segments
            .iter()
            .filter(|s| s.contig_index() == tx.contig_index())
            .map(|segment| match segment.event() {
                Event::Insertion => self.score_insertion(segment, tx, &utr, &exons),
                _ => self.score_default(segment, tx, &utr, &exons),
            })
            .fold(self.no_impact(), f64::min)
    }

    fn score_insertion(
        &self,
        segment: &Segment,
        tx: &Transcript,
        utr: &UtrData,
        exons: &[PaddedExon],
    ) -> f64 {
        if segment.region().length() != 0 {
            warn!(
                "Bad insertion {} with nonzero length {} on the contig",
                segment.id(),
                segment.region().length()
            );
            return self.no_impact();
        }

        let position = segment.start_on_strand(tx.strand()) as i64;
        let inserted = segment.length() as i64;
        let mut score = self.no_impact();

        let mut previous_coding = 0;
        for exon in exons {
            if exon.padded_start <= position && position <= exon.padded_end {
                let fitness = if position <= utr.cds_start {
                    insertion_utr_fitness(inserted, utr.five_utr_length())
                } else if utr.cds_end < position {
                    insertion_utr_fitness(inserted, utr.three_utr_length())
                } else {
                    let current_coding = position - utr.cds_start.max(exon.start);
                    let fits_into_frame = (previous_coding + current_coding) % 3 == 0;
                    if fits_into_frame && inserted % 3 == 0 {
                        INSERTION_KEEPS_FRAME
                    } else {
                        INSERTION_SHIFTS_FRAME
                    }
                };
                score = score.min(fitness);
                // an empty insertion cannot hit more than one exon
                break;
            }
            previous_coding += exon.n_coding;
        }

        score
    }

    fn score_default(
        &self,
        segment: &Segment,
        tx: &Transcript,
        utr: &UtrData,
        exons: &[PaddedExon],
    ) -> f64 {
        if segment.event() == Event::Gap {
            return self.no_impact();
        }

        let segment_start = segment.start_on_strand(tx.strand()) as i64;
        let segment_end = segment.end_on_strand(tx.strand()) as i64;

        let mut score = self.no_impact();
        let mut previous_coding = 0;
        for (i, exon) in exons.iter().enumerate() {
            if exon.padded_start < segment_end && segment_start < exon.padded_end {
                let fitness = self.score_exon(
                    segment_start,
                    segment_end,
                    segment.event(),
                    exon,
                    utr,
                    i == 0,
                    previous_coding,
                );
                score = score.min(fitness);
            }
            previous_coding += exon.n_coding;
        }
        score
    }

    #[allow(clippy::too_many_arguments)]
    fn score_exon(
        &self,
        segment_start: i64,
        segment_end: i64,
        event: Event,
        exon: &PaddedExon,
        utr: &UtrData,
        is_first_exon: bool,
        previous_coding: i64,
    ) -> f64 {
        // the transcription start site is hit
        if is_first_exon && segment_start <= exon.start && exon.start < segment_end {
            return self.event_fitness(event);
        }

        let affects_cds = segment_start < utr.cds_end && utr.cds_start < segment_end;
        if affects_cds {
            let fits_into_frame = (previous_coding + segment_start - exon.start) % 3 == 0;
            let multiple_of_three = (segment_end - segment_start) % 3 == 0;
            return match event {
                Event::Deletion | Event::Duplication if fits_into_frame && multiple_of_three => {
                    0.2 * self.gene_factor
                }
                _ => self.event_fitness(event),
            };
        }

        let length = segment_end - segment_start;
        if segment_end <= utr.cds_start {
            let five = utr.five_utr_length();
            if five == 0 {
                warn!("5'UTR is 0bp long");
                return self.no_impact();
            }
            default_utr_fitness(length, five)
        } else if utr.cds_end <= segment_start {
            let three = utr.three_utr_length();
            if three == 0 {
                warn!("3'UTR is 0bp long");
                return self.no_impact();
            }
            default_utr_fitness(length, three)
        } else {
            warn!(
                "Segment {}-{} overlaps neither the CDS nor the UTRs",
                segment_start, segment_end
            );
            self.no_impact()
        }
    }
}

impl SequenceImpactCalculator<Gene> for GeneSequenceImpactCalculator {
    fn project_impact(&self, projection: &Projection<'_, Gene>) -> f64 {
        let transcripts = &projection.source.transcripts;
        let promoter = self.check_promoter(projection.route.segments(), transcripts);

        let gene = if projection.is_intra_segment() {
            self.score_intra_segment(projection)
        } else {
            self.score_inter_segment(projection)
        };

        match promoter {
            Some(promoter) => gene.min(promoter),
            None => gene,
        }
    }

    fn no_impact(&self) -> f64 {
        self.gene_factor
    }
}

/// Minimal fitness once half of the UTR is affected.
fn default_utr_fitness(segment_length: i64, utr_length: i64) -> f64 {
    let impact = 2.0 * segment_length as f64 / utr_length as f64;
    (1.0 - impact).max(0.0)
}

fn insertion_utr_fitness(inserted_length: i64, utr_length: i64) -> f64 {
    let impact = inserted_length as f64 / utr_length as f64;
    1.0 - impact.min(1.0)
}

/// Transcript and CDS boundaries on the transcript strand.
#[derive(Debug, Clone, Copy)]
struct UtrData {
    tx_start: i64,
    cds_start: i64,
    cds_end: i64,
    tx_end: i64,
}

impl UtrData {
    fn of(tx: &Transcript) -> Option<Self> {
        let coding = tx.coding?;
        Some(Self {
            tx_start: tx.start() as i64,
            cds_start: coding.start as i64,
            cds_end: coding.end as i64,
            tx_end: tx.end() as i64,
        })
    }

    fn five_utr_length(&self) -> i64 {
        self.cds_start - self.tx_start
    }

    /// The stop codon counts towards the 3'UTR.
    fn three_utr_length(&self) -> i64 {
        self.tx_end - self.cds_end + 3
    }
}

/// Exon extended by its splice regions.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PaddedExon {
    padded_start: i64,
    start: i64,
    end: i64,
    padded_end: i64,
    n_coding: i64,
}

impl PaddedExon {
    fn of(tx: &Transcript, utr: &UtrData) -> Vec<PaddedExon> {
        let n_coding = |exon: &Coordinates| {
            Coordinates::overlap_length(
                utr.cds_start as u64,
                utr.cds_end as u64,
                exon.start,
                exon.end,
            ) as i64
        };

        match tx.exons.as_slice() {
            [] => Vec::new(),
            // unspliced transcripts have no splice regions
            [single] => vec![PaddedExon {
                padded_start: single.start as i64,
                start: single.start as i64,
                end: single.end as i64,
                padded_end: single.end as i64,
                n_coding: utr.cds_end - utr.cds_start,
            }],
            [first, internal @ .., last] => {
                let mut exons = Vec::with_capacity(tx.exons.len());
                exons.push(PaddedExon {
                    padded_start: first.start as i64,
                    start: first.start as i64,
                    end: first.end as i64,
                    padded_end: first.end as i64 + DONOR_PADDING,
                    n_coding: n_coding(first),
                });
                exons.extend(internal.iter().map(|exon| PaddedExon {
                    padded_start: exon.start as i64 - ACCEPTOR_PADDING,
                    start: exon.start as i64,
                    end: exon.end as i64,
                    padded_end: exon.end as i64 + DONOR_PADDING,
                    n_coding: n_coding(exon),
                }));
                exons.push(PaddedExon {
                    padded_start: last.start as i64 - ACCEPTOR_PADDING,
                    start: last.start as i64,
                    end: last.end as i64,
                    padded_end: last.end as i64,
                    n_coding: n_coding(last),
                });
                exons
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        projection::project,
        route::Route,
        strand::Strand,
        testing::{chr1, gene, region},
    };
    use rstest::rstest;

    const ERROR: f64 = 1e-12;

    fn get_test_calculator() -> GeneSequenceImpactCalculator {
        GeneSequenceImpactCalculator::new(1.0, 50, 0.6)
    }

    fn three_exon_gene(start: u64, end: u64, exons: [(u64, u64); 3]) -> Gene {
        gene(
            "G",
            &chr1(),
            Strand::Forward,
            start,
            end,
            &exons,
            Some((start + 10, end - 10)),
        )
    }

    fn route_with(event: Segment, downstream_start: u64) -> Route {
        Route::new(vec![
            Segment::gap(region(&chr1(), 0, 200), "upstream"),
            event,
            Segment::gap(region(&chr1(), downstream_start, 500), "downstream"),
        ])
        .unwrap()
    }

    fn impact(gene: &Gene, route: &Route) -> f64 {
        let projections = project(gene, route);
        assert!(!projections.is_empty(), "gene must project onto the route");
        get_test_calculator().project_impact(&projections[0])
    }

    #[rstest]
    // the middle exon is deleted
    #[case(100, 400, [(100, 120), (240, 260), (380, 400)], 0.0)]
    // 9 coding bases in the first exon plus 1 shift the frame
    #[case(100, 400, [(100, 119), (200, 350), (380, 400)], 0.0)]
    // 9 + 3 coding bases keep the frame
    #[case(100, 400, [(100, 119), (198, 260), (380, 400)], 0.2)]
    #[case(100, 400, [(100, 120), (325, 350), (380, 400)], 1.0)]
    #[case(100, 400, [(100, 120), (150, 195), (380, 400)], 1.0)]
    // downstream of the gene
    #[case(50, 200, [(50, 100), (110, 120), (180, 201)], 1.0)]
    // hits the promoter
    #[case(300, 400, [(300, 320), (330, 370), (380, 400)], 0.6)]
    // just upstream of the promoter
    #[case(350, 500, [(350, 370), (380, 420), (430, 500)], 1.0)]
    fn test_deletion(
        #[case] start: u64,
        #[case] end: u64,
        #[case] exons: [(u64, u64); 3],
        #[case] expected: f64,
    ) {
        let route = route_with(Segment::deletion(region(&chr1(), 201, 300), "deletion"), 300);
        let gene = three_exon_gene(start, end, exons);
        assert!((impact(&gene, &route) - expected).abs() < ERROR);
    }

    #[rstest]
    #[case(100, 400, [(100, 120), (240, 260), (380, 400)], 0.0)]
    #[case(100, 400, [(100, 119), (200, 350), (380, 400)], 0.0)]
    #[case(100, 400, [(100, 119), (198, 260), (380, 400)], 0.2)]
    #[case(100, 400, [(100, 120), (325, 350), (380, 400)], 1.0)]
    #[case(100, 400, [(100, 120), (150, 195), (380, 400)], 1.0)]
    #[case(50, 200, [(50, 100), (110, 120), (180, 201)], 1.0)]
    #[case(300, 400, [(300, 320), (330, 370), (380, 400)], 0.6)]
    #[case(350, 500, [(350, 370), (380, 420), (430, 500)], 1.0)]
    fn test_duplication(
        #[case] start: u64,
        #[case] end: u64,
        #[case] exons: [(u64, u64); 3],
        #[case] expected: f64,
    ) {
        let route = route_with(
            Segment::duplication(region(&chr1(), 201, 300), "duplication"),
            300,
        );
        let gene = three_exon_gene(start, end, exons);
        assert!((impact(&gene, &route) - expected).abs() < ERROR);
    }

    #[rstest]
    // the middle exon is inverted
    #[case(100, 400, [(100, 120), (240, 260), (380, 400)], 0.0)]
    // intronic inversion
    #[case(100, 400, [(100, 120), (140, 180), (380, 400)], 1.0)]
    fn test_inversion(
        #[case] start: u64,
        #[case] end: u64,
        #[case] exons: [(u64, u64); 3],
        #[case] expected: f64,
    ) {
        let route = route_with(Segment::inversion(region(&chr1(), 200, 300), "inversion"), 300);
        let gene = three_exon_gene(start, end, exons);
        assert!((impact(&gene, &route) - expected).abs() < ERROR);
    }

    #[rstest]
    // in frame, keeps the reading frame
    #[case(187, 400, [(187, 220), (250, 270), (380, 400)], 3, 0.8)]
    #[case(187, 400, [(187, 220), (250, 270), (380, 400)], 5, 0.1)]
    #[case(186, 400, [(186, 220), (250, 270), (380, 400)], 3, 0.1)]
    // 5'UTR
    #[case(195, 400, [(195, 220), (250, 270), (380, 400)], 3, 0.7)]
    // 3'UTR, which includes the stop codon
    #[case(10, 205, [(10, 30), (150, 170), (190, 205)], 3, 0.769230769231)]
    fn test_insertion(
        #[case] start: u64,
        #[case] end: u64,
        #[case] exons: [(u64, u64); 3],
        #[case] length: u64,
        #[case] expected: f64,
    ) {
        let route = Route::new(vec![
            Segment::gap(region(&chr1(), 0, 200), "upstream"),
            Segment::insertion(region(&chr1(), 200, 200), "insertion", length),
            Segment::gap(region(&chr1(), 200, 400), "downstream"),
        ])
        .unwrap();
        let gene = three_exon_gene(start, end, exons);
        assert!((impact(&gene, &route) - expected).abs() < ERROR);
    }

    #[test]
    fn test_whole_gene_deletion_and_duplication() {
        let calculator = get_test_calculator();
        let gene = three_exon_gene(250, 290, [(250, 260), (265, 270), (280, 290)]);

        let deletion = route_with(Segment::deletion(region(&chr1(), 200, 300), "del"), 300);
        let projections = project(&gene, &deletion);
        assert!(projections.is_empty());

        let duplication = route_with(Segment::duplication(region(&chr1(), 200, 300), "dup"), 300);
        let projections = project(&gene, &duplication);
        assert_eq!(projections.len(), 2);
        // each copy is intact, but the promoter lies within the duplicated block
        for projection in projections {
            assert!((calculator.project_impact(&projection) - 0.6).abs() < ERROR);
        }
    }

    #[test]
    fn test_non_coding_transcript_is_not_scored() {
        let route = route_with(Segment::deletion(region(&chr1(), 200, 300), "del"), 300);
        let gene = gene(
            "nc",
            &chr1(),
            Strand::Forward,
            100,
            400,
            &[(100, 120), (240, 260), (380, 400)],
            None,
        );
        assert_eq!(impact(&gene, &route), 1.0);
    }

    #[test]
    fn test_promoter_gain_is_clipped() {
        let calculator = GeneSequenceImpactCalculator::new(1.0, 50, 3.0);
        assert_eq!(calculator.promoter_fitness_gain, 1.0);
    }

    #[test]
    fn test_padded_exons() {
        let gene = three_exon_gene(100, 400, [(100, 120), (240, 260), (380, 400)]);
        let tx = &gene.transcripts[0];
        let utr = UtrData::of(tx).unwrap();
        assert_eq!((utr.five_utr_length(), utr.three_utr_length()), (10, 13));

        let exons = PaddedExon::of(tx, &utr);
        let spans: Vec<(i64, i64, i64, i64, i64)> = exons
            .iter()
            .map(|e| (e.padded_start, e.start, e.end, e.padded_end, e.n_coding))
            .collect();
        assert_eq!(
            spans,
            vec![
                (100, 100, 120, 126, 10),
                (215, 240, 260, 266, 20),
                (355, 380, 400, 400, 10),
            ]
        );
    }
}
