use crate::{
    intervals::GenomeInterval,
    route::{Event, Route, Segment},
    strand::Strand,
};
use log::warn;
use std::collections::BTreeSet;

/// Position of a projection end within a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    pub segment_idx: usize,
    pub event: Event,
}

impl Location {
    pub fn new(segment_idx: usize, event: Event) -> Self {
        Self { segment_idx, event }
    }
}

/// An element mapped onto the coordinate space of a route.
///
/// `start` and `end` are 0-based, half-open, on `strand` of the route's neo-contig.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection<'a, T> {
    pub source: &'a T,
    pub route: &'a Route,
    pub start: i64,
    pub end: i64,
    pub strand: Strand,
    pub start_location: Location,
    pub end_location: Location,

    /// Segments strictly between the start and end segments.
    pub spanned: Vec<Location>,
}

impl<'a, T> Projection<'a, T> {
    pub fn start_event(&self) -> Event {
        self.start_location.event
    }

    pub fn end_event(&self) -> Event {
        self.end_location.event
    }

    pub fn is_intra_segment(&self) -> bool {
        self.start_location.segment_idx == self.end_location.segment_idx
    }

    pub fn is_deleted(&self) -> bool {
        self.is_intra_segment() && self.start_event() == Event::Deletion
    }

    pub fn spanned_segments(&self) -> impl Iterator<Item = &'a Segment> + '_ {
        let segments = self.route.segments();
        self.spanned.iter().map(move |loc| &segments[loc.segment_idx])
    }

    pub fn spanned_events(&self) -> BTreeSet<Event> {
        self.spanned.iter().map(|loc| loc.event).collect()
    }

    /// Start on the forward strand of the neo-contig.
    pub fn forward_start(&self) -> i64 {
        match self.strand {
            Strand::Forward => self.start,
            Strand::Reverse => self.route.neo_contig_length() as i64 - self.end,
        }
    }

    pub fn forward_end(&self) -> i64 {
        match self.strand {
            Strand::Forward => self.end,
            Strand::Reverse => self.route.neo_contig_length() as i64 - self.start,
        }
    }
}

/// 1-based containment: `start < pos <= end`.
fn segment_contains(segment: &Segment, pos: i64) -> bool {
    (segment.start() as i64) < pos && pos <= segment.end() as i64
}

fn start_on(element: &impl GenomeInterval, segment: &Segment) -> i64 {
    element.start_on_strand(segment.strand()) as i64
}

fn end_on(element: &impl GenomeInterval, segment: &Segment) -> i64 {
    element.end_on_strand(segment.strand()) as i64
}

/// Map `element` onto `route`.
///
/// Returns no projection when the element is deleted or broken by the rearrangement, one
/// projection in the common case, and one projection per copy for an element within a
/// duplicated segment.
pub fn project<'a, T: GenomeInterval>(element: &'a T, route: &'a Route) -> Vec<Projection<'a, T>> {
    let segments = route.segments();
    if !route.contigs().contains(&element.contig_index()) {
        return Vec::new();
    }

    let mut start_idx: Option<usize> = None;
    let mut end_idx: Option<usize> = None;
    for (i, segment) in segments.iter().enumerate() {
        if segment.contig_index() != element.contig_index() {
            continue;
        }
        // 1-based so that start and end can be checked on their own
        if segment_contains(segment, start_on(element, segment) + 1) {
            start_idx = Some(i);
        }
        if segment_contains(segment, end_on(element, segment)) {
            end_idx = Some(i);
        }
        if start_idx.is_some() && end_idx.is_some() {
            break;
        }
    }

    let (Some(mut start_idx), Some(mut end_idx)) = (start_idx, end_idx) else {
        return Vec::new();
    };

    // an empty element at a segment junction is found one segment apart
    if element.length() == 0 {
        if start_idx + 1 == end_idx {
            start_idx += 1;
        } else if end_idx + 1 == start_idx {
            end_idx += 1;
        }
    }

    if start_idx == end_idx {
        project_intra_segment(element, start_idx, route)
    } else {
        project_inter_segment(element, start_idx, end_idx, route)
    }
}

fn project_intra_segment<'a, T: GenomeInterval>(
    element: &'a T,
    segment_idx: usize,
    route: &'a Route,
) -> Vec<Projection<'a, T>> {
    let segment = &route.segments()[segment_idx];
    let location = Location::new(segment_idx, segment.event());
    let previous = route.bases_before(segment_idx) as i64;
    let start = start_on(element, segment) - segment.start() as i64;
    let end = end_on(element, segment) - segment.start() as i64;

    let projection = |start: i64, end: i64, strand: Strand| Projection {
        source: element,
        route,
        start,
        end,
        strand,
        start_location: location,
        end_location: location,
        spanned: Vec::new(),
    };

    match segment.event() {
        Event::Deletion => Vec::new(),
        Event::Duplication => {
            let length = segment.length() as i64;
            (0..segment.copies() as i64)
                .map(|copy| {
                    let offset = previous + copy * length;
                    projection(start + offset, end + offset, Strand::Forward)
                })
                .collect()
        }
        Event::Inversion => {
            let neo_length = route.neo_contig_length() as i64;
            vec![projection(
                neo_length - (previous + end),
                neo_length - (previous + start),
                Strand::Reverse,
            )]
        }
        Event::Gap => vec![projection(start + previous, end + previous, Strand::Forward)],
        event => {
            warn!(
                "Unexpected {} segment {} fully containing an element",
                event,
                segment.id()
            );
            Vec::new()
        }
    }
}

fn project_inter_segment<'a, T: GenomeInterval>(
    element: &'a T,
    start_idx: usize,
    end_idx: usize,
    route: &'a Route,
) -> Vec<Projection<'a, T>> {
    let segments = route.segments();
    let start_segment = &segments[start_idx];
    let end_segment = &segments[end_idx];

    let (low, high) = (start_idx.min(end_idx), start_idx.max(end_idx));
    let spanned: Vec<Location> = (low + 1..high)
        .map(|i| Location::new(i, segments[i].event()))
        .collect();

    let start_event = start_segment.event();
    let end_event = end_segment.event();

    let start_offset = match (start_event, end_event) {
        (Event::Gap, Event::Gap) | (Event::Gap, Event::Duplication) => 0,
        (Event::Gap, Event::Deletion | Event::Inversion) => return Vec::new(),
        (Event::Duplication, Event::Gap) => {
            (start_segment.length() * (start_segment.copies() as u64).saturating_sub(1)) as i64
        }
        (Event::Deletion | Event::Inversion, Event::Gap) => return Vec::new(),
        (Event::Gap, event) => {
            warn!("Unexpected end event {} for a projection", event);
            return Vec::new();
        }
        (event, Event::Gap) => {
            warn!("Unexpected start event {} for a projection", event);
            return Vec::new();
        }
        _ => return Vec::new(),
    };

    let start = start_on(element, start_segment) - start_segment.start() as i64
        + route.bases_before(start_idx) as i64
        + start_offset;
    let end = end_on(element, start_segment) - end_segment.start() as i64
        + route.bases_before(end_idx) as i64;

    vec![Projection {
        source: element,
        route,
        start,
        end,
        strand: Strand::Forward,
        start_location: Location::new(start_idx, start_event),
        end_location: Location::new(end_idx, end_event),
        spanned,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        contig_header::Contig,
        intervals::GenomicRegion,
        testing::{chr1, chr2, region},
    };
    use rstest::rstest;

    fn route_around(event: Segment, downstream: (u64, u64)) -> Route {
        Route::new(vec![
            Segment::gap(region(&chr1(), 0, 20), "upstream"),
            event,
            Segment::gap(region(&chr1(), downstream.0, downstream.1), "downstream"),
        ])
        .unwrap()
    }

    fn deletion_route() -> Route {
        route_around(Segment::deletion(region(&chr1(), 20, 30), "del"), (30, 50))
    }

    fn duplication_route() -> Route {
        route_around(Segment::duplication(region(&chr1(), 20, 30), "dup"), (30, 50))
    }

    fn insertion_route() -> Route {
        route_around(Segment::insertion(region(&chr1(), 20, 20), "ins", 20), (20, 40))
    }

    fn inversion_route() -> Route {
        Route::new(vec![
            Segment::gap(region(&chr1(), 0, 20), "upstream"),
            Segment::inversion(region(&chr1(), 20, 40), "inv"),
            Segment::gap(region(&chr1(), 40, 70), "downstream"),
        ])
        .unwrap()
    }

    fn breakend_route() -> Route {
        Route::new(vec![
            Segment::gap(region(&chr1(), 0, 20), "upstream"),
            Segment::breakend(region(&chr1(), 20, 20), "left"),
            Segment::breakend(region(&chr2(), 120, 120), "right"),
            Segment::gap(region(&chr2(), 120, 150), "downstream"),
        ])
        .unwrap()
    }

    fn coordinates(projections: &[Projection<'_, GenomicRegion>]) -> Vec<(i64, i64, Strand)> {
        projections
            .iter()
            .map(|p| (p.start, p.end, p.strand))
            .collect()
    }

    fn single(start: i64, end: i64) -> Vec<(i64, i64, Strand)> {
        vec![(start, end, Strand::Forward)]
    }

    #[rstest]
    #[case(10, 20, single(10, 20))]
    #[case(10, 21, vec![])]
    #[case(20, 30, vec![])]
    #[case(29, 35, vec![])]
    #[case(30, 45, single(20, 35))]
    #[case(15, 35, single(15, 25))]
    fn test_project_on_deletion(
        #[case] start: u64,
        #[case] end: u64,
        #[case] expected: Vec<(i64, i64, Strand)>,
    ) {
        let route = deletion_route();
        let query = region(&chr1(), start, end);
        assert_eq!(coordinates(&project(&query, &route)), expected);
    }

    #[test]
    fn test_spanning_a_deletion() {
        let route = deletion_route();
        let query = region(&chr1(), 15, 35);
        let projections = project(&query, &route);

        assert_eq!(projections.len(), 1);
        let projection = &projections[0];
        assert_eq!(projection.start_location, Location::new(0, Event::Gap));
        assert_eq!(projection.end_location, Location::new(2, Event::Gap));
        assert_eq!(projection.spanned, vec![Location::new(1, Event::Deletion)]);
        assert!(!projection.is_intra_segment());
        let spanned: Vec<&str> = projection.spanned_segments().map(|s| s.id()).collect();
        assert_eq!(spanned, vec!["del"]);
    }

    #[rstest]
    #[case(10, 15, (10, 15), Event::Gap, Event::Gap, vec![])]
    #[case(10, 25, (10, 25), Event::Gap, Event::Duplication, vec![])]
    #[case(10, 40, (10, 50), Event::Gap, Event::Gap, vec![Event::Duplication])]
    #[case(25, 35, (35, 45), Event::Duplication, Event::Gap, vec![])]
    #[case(35, 45, (45, 55), Event::Gap, Event::Gap, vec![])]
    fn test_project_on_duplication(
        #[case] start: u64,
        #[case] end: u64,
        #[case] expected: (i64, i64),
        #[case] start_event: Event,
        #[case] end_event: Event,
        #[case] spanned: Vec<Event>,
    ) {
        let route = duplication_route();
        let query = region(&chr1(), start, end);
        let projections = project(&query, &route);

        assert_eq!(projections.len(), 1);
        let projection = &projections[0];
        assert_eq!((projection.start, projection.end), expected);
        assert_eq!(projection.start_event(), start_event);
        assert_eq!(projection.end_event(), end_event);
        assert_eq!(
            projection.spanned_events(),
            spanned.into_iter().collect::<BTreeSet<_>>()
        );
    }

    #[test]
    fn test_project_within_duplication() {
        let route = duplication_route();
        let query = region(&chr1(), 22, 27);
        let projections = project(&query, &route);

        assert_eq!(coordinates(&projections), vec![
            (22, 27, Strand::Forward),
            (32, 37, Strand::Forward)
        ]);
        for projection in projections {
            assert!(projection.is_intra_segment());
            assert_eq!(projection.start_location, Location::new(1, Event::Duplication));
        }
    }

    #[rstest]
    #[case(10, 20, (10, 20), vec![])]
    #[case(10, 21, (10, 41), vec![Event::Insertion])]
    #[case(19, 25, (19, 45), vec![Event::Insertion])]
    #[case(20, 30, (40, 50), vec![])]
    fn test_project_on_insertion(
        #[case] start: u64,
        #[case] end: u64,
        #[case] expected: (i64, i64),
        #[case] spanned: Vec<Event>,
    ) {
        let route = insertion_route();
        let query = region(&chr1(), start, end);
        let projections = project(&query, &route);

        assert_eq!(projections.len(), 1);
        assert_eq!((projections[0].start, projections[0].end), expected);
        assert_eq!(
            projections[0].spanned_events(),
            spanned.into_iter().collect::<BTreeSet<_>>()
        );
    }

    #[rstest]
    #[case(10, 15, vec![(10, 15, Strand::Forward)])]
    #[case(10, 25, vec![])]
    #[case(25, 30, vec![(40, 45, Strand::Reverse)])]
    #[case(15, 45, vec![(15, 45, Strand::Forward)])]
    #[case(25, 45, vec![])]
    #[case(45, 55, vec![(45, 55, Strand::Forward)])]
    fn test_project_on_inversion(
        #[case] start: u64,
        #[case] end: u64,
        #[case] expected: Vec<(i64, i64, Strand)>,
    ) {
        let route = inversion_route();
        let query = region(&chr1(), start, end);
        assert_eq!(coordinates(&project(&query, &route)), expected);
    }

    #[test]
    fn test_inverted_projection_on_forward_strand() {
        let route = inversion_route();
        let query = region(&chr1(), 25, 30);
        let projection = &project(&query, &route)[0];
        assert_eq!((projection.forward_start(), projection.forward_end()), (25, 30));
    }

    #[rstest]
    #[case(chr1(), 10, 15, single(10, 15))]
    #[case(chr1(), 10, 21, vec![])]
    #[case(chr1(), 21, 30, vec![])]
    #[case(chr2(), 100, 120, vec![])]
    #[case(chr2(), 100, 130, vec![])]
    #[case(chr2(), 130, 140, single(30, 40))]
    fn test_project_on_breakend(
        #[case] contig: Contig,
        #[case] start: u64,
        #[case] end: u64,
        #[case] expected: Vec<(i64, i64, Strand)>,
    ) {
        let route = breakend_route();
        let query = region(&contig, start, end);
        assert_eq!(coordinates(&project(&query, &route)), expected);
    }

    #[test]
    fn test_element_on_another_contig() {
        let route = deletion_route();
        let query = region(&chr2(), 10, 20);
        assert!(project(&query, &route).is_empty());
    }

    #[test]
    fn test_empty_element_at_a_junction() {
        let route = deletion_route();
        let query = region(&chr1(), 30, 30);
        let projections = project(&query, &route);
        assert_eq!(coordinates(&projections), single(20, 20));
    }
}
