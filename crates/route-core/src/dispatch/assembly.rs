use crate::{
    error::SvError,
    intervals::{GenomeInterval, GenomicRegion},
    route::{Route, Segment},
    strand::Strand,
    variant::{BreakendPair, SvVariant, VariantKind},
};

// One pure function per variant kind. Regions are on the forward strand.

fn snv_segment(region: GenomicRegion, id: &str) -> Segment {
    Segment::snv(region, id)
}

fn deletion_segment(region: GenomicRegion, id: &str) -> Segment {
    Segment::deletion(region, id)
}

fn duplication_segment(region: GenomicRegion, id: &str) -> Segment {
    Segment::duplication(region, id)
}

fn inversion_segment(region: GenomicRegion, id: &str) -> Segment {
    Segment::inversion(region, id)
}

fn insertion_segment(region: GenomicRegion, id: &str, length: u64) -> Segment {
    Segment::insertion(region, id, length)
}

/// Copy numbers 0 and 2 must come as deletions and duplications, and 1 is not a supported
/// combination. Anything else becomes a multiplier of `copy_number - 1`.
fn copy_number_segment(region: GenomicRegion, id: &str, copy_number: u32) -> Result<Segment, SvError> {
    match copy_number {
        0..=2 => Err(SvError::DispatchError(format!(
            "Unsupported copy number {} for {}",
            copy_number, id
        ))),
        n => Ok(Segment::copy_number(region, id, n - 1)),
    }
}

/// Segments a single non-breakend variant contributes to a route.
pub fn variant_segments(variant: &SvVariant) -> Result<Vec<Segment>, SvError> {
    let region = variant.location.with_strand(Strand::Forward);
    let id = variant.id.as_str();

    let segment = match &variant.kind {
        VariantKind::Snv => snv_segment(region, id),
        VariantKind::Deletion => deletion_segment(region, id),
        VariantKind::Duplication => duplication_segment(region, id),
        VariantKind::Inversion => inversion_segment(region, id),
        VariantKind::Insertion { length } => insertion_segment(region, id, *length),
        VariantKind::CopyNumber { copy_number } => copy_number_segment(region, id, *copy_number)?,
        VariantKind::Breakend(_) => {
            return Err(SvError::DispatchError(format!(
                "Breakend {} must be dispatched as a pair",
                id
            )));
        }
    };
    Ok(vec![segment])
}

/// Chain `variants` through `window`, bridging everything in between with gaps.
///
/// Variants must be on the window contig, sorted and non-overlapping.
pub fn build_route(window: &GenomicRegion, variants: &[SvVariant]) -> Result<Route, SvError> {
    if variants.is_empty() {
        return Err(SvError::DispatchError("No variants to build a route from".to_string()));
    }
    let window = window.with_strand(Strand::Forward);

    let mut segments = Vec::with_capacity(2 * variants.len() + 1);
    let mut previous_end = window.start;

    for (i, variant) in variants.iter().enumerate() {
        if variant.contig_index() != window.contig_index {
            return Err(SvError::DispatchError(format!(
                "Variant {} is on contig {}, expected {}",
                variant.id,
                variant.contig_index(),
                window.contig_index
            )));
        }

        let start = variant.start_on_strand(Strand::Forward);
        if start < previous_end {
            return Err(SvError::DispatchError(format!(
                "Variant {} starts at {} before the previous end {}",
                variant.id, start, previous_end
            )));
        }

        let gap_id = if i == 0 {
            "upstream".to_string()
        } else {
            format!("gap-{}", i)
        };
        segments.push(Segment::gap(window.with_coordinates(previous_end, start), &gap_id));

        let variant_segments = variant_segments(variant)?;
        if let Some(last) = variant_segments.last() {
            previous_end = last.end();
        }
        segments.extend(variant_segments);
    }

    if previous_end > window.end {
        return Err(SvError::DispatchError(format!(
            "Variants end at {}, past the window end {}",
            previous_end, window.end
        )));
    }
    segments.push(Segment::gap(
        window.with_coordinates(previous_end, window.end),
        "downstream",
    ));

    Route::new(segments)
}

/// The two derivative chains of a breakend junction:
/// left upstream + right downstream, and right upstream + left downstream.
///
/// Each window must be on its breakend contig; it is read on the breakend strand.
pub fn breakend_routes(
    id: &str,
    pair: &BreakendPair,
    left_window: &GenomicRegion,
    right_window: &GenomicRegion,
) -> Result<Vec<Route>, SvError> {
    let left = &pair.left.location;
    let right = &pair.right.location;
    let left_window = left_window.with_strand(left.strand);
    let right_window = right_window.with_strand(right.strand);

    if !left_window.contains_region(left) || !right_window.contains_region(right) {
        return Err(SvError::DispatchError(format!(
            "Breakend {} is outside of its window",
            id
        )));
    }

    let left_segment = Segment::breakend(left.clone(), &pair.left.id);
    let right_segment = Segment::breakend(right.clone(), &pair.right.id);

    let mut first = vec![
        Segment::gap(
            left_window.with_coordinates(left_window.start, left.start),
            "left-upstream",
        ),
        left_segment.clone(),
    ];
    if pair.inserted_length != 0 {
        first.push(Segment::insertion(left.clone(), id, pair.inserted_length));
    }
    first.push(right_segment.clone());
    first.push(Segment::gap(
        right_window.with_coordinates(right.start, right_window.end),
        "right-downstream",
    ));

    let second = vec![
        Segment::gap(
            right_window.with_coordinates(right_window.start, right.start),
            "right-upstream",
        ),
        right_segment,
        left_segment,
        Segment::gap(
            left_window.with_coordinates(left.start, left_window.end),
            "left-downstream",
        ),
    ];

    Ok(vec![Route::new(first)?, Route::new(second)?])
}
