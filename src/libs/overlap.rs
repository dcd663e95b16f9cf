use crate::libs::anchor::{Anchor, Position, ReadId};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RelativeStrand {
    #[default]
    Forward,
    Reverse,
}

impl RelativeStrand {
    pub fn as_char(self) -> char {
        match self {
            RelativeStrand::Forward => '+',
            RelativeStrand::Reverse => '-',
        }
    }
}

impl fmt::Display for RelativeStrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// The summarized alignment region implied by one retained chain.
///
/// Start positions never exceed end positions on either axis, whatever the strand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overlap {
    pub query_read_id: ReadId,
    pub target_read_id: ReadId,
    pub query_start_position_in_read: Position,
    pub query_end_position_in_read: Position,
    pub target_start_position_in_read: Position,
    pub target_end_position_in_read: Position,
    pub relative_strand: RelativeStrand,
    /// Number of anchors in the chain.
    pub num_residues: u32,
}

impl Overlap {
    pub fn query_span(&self) -> u32 {
        self.query_end_position_in_read - self.query_start_position_in_read
    }

    pub fn target_span(&self) -> u32 {
        self.target_end_position_in_read - self.target_start_position_in_read
    }
}

/// Builds the overlap spanned by a chain from its first and last anchor.
///
/// # Panics
///
/// If the two anchors belong to different read pairs. A chain never crosses read
/// pairs, so this is a broken upstream invariant rather than bad input.
pub fn create_simple_overlap(start: &Anchor, end: &Anchor, num_residues: u32) -> Overlap {
    assert!(
        start.same_read_pair(end),
        "chain spans read pairs ({}, {}) and ({}, {})",
        start.query_read_id,
        start.target_read_id,
        end.query_read_id,
        end.target_read_id
    );

    let query_start = start.query_position_in_read.min(end.query_position_in_read);
    let query_end = start.query_position_in_read.max(end.query_position_in_read);

    let (relative_strand, target_start, target_end) =
        if end.target_position_in_read < start.target_position_in_read {
            (
                RelativeStrand::Reverse,
                end.target_position_in_read,
                start.target_position_in_read,
            )
        } else {
            (
                RelativeStrand::Forward,
                start.target_position_in_read,
                end.target_position_in_read,
            )
        };

    Overlap {
        query_read_id: start.query_read_id,
        target_read_id: start.target_read_id,
        query_start_position_in_read: query_start,
        query_end_position_in_read: query_end,
        target_start_position_in_read: target_start,
        target_end_position_in_read: target_end,
        relative_strand,
        num_residues,
    }
}

/// Tab separated: `qid qstart qend strand tid tstart tend residues`
impl fmt::Display for Overlap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.query_read_id,
            self.query_start_position_in_read,
            self.query_end_position_in_read,
            self.relative_strand,
            self.target_read_id,
            self.target_start_position_in_read,
            self.target_end_position_in_read,
            self.num_residues
        )
    }
}

/// Post-filter for compacted overlaps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlapFilter {
    pub min_residues: u32,
    /// Applied to the shorter of the two axis spans.
    pub min_overlap_len: u32,
}

impl OverlapFilter {
    pub fn keep(&self, overlap: &Overlap) -> bool {
        overlap.num_residues >= self.min_residues
            && overlap.query_span().min(overlap.target_span()) >= self.min_overlap_len
    }
}
