use crate::libs::anchor::{backtrace, predecessor_index, Anchor, NO_PREDECESSOR};
use crate::libs::chaining::error::{try_alloc, ChainError};
use crate::libs::overlap::{create_simple_overlap, Overlap, OverlapFilter};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

/// Per-anchor overlaps and the final select mask.
///
/// `overlaps[i]` is meaningful only where `select_mask[i]` is true.
#[derive(Debug, Clone, Default)]
pub struct Synthesis {
    pub overlaps: Vec<Overlap>,
    pub select_mask: Vec<bool>,
}

impl Synthesis {
    pub fn num_selected(&self) -> usize {
        self.select_mask.par_iter().filter(|&&s| s).count()
    }
}

/// Selected overlaps gathered densely, each with the anchor index of its chain terminal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectedChains {
    pub overlaps: Vec<Overlap>,
    pub terminals: Vec<u32>,
}

impl SelectedChains {
    pub fn len(&self) -> usize {
        self.overlaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlaps.is_empty()
    }

    /// Drops overlaps the filter rejects, keeping the terminals aligned.
    pub fn filter(self, filter: &OverlapFilter) -> Self {
        let (overlaps, terminals) = self
            .overlaps
            .into_par_iter()
            .zip(self.terminals.into_par_iter())
            .filter(|(o, _)| filter.keep(o))
            .unzip();

        SelectedChains {
            overlaps,
            terminals,
        }
    }

    /// First anchor index of each chain, assuming its anchors are consecutive and end
    /// at the terminal.
    pub fn run_starts(&self) -> Vec<u32> {
        self.overlaps
            .par_iter()
            .zip(self.terminals.par_iter())
            .map(|(o, &t)| t + 1 - o.num_residues)
            .collect()
    }
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<(), ChainError> {
    if expected != actual {
        return Err(ChainError::LengthMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Anchor indices are stored as `u32`, so a batch must fit that width.
fn check_index_width(len: usize) -> Result<(), ChainError> {
    if len > u32::MAX as usize {
        return Err(ChainError::TooManyAnchors { len });
    }
    Ok(())
}

/// Checks that the link arrays line up with the anchors, that every predecessor is
/// the sentinel or a strictly lower index, and that no link crosses read pairs.
/// Backward-pointing links cannot form a cycle, so every backtrace terminates.
pub fn validate_links(
    anchors: &[Anchor],
    score: &[f32],
    predecessor: &[i32],
) -> Result<(), ChainError> {
    check_index_width(anchors.len())?;
    check_len("score", anchors.len(), score.len())?;
    check_len("predecessor", anchors.len(), predecessor.len())?;

    let backward = predecessor
        .par_iter()
        .enumerate()
        .find_first(|&(i, &p)| p < NO_PREDECESSOR || (p >= 0 && p as usize >= i));
    if let Some((index, &predecessor)) = backward {
        return Err(ChainError::InvalidPredecessor { index, predecessor });
    }

    // every link now points at a valid lower index
    let mixed = predecessor.par_iter().enumerate().find_first(|&(i, &p)| {
        predecessor_index(p).is_some_and(|p| !anchors[i].same_read_pair(&anchors[p]))
    });
    match mixed {
        Some((index, &predecessor)) => Err(ChainError::MixedReadPair { index, predecessor }),
        None => Ok(()),
    }
}

/// Synthesis kernel. One worker per anchor; writes into caller buffers.
///
/// `select_mask` must start out all true. Anchors scoring below `min_score` are
/// unselected and their overlap slot is left untouched. Every other anchor is treated as
/// a candidate terminal: its chain is walked to the start, each predecessor on the way
/// is unselected, and the overlap spanning the chain is stored at the terminal's index.
///
/// Several walks may unselect the same anchor at once. Every store writes `false` and no
/// worker reads the mask inside this kernel, so relaxed stores are sufficient.
pub fn synthesize_into(
    anchors: &[Anchor],
    score: &[f32],
    predecessor: &[i32],
    min_score: f32,
    select_mask: &[AtomicBool],
    overlaps: &mut [Overlap],
) {
    debug_assert_eq!(anchors.len(), score.len());
    debug_assert_eq!(anchors.len(), predecessor.len());
    debug_assert_eq!(anchors.len(), select_mask.len());
    debug_assert_eq!(anchors.len(), overlaps.len());

    overlaps
        .par_iter_mut()
        .enumerate()
        .for_each(|(i, overlap)| {
            if score[i] < min_score {
                select_mask[i].store(false, Ordering::Relaxed);
                return;
            }

            let mut first = i;
            let mut count = 0u32;
            for index in backtrace(predecessor, i) {
                if index != i {
                    select_mask[index].store(false, Ordering::Relaxed);
                }
                first = index;
                count += 1;
            }

            *overlap = create_simple_overlap(&anchors[first], &anchors[i], count);
        });
}

/// Allocates the overlap array and select mask, then runs [`synthesize_into`].
pub fn synthesize_overlaps(
    anchors: &[Anchor],
    score: &[f32],
    predecessor: &[i32],
    min_score: f32,
) -> Result<Synthesis, ChainError> {
    let n = anchors.len();

    let mut overlaps = try_alloc("overlaps", n)?;
    overlaps.resize(n, Overlap::default());

    let mut mask: Vec<AtomicBool> = try_alloc("select mask", n)?;
    mask.extend((0..n).map(|_| AtomicBool::new(true)));

    synthesize_into(anchors, score, predecessor, min_score, &mask, &mut overlaps);

    Ok(Synthesis {
        overlaps,
        select_mask: mask.into_iter().map(AtomicBool::into_inner).collect(),
    })
}

/// Gathers the selected overlaps in anchor order.
pub fn compact_selected(synthesis: &Synthesis) -> SelectedChains {
    let (overlaps, terminals) = synthesis
        .select_mask
        .par_iter()
        .zip(synthesis.overlaps.par_iter())
        .enumerate()
        .filter(|&(_, (&selected, _))| selected)
        .map(|(i, (_, o))| (*o, i as u32))
        .unzip();

    SelectedChains {
        overlaps,
        terminals,
    }
}
