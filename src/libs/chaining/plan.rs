use crate::libs::chaining::error::{try_alloc, ChainError};
use crate::libs::overlap::Overlap;
use rayon::prelude::*;
use std::ops::Range;

/// Fill value of flattened slots no materializer has written.
///
/// Consumers must bound chains with the start offsets and residue counts instead of
/// scanning for this value.
pub const UNPOPULATED: u32 = u32::MAX;

const MIN_SCAN_BLOCK: usize = 4096;

/// Layout of the flattened chain buffer.
///
/// Chain `k` occupies `anchor_indices[anchor_chain_starts[k]..][..num_residues_k]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainPlan {
    pub num_total_anchors: usize,
    pub anchor_chain_starts: Vec<usize>,
    pub anchor_indices: Vec<u32>,
}

impl ChainPlan {
    pub fn num_chains(&self) -> usize {
        self.anchor_chain_starts.len()
    }

    /// Slot range of chain `k` in the flattened buffer.
    pub fn range(&self, k: usize, overlap: &Overlap) -> Range<usize> {
        let start = self.anchor_chain_starts[k];
        start..start + overlap.num_residues as usize
    }
}

/// Total anchors over all overlaps. Reads the residue counts in place.
pub fn total_residues(overlaps: &[Overlap]) -> usize {
    overlaps.par_iter().map(|o| o.num_residues as usize).sum()
}

/// Block length for the scan: a few blocks per worker, never tiny ones.
fn scan_block_len(n: usize) -> usize {
    let blocks = rayon::current_num_threads() * 4;
    ((n + blocks - 1) / blocks).max(MIN_SCAN_BLOCK)
}

/// Exclusive prefix sum of residue counts into `starts`, in three passes: per-block
/// sums in parallel, a serial scan over the block sums, then a parallel fill of each
/// block from its base offset.
///
/// Returns the grand total.
pub fn exclusive_scan_residues(
    overlaps: &[Overlap],
    starts: &mut [usize],
    block: usize,
) -> Result<usize, ChainError> {
    debug_assert_eq!(overlaps.len(), starts.len());
    debug_assert!(block > 0);

    let num_blocks = (overlaps.len() + block - 1) / block;
    let mut block_offsets: Vec<usize> = try_alloc("scan scratch", num_blocks)?;
    overlaps
        .par_chunks(block)
        .map(|chunk| chunk.iter().map(|o| o.num_residues as usize).sum::<usize>())
        .collect_into_vec(&mut block_offsets);

    let mut total = 0;
    for offset in block_offsets.iter_mut() {
        let sum = *offset;
        *offset = total;
        total += sum;
    }

    starts
        .par_chunks_mut(block)
        .zip(overlaps.par_chunks(block))
        .zip(block_offsets.par_iter())
        .for_each(|((out, chunk), &base)| {
            let mut acc = base;
            for (start, o) in out.iter_mut().zip(chunk) {
                *start = acc;
                acc += o.num_residues as usize;
            }
        });

    Ok(total)
}

/// One exact, fallible allocation of `len` copies of `fill`.
fn alloc_filled<T: Clone>(what: &'static str, len: usize, fill: T) -> Result<Vec<T>, ChainError> {
    let mut buf = try_alloc(what, len)?;
    buf.resize(len, fill);
    Ok(buf)
}

/// Sizes the flattened chain buffers for `overlaps` with one allocation each.
///
/// The residue total is reduced and read back before anything is allocated; this is
/// the only blocking point between synthesis and materialization. The anchor index
/// buffer is filled with [`UNPOPULATED`] and the start offsets with the exclusive
/// prefix sum of residue counts.
pub fn plan_chains(overlaps: &[Overlap]) -> Result<ChainPlan, ChainError> {
    let num_overlaps = overlaps.len();
    let num_total_anchors = total_residues(overlaps);

    let anchor_indices = alloc_filled("anchor indices", num_total_anchors, UNPOPULATED)?;
    let mut anchor_chain_starts = alloc_filled("anchor chain starts", num_overlaps, 0)?;

    let scanned = exclusive_scan_residues(
        overlaps,
        &mut anchor_chain_starts,
        scan_block_len(num_overlaps),
    )?;
    debug_assert_eq!(scanned, num_total_anchors);

    log::debug!(
        "Planned {} chains over {} anchor slots",
        num_overlaps,
        num_total_anchors
    );

    Ok(ChainPlan {
        num_total_anchors,
        anchor_chain_starts,
        anchor_indices,
    })
}
