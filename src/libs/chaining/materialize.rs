use crate::libs::anchor::backtrace;
use crate::libs::chaining::plan::ChainPlan;
use crate::libs::overlap::Overlap;

/// Chains per task once the recursive split bottoms out.
const LEAF_CHAINS: usize = 256;

/// Hands each chain its own disjoint sub-slice of the flattened buffer and calls
/// `f(k, slots)` for it, splitting the chain range in halves with `rayon::join`.
///
/// `buf` starts at `starts[0]` and chain `k`'s slice is `num_residues` long.
fn for_each_chain_mut<F>(
    first: usize,
    overlaps: &[Overlap],
    starts: &[usize],
    buf: &mut [u32],
    f: &F,
) where
    F: Fn(usize, &mut [u32]) + Sync,
{
    if overlaps.len() <= LEAF_CHAINS {
        let mut rest = buf;
        for (j, o) in overlaps.iter().enumerate() {
            let (slots, tail) = std::mem::take(&mut rest).split_at_mut(o.num_residues as usize);
            f(first + j, slots);
            rest = tail;
        }
        return;
    }

    let mid = overlaps.len() / 2;
    let (lo, hi) = buf.split_at_mut(starts[mid] - starts[0]);
    rayon::join(
        || for_each_chain_mut(first, &overlaps[..mid], &starts[..mid], lo, f),
        || for_each_chain_mut(first + mid, &overlaps[mid..], &starts[mid..], hi, f),
    );
}

fn dispatch<F>(overlaps: &[Overlap], plan: &mut ChainPlan, f: &F)
where
    F: Fn(usize, &mut [u32]) + Sync,
{
    assert_eq!(
        overlaps.len(),
        plan.anchor_chain_starts.len(),
        "plan was made for a different overlap set"
    );
    if overlaps.is_empty() {
        return;
    }
    for_each_chain_mut(
        0,
        overlaps,
        &plan.anchor_chain_starts,
        &mut plan.anchor_indices,
        f,
    );
}

/// Fills the flattened buffer by walking each chain's predecessor links from its
/// terminal anchor `terminals[k]`.
///
/// The walk runs end to start, so the `s`-th anchor visited lands at slot
/// `num_residues - 1 - s` of the chain's range, leaving the range in start-to-end order.
/// With a `select_mask`, chains whose flag is false are skipped and their range keeps
/// its fill value.
pub fn materialize_backtrace(
    overlaps: &[Overlap],
    terminals: &[u32],
    predecessor: &[i32],
    select_mask: Option<&[bool]>,
    plan: &mut ChainPlan,
) {
    debug_assert_eq!(overlaps.len(), terminals.len());

    dispatch(overlaps, plan, &|k: usize, slots: &mut [u32]| {
        if let Some(mask) = select_mask {
            if !mask[k] {
                return;
            }
        }

        let mut written = 0;
        for (slot, index) in slots
            .iter_mut()
            .rev()
            .zip(backtrace(predecessor, terminals[k] as usize))
        {
            *slot = index as u32;
            written += 1;
        }
        debug_assert_eq!(written, slots.len(), "chain {} shorter than its overlap", k);
    });
}

/// Fills the flattened buffer for chains whose anchors are the consecutive run
/// `run_starts[k] .. run_starts[k] + num_residues`. Contiguity is not checked.
pub fn materialize_contiguous(overlaps: &[Overlap], run_starts: &[u32], plan: &mut ChainPlan) {
    debug_assert_eq!(overlaps.len(), run_starts.len());

    dispatch(overlaps, plan, &|k: usize, slots: &mut [u32]| {
        for (slot, index) in slots.iter_mut().zip(run_starts[k]..) {
            *slot = index;
        }
    });
}
