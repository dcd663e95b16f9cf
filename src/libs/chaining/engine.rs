use crate::libs::anchor::Anchor;
use crate::libs::chaining::error::ChainError;
use crate::libs::chaining::materialize::{materialize_backtrace, materialize_contiguous};
use crate::libs::chaining::plan::{plan_chains, ChainPlan};
use crate::libs::chaining::synth::{compact_selected, synthesize_overlaps, validate_links};
use crate::libs::overlap::{Overlap, OverlapFilter};
use rayon::{ThreadPool, ThreadPoolBuilder};

/// How the flattened chain buffer gets populated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MaterializeMode {
    /// Follow predecessor links from each terminal.
    #[default]
    Backtrace,
    /// Every chain is a run of consecutive anchors ending at its terminal.
    Contiguous,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineOpts {
    /// Anchors scoring below this never terminate a chain
    pub min_score: f32,
    /// Worker threads, 0 for one per core
    pub threads: usize,
    pub mode: MaterializeMode,
    pub filter: Option<OverlapFilter>,
}

/// Everything the engine hands to downstream consumers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainOutput {
    /// Retained overlaps, in terminal order
    pub overlaps: Vec<Overlap>,
    /// Terminal anchor index of each retained overlap
    pub terminals: Vec<u32>,
    /// Per-anchor select mask as left by synthesis, before any filtering
    pub select_mask: Vec<bool>,
    pub plan: ChainPlan,
}

impl ChainOutput {
    pub fn num_total_anchors(&self) -> usize {
        self.plan.num_total_anchors
    }

    /// Anchor indices of chain `k`, start to end.
    pub fn chain(&self, k: usize) -> &[u32] {
        &self.plan.anchor_indices[self.plan.range(k, &self.overlaps[k])]
    }

    pub fn chains(&self) -> impl Iterator<Item = (&Overlap, &[u32])> + '_ {
        self.overlaps
            .iter()
            .enumerate()
            .map(move |(k, o)| (o, self.chain(k)))
    }
}

/// Runs synthesis, planning and materialization on its own worker pool.
pub struct ChainEngine {
    opts: EngineOpts,
    pool: ThreadPool,
}

impl ChainEngine {
    pub fn new(opts: EngineOpts) -> Result<Self, ChainError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(opts.threads)
            .thread_name(|i| format!("anchorchain-{}", i))
            .build()?;

        log::debug!("Chain engine using {} threads", pool.current_num_threads());

        Ok(ChainEngine { opts, pool })
    }

    /// Turns scored, linked anchors into overlaps and their flattened chains.
    ///
    /// Fails without touching any output if the links are malformed or a buffer
    /// cannot be allocated.
    pub fn run(
        &self,
        anchors: &[Anchor],
        score: &[f32],
        predecessor: &[i32],
    ) -> Result<ChainOutput, ChainError> {
        self.pool
            .install(|| self.run_in_pool(anchors, score, predecessor))
    }

    fn run_in_pool(
        &self,
        anchors: &[Anchor],
        score: &[f32],
        predecessor: &[i32],
    ) -> Result<ChainOutput, ChainError> {
        validate_links(anchors, score, predecessor)?;

        let synthesis = synthesize_overlaps(anchors, score, predecessor, self.opts.min_score)?;
        log::info!(
            "{} anchors, {} chain terminals at min score {}",
            anchors.len(),
            synthesis.num_selected(),
            self.opts.min_score
        );
        let mut selected = compact_selected(&synthesis);

        if let Some(filter) = &self.opts.filter {
            let before = selected.len();
            selected = selected.filter(filter);
            log::debug!("Filter dropped {} overlaps", before - selected.len());
        }

        let run_starts = match self.opts.mode {
            MaterializeMode::Contiguous => Some(selected.run_starts()),
            MaterializeMode::Backtrace => None,
        };

        let mut plan = plan_chains(&selected.overlaps)?;
        log::info!(
            "{} overlaps hold {} anchors",
            selected.len(),
            plan.num_total_anchors
        );

        match run_starts {
            Some(run_starts) => materialize_contiguous(&selected.overlaps, &run_starts, &mut plan),
            None => materialize_backtrace(
                &selected.overlaps,
                &selected.terminals,
                predecessor,
                None,
                &mut plan,
            ),
        }

        Ok(ChainOutput {
            overlaps: selected.overlaps,
            terminals: selected.terminals,
            select_mask: synthesis.select_mask,
            plan,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::overlap::RelativeStrand;

    fn engine(min_score: f32, threads: usize) -> ChainEngine {
        ChainEngine::new(EngineOpts {
            min_score,
            threads,
            ..Default::default()
        })
        .unwrap()
    }

    /// Two read pairs: a forward chain 0 <- 1 <- 2 and a reverse pair 3 <- 4.
    fn two_pairs() -> (Vec<Anchor>, Vec<f32>, Vec<i32>) {
        let anchors = vec![
            Anchor::new(0, 5, 0, 10),
            Anchor::new(0, 20, 0, 25),
            Anchor::new(0, 35, 0, 40),
            Anchor::new(1, 0, 2, 40),
            Anchor::new(1, 30, 2, 10),
        ];
        let score = vec![1.0, 2.0, 3.0, 1.0, 2.0];
        let pred = vec![-1, 0, 1, -1, 3];
        (anchors, score, pred)
    }

    #[test]
    fn test_run() {
        let (anchors, score, pred) = two_pairs();
        let out = engine(2.0, 2).run(&anchors, &score, &pred).unwrap();

        assert_eq!(out.select_mask, vec![false, false, true, false, true]);
        assert_eq!(out.terminals, vec![2, 4]);
        assert_eq!(out.num_total_anchors(), 5);
        assert_eq!(out.plan.anchor_chain_starts, vec![0, 3]);
        assert_eq!(out.chain(0), &[0, 1, 2]);
        assert_eq!(out.chain(1), &[3, 4]);

        let o = &out.overlaps[1];
        assert_eq!(o.relative_strand, RelativeStrand::Reverse);
        assert_eq!(o.target_start_position_in_read, 10);
        assert_eq!(o.target_end_position_in_read, 40);

        let lens: Vec<usize> = out.chains().map(|(_, c)| c.len()).collect();
        assert_eq!(lens, vec![3, 2]);
    }

    #[test]
    fn test_pool_size_independent() {
        let n = 3000u32;
        let anchors: Vec<Anchor> = (0..n).map(|i| Anchor::new(i / 100, i, 0, i)).collect();
        // chains of up to 7 anchors, never crossing a read boundary
        let pred: Vec<i32> = (0..n)
            .map(|i| if i % 100 == 0 || i % 7 == 0 { -1 } else { i as i32 - 1 })
            .collect();
        let score: Vec<f32> = (0..n).map(|i| (i % 5) as f32).collect();

        let single = engine(1.0, 1).run(&anchors, &score, &pred).unwrap();
        let many = engine(1.0, 8).run(&anchors, &score, &pred).unwrap();
        assert_eq!(single, many);
    }

    #[test]
    fn test_filter_and_contiguous() {
        let (anchors, score, pred) = two_pairs();
        let eng = ChainEngine::new(EngineOpts {
            min_score: 2.0,
            threads: 1,
            mode: MaterializeMode::Contiguous,
            filter: Some(OverlapFilter {
                min_residues: 3,
                min_overlap_len: 0,
            }),
        })
        .unwrap();
        let out = eng.run(&anchors, &score, &pred).unwrap();

        assert_eq!(out.terminals, vec![2]);
        assert_eq!(out.chain(0), &[0, 1, 2]);
        // the mask still reports both terminals
        assert_eq!(out.select_mask, vec![false, false, true, false, true]);
    }

    #[test]
    fn test_empty_input() {
        let out = engine(0.0, 1).run(&[], &[], &[]).unwrap();
        assert_eq!(out.num_total_anchors(), 0);
        assert!(out.overlaps.is_empty());
        assert!(out.plan.anchor_chain_starts.is_empty());
        assert!(out.plan.anchor_indices.is_empty());
    }

    #[test]
    fn test_rejects_mixed_read_pairs() {
        let anchors = vec![Anchor::new(0, 5, 0, 10), Anchor::new(0, 20, 1, 25)];
        let err = engine(0.0, 2)
            .run(&anchors, &[1.0, 2.0], &[-1, 0])
            .unwrap_err();
        assert_eq!(
            err,
            ChainError::MixedReadPair {
                index: 1,
                predecessor: 0
            }
        );
    }

    #[test]
    fn test_rejects_bad_links() {
        let (anchors, score, _) = two_pairs();
        let err = engine(0.0, 1)
            .run(&anchors, &score, &[-1, 0, 3, -1, 3])
            .unwrap_err();
        assert_eq!(
            err,
            ChainError::InvalidPredecessor {
                index: 2,
                predecessor: 3
            }
        );
    }
}
