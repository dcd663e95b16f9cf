//! Chain reconstruction from DP predecessor links and the flattened chain layout.
//!
//! The stages run in order: [`synthesize_overlaps`] picks terminals and builds one
//! overlap per chain, [`plan_chains`] sizes the flattened buffer, and one of the
//! materializers fills it. [`ChainEngine`] runs the whole pipeline on its own pool.

pub mod engine;
pub mod error;
pub mod materialize;
pub mod plan;
pub mod synth;

pub use engine::{ChainEngine, ChainOutput, EngineOpts, MaterializeMode};
pub use error::ChainError;
pub use materialize::{materialize_backtrace, materialize_contiguous};
pub use plan::{exclusive_scan_residues, plan_chains, total_residues, ChainPlan, UNPOPULATED};
pub use synth::{
    compact_selected, synthesize_into, synthesize_overlaps, validate_links, SelectedChains,
    Synthesis,
};
