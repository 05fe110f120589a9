//! The six-pass optimizer (§4.4), run exactly once per function in a fixed
//! order -- not looped to a global fixed point. Each pass may invalidate
//! the dataflow facts the next one reads, so the driver re-runs reaching
//! definitions (or liveness) between passes rather than trusting stale
//! sets; `reaching_definitions`/`liveness` themselves always recompute
//! per-instruction gen/kill and use/def first, covering the "re-run
//! instruction analysis" step named alongside them.

mod branch_folding;
mod block_removal;
mod constant_folding;
mod copy_propagation;
mod dce;
mod merge_blocks;
mod support;

use std::collections::HashSet;

use crate::block::Cfg;
use crate::dataflow::{liveness, reaching_definitions};

pub use branch_folding::branch_folding;
pub use block_removal::block_removal;
pub use constant_folding::constant_folding;
pub use copy_propagation::copy_propagation;
pub use dce::dead_code_elimination;
pub use merge_blocks::merge_basic_blocks;

/// Runs the fixed pass sequence once over `cfg`. `global_names` seeds the
/// liveness pass's exit-block `out` set, same as in `dataflow::liveness`.
pub fn optimize(cfg: &mut Cfg, global_names: &HashSet<String>) {
    let _span = tracing::info_span!("optimize", function = %cfg.name).entered();

    {
        let _span = tracing::info_span!("copy_propagation").entered();
        reaching_definitions(cfg);
        copy_propagation(cfg);
    }
    {
        let _span = tracing::info_span!("constant_folding").entered();
        reaching_definitions(cfg);
        constant_folding(cfg);
    }
    {
        let _span = tracing::info_span!("branch_folding").entered();
        reaching_definitions(cfg);
        branch_folding(cfg);
    }
    {
        let _span = tracing::info_span!("dce_and_cleanup").entered();
        reaching_definitions(cfg);
        liveness(cfg, global_names);
        dead_code_elimination(cfg);
        block_removal(cfg);
        merge_basic_blocks(cfg);
    }
}
