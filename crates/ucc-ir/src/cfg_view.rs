//! The read-only CFG interface a renderer lowers against (§4.5).
//!
//! A renderer (not part of this crate -- its interface is the only thing
//! specified) walks a function in emission order via `next`, emitting one
//! node per block with its label and instructions, plus the block's
//! outgoing edges: a single `Branch` edge for a `BasicBlock`, or `Taken`/
//! `FallThrough` for a `ConditionBlock`. Depending on `CfgView` rather than
//! `Cfg` directly keeps such a consumer decoupled from lowering/optimizer
//! internals.

use crate::block::{Cfg, Successors};
use crate::opcode::Instruction;

/// One outgoing edge of a block, tagged the way a renderer would label it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge<Id> {
    /// The sole edge of a `BasicBlock`.
    Branch(Id),
    /// The condition-true edge of a `ConditionBlock`.
    Taken(Id),
    /// The condition-false edge of a `ConditionBlock`.
    FallThrough(Id),
}

pub trait CfgView {
    type NodeId: Copy + Eq;

    /// The first node to traverse from (the function's `head`).
    fn head(&self) -> Self::NodeId;

    /// The next node in emission order, distinct from the node's CFG
    /// successor edges.
    fn next(&self, id: Self::NodeId) -> Option<Self::NodeId>;

    fn label(&self, id: Self::NodeId) -> Option<&str>;

    fn instructions(&self, id: Self::NodeId) -> &[Instruction];

    /// This node's outgoing edges, tagged per §4.5.
    fn edges(&self, id: Self::NodeId) -> Vec<Edge<Self::NodeId>>;
}

impl CfgView for Cfg {
    type NodeId = crate::block::BlockId;

    fn head(&self) -> Self::NodeId {
        self.head
    }

    fn next(&self, id: Self::NodeId) -> Option<Self::NodeId> {
        self.block(id).next_block
    }

    fn label(&self, id: Self::NodeId) -> Option<&str> {
        self.block(id).label.as_deref()
    }

    fn instructions(&self, id: Self::NodeId) -> &[Instruction] {
        &self.block(id).instructions
    }

    fn edges(&self, id: Self::NodeId) -> Vec<Edge<Self::NodeId>> {
        match self.successors(id) {
            Successors::Jump(target) => vec![Edge::Branch(target)],
            Successors::Cond { taken, fall_through } => {
                vec![Edge::Taken(taken), Edge::FallThrough(fall_through)]
            }
            Successors::None => vec![],
        }
    }
}

/// Walks `view` from `head` via `next`, in emission order. A renderer
/// consuming a `CfgView` would drive its node emission off this sequence.
pub fn emission_order<V: CfgView>(view: &V) -> Vec<V::NodeId> {
    let mut order = Vec::new();
    let mut current = Some(view.head());
    while let Some(id) = current {
        order.push(id);
        current = view.next(id);
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::EdgeKind;

    #[test]
    fn emission_order_follows_next_block_not_cfg_edges() {
        let mut cfg = Cfg::new("f");
        // Connect entry to exit via an edge, but leave next_block as the
        // default head->entry->(nothing further) chain set up by Cfg::new.
        cfg.connect(cfg.entry, cfg.exit, EdgeKind::Jump);
        let order = emission_order(&cfg);
        assert_eq!(order, vec![cfg.head, cfg.entry]);
    }

    #[test]
    fn condition_block_reports_taken_and_fall_through_edges() {
        let mut cfg = Cfg::new("f");
        let then_blk = cfg.add_block(Some("if.then".into()));
        let end_blk = cfg.add_block(Some("if.end".into()));
        cfg.connect(cfg.entry, then_blk, EdgeKind::Taken);
        cfg.connect(cfg.entry, end_blk, EdgeKind::FallThrough);
        let edges = CfgView::edges(&cfg, cfg.entry);
        assert_eq!(edges, vec![Edge::Taken(then_blk), Edge::FallThrough(end_blk)]);
    }

    #[test]
    fn basic_block_reports_a_single_branch_edge() {
        let mut cfg = Cfg::new("f");
        cfg.connect(cfg.entry, cfg.exit, EdgeKind::Jump);
        let edges = CfgView::edges(&cfg, cfg.entry);
        assert_eq!(edges, vec![Edge::Branch(cfg.exit)]);
    }
}
