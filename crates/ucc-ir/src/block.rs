//! Basic blocks and the per-function control-flow graph.
//!
//! Blocks are arena-indexed (`BlockId`) rather than `Rc<RefCell<_>>`-linked,
//! per §9's guidance for cyclic graphs. The arena is a
//! `petgraph::stable_graph::StableDiGraph` so [`crate::optimize::block_removal`]
//! can drop unreachable nodes without invalidating every other `BlockId`
//! still held by the function (`head`/`entry`/`exit`, the loop-exit stack,
//! etc.) -- a plain `Graph` swap-removes and would renumber survivors.
//!
//! Whether a block is a `BasicBlock` (one successor) or a `ConditionBlock`
//! (two, `taken`/`fall_through`) is not a separate tag: it falls out of
//! which [`EdgeKind`]s are attached to its outgoing edges. Branch folding
//! turns a `ConditionBlock` into a `BasicBlock` simply by removing the
//! unchosen edge.

use std::collections::HashSet;

use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::opcode::Instruction;

pub type BlockId = petgraph::stable_graph::NodeIndex;

/// How one block's successor edge relates to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// The sole edge of a `BasicBlock`.
    Jump,
    /// The condition-true edge of a `ConditionBlock`.
    Taken,
    /// The condition-false edge of a `ConditionBlock`.
    FallThrough,
}

/// The successor shape of a block, read off its outgoing edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Successors {
    /// No outgoing edge (should not occur outside the function exit block).
    None,
    Jump(BlockId),
    Cond { taken: BlockId, fall_through: BlockId },
}

/// One basic block: a label, a straight-line instruction sequence, and the
/// dataflow sets §3 attaches to every block.
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub label: Option<String>,
    pub instructions: Vec<Instruction>,
    /// Emission-order successor, distinct from the CFG edges above.
    pub next_block: Option<BlockId>,

    pub rd_gen: HashSet<String>,
    pub rd_kill: HashSet<String>,
    pub rd_in: HashSet<String>,
    pub rd_out: HashSet<String>,

    pub la_use: HashSet<String>,
    pub la_def: HashSet<String>,
    pub la_in: HashSet<String>,
    pub la_out: HashSet<String>,
}

impl Block {
    pub fn new(label: Option<String>) -> Self {
        Block {
            label,
            ..Default::default()
        }
    }

    pub fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }
}

/// One function's control-flow graph.
#[derive(Debug, Clone)]
pub struct Cfg {
    pub name: String,
    graph: StableDiGraph<Block, EdgeKind>,
    pub head: BlockId,
    pub entry: BlockId,
    pub exit: BlockId,
}

impl Cfg {
    pub fn new(name: impl Into<String>) -> Self {
        let mut graph = StableDiGraph::new();
        let head = graph.add_node(Block::new(None));
        let entry = graph.add_node(Block::new(Some("entry".to_string())));
        let exit = graph.add_node(Block::new(Some("exit".to_string())));
        graph[head].next_block = Some(entry);
        Cfg {
            name: name.into(),
            graph,
            head,
            entry,
            exit,
        }
    }

    pub fn add_block(&mut self, label: Option<String>) -> BlockId {
        self.graph.add_node(Block::new(label))
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.graph[id]
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut Block {
        &mut self.graph[id]
    }

    pub fn connect(&mut self, from: BlockId, to: BlockId, kind: EdgeKind) {
        self.graph.add_edge(from, to, kind);
    }

    /// Removes every outgoing edge of `from`, used by branch folding before
    /// it installs the single chosen edge.
    pub fn disconnect_all(&mut self, from: BlockId) {
        let edges: Vec<_> = self
            .graph
            .edges_directed(from, Direction::Outgoing)
            .map(|e| e.id())
            .collect();
        for e in edges {
            self.graph.remove_edge(e);
        }
    }

    pub fn successors(&self, id: BlockId) -> Successors {
        let mut jump = None;
        let mut taken = None;
        let mut fall_through = None;
        for edge in self.graph.edges_directed(id, Direction::Outgoing) {
            match edge.weight() {
                EdgeKind::Jump => jump = Some(edge.target()),
                EdgeKind::Taken => taken = Some(edge.target()),
                EdgeKind::FallThrough => fall_through = Some(edge.target()),
            }
        }
        match (jump, taken, fall_through) {
            (Some(j), None, None) => Successors::Jump(j),
            (None, Some(t), Some(f)) => Successors::Cond {
                taken: t,
                fall_through: f,
            },
            (None, None, None) => Successors::None,
            _ => Successors::None,
        }
    }

    pub fn predecessors(&self, id: BlockId) -> Vec<BlockId> {
        self.graph.neighbors_directed(id, Direction::Incoming).collect()
    }

    /// The kind of the edge `from -> to`, if one exists.
    pub fn edge_kind(&self, from: BlockId, to: BlockId) -> Option<EdgeKind> {
        self.graph
            .edges_directed(from, Direction::Outgoing)
            .find(|e| e.target() == to)
            .map(|e| *e.weight())
    }

    /// Redirects every `from -> old_to` edge to `from -> new_to`, preserving
    /// each edge's kind. Used by block removal and merging when a block's
    /// sole predecessor or successor is being retired.
    pub fn reconnect(&mut self, from: BlockId, old_to: BlockId, new_to: BlockId) {
        let edges: Vec<(petgraph::stable_graph::EdgeIndex, EdgeKind)> = self
            .graph
            .edges_directed(from, Direction::Outgoing)
            .filter(|e| e.target() == old_to)
            .map(|e| (e.id(), *e.weight()))
            .collect();
        for (edge_id, kind) in edges {
            self.graph.remove_edge(edge_id);
            self.graph.add_edge(from, new_to, kind);
        }
    }

    /// Retargets every `next_block` pointer referencing `old` to `new`,
    /// including `head`/`entry`/`exit` themselves.
    pub fn retarget_next_block(&mut self, old: BlockId, new: BlockId) {
        for id in self.block_ids() {
            if self.graph[id].next_block == Some(old) {
                self.graph[id].next_block = Some(new);
            }
        }
        if self.head == old {
            self.head = new;
        }
        if self.entry == old {
            self.entry = new;
        }
        if self.exit == old {
            self.exit = new;
        }
    }

    pub fn block_ids(&self) -> Vec<BlockId> {
        self.graph.node_indices().collect()
    }

    pub fn remove_block(&mut self, id: BlockId) {
        self.graph.remove_node(id);
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_cfg_links_head_to_entry_via_next_block() {
        let cfg = Cfg::new("main");
        assert_eq!(cfg.block(cfg.head).next_block, Some(cfg.entry));
    }

    #[test]
    fn condition_block_reads_back_as_cond_successors() {
        let mut cfg = Cfg::new("main");
        let then_blk = cfg.add_block(Some("if.then".into()));
        let end_blk = cfg.add_block(Some("if.end".into()));
        cfg.connect(cfg.entry, then_blk, EdgeKind::Taken);
        cfg.connect(cfg.entry, end_blk, EdgeKind::FallThrough);
        match cfg.successors(cfg.entry) {
            Successors::Cond { taken, fall_through } => {
                assert_eq!(taken, then_blk);
                assert_eq!(fall_through, end_blk);
            }
            other => panic!("expected Cond, got {other:?}"),
        }
    }

    #[test]
    fn branch_folding_collapses_to_single_jump_successor() {
        let mut cfg = Cfg::new("main");
        let then_blk = cfg.add_block(Some("if.then".into()));
        let end_blk = cfg.add_block(Some("if.end".into()));
        cfg.connect(cfg.entry, then_blk, EdgeKind::Taken);
        cfg.connect(cfg.entry, end_blk, EdgeKind::FallThrough);

        cfg.disconnect_all(cfg.entry);
        cfg.connect(cfg.entry, then_blk, EdgeKind::Jump);
        assert_eq!(cfg.successors(cfg.entry), Successors::Jump(then_blk));
    }

    #[test]
    fn remove_block_keeps_other_ids_stable() {
        let mut cfg = Cfg::new("main");
        let a = cfg.add_block(Some("a".into()));
        let b = cfg.add_block(Some("b".into()));
        cfg.remove_block(a);
        assert!(cfg.block_ids().contains(&b));
        assert_eq!(cfg.block(b).label.as_deref(), Some("b"));
    }
}
