//! Pass 5: block removal (§4.4).
//!
//! BFS from the function's head following CFG successor edges; any block
//! never reached is unreachable code and is dropped, along with its
//! `next_block` link.

use std::collections::{HashSet, VecDeque};

use crate::block::{BlockId, Cfg, Successors};

pub fn block_removal(cfg: &mut Cfg) {
    // `head` carries no CFG edges of its own -- it exists only to anchor the
    // `next_block` emission chain -- so the edge-reachability walk starts at
    // `entry`, the function's first block of real control flow. `head`
    // itself is never a removal candidate.
    let mut visited: HashSet<BlockId> = HashSet::new();
    let mut queue: VecDeque<BlockId> = VecDeque::new();
    visited.insert(cfg.head);
    queue.push_back(cfg.entry);
    visited.insert(cfg.entry);

    while let Some(id) = queue.pop_front() {
        for s in successors_of(cfg, id) {
            if visited.insert(s) {
                queue.push_back(s);
            }
        }
    }

    for id in cfg.block_ids() {
        if !visited.contains(&id) {
            cfg.remove_block(id);
        }
    }
}

fn successors_of(cfg: &Cfg, id: BlockId) -> Vec<BlockId> {
    match cfg.successors(id) {
        Successors::Jump(s) => vec![s],
        Successors::Cond { taken, fall_through } => vec![taken, fall_through],
        Successors::None => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::EdgeKind;

    #[test]
    fn drops_a_block_with_no_path_from_head() {
        let mut cfg = Cfg::new("f");
        let orphan = cfg.add_block(Some("orphan".into()));
        cfg.connect(cfg.entry, cfg.exit, EdgeKind::Jump);
        let before = cfg.node_count();
        block_removal(&mut cfg);
        assert!(!cfg.block_ids().contains(&orphan));
        assert_eq!(cfg.node_count(), before - 1);
    }

    #[test]
    fn keeps_every_block_reachable_from_head() {
        let mut cfg = Cfg::new("f");
        cfg.connect(cfg.entry, cfg.exit, EdgeKind::Jump);
        let before = cfg.node_count();
        block_removal(&mut cfg);
        assert_eq!(cfg.node_count(), before);
    }
}
