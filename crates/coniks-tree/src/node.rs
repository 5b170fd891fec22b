//! Arena-indexed tree nodes.
//!
//! The tree is a `Vec<Node>` addressed by `NodeId` rather than a graph of
//! `Rc`/parent pointers (spec §9 design notes, option (a)): nodes never move
//! once allocated, `Clone` is a plain `Vec` clone, and the borrow checker
//! never has to referee simultaneous parent/child mutation. The path from
//! root to a node is not stored on the node itself — every traversal that
//! needs it (hashing, lookup) rebuilds it by recursing from the root, since
//! the root is always reachable as `NodeId = 0`.

use coniks_core::Digest32;
use serde::{Deserialize, Serialize};

/// Index into the tree's node arena. Stable for the lifetime of the node.
pub type NodeId = u32;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) enum Node {
    Interior(Interior),
    Leaf(Leaf),
    Empty(Empty),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Interior {
    pub left: NodeId,
    pub right: NodeId,
    pub left_hash: Option<Digest32>,
    pub right_hash: Option<Digest32>,
    /// Depth of this interior node itself (root is 0); children sit at `level + 1`.
    pub level: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Leaf {
    pub name: String,
    #[serde(with = "serde_bytes")]
    pub value: Vec<u8>,
    pub index: [u8; 32],
    pub commitment: Digest32,
    pub salt: [u8; 32],
    pub level: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Empty {
    pub level: u32,
}
