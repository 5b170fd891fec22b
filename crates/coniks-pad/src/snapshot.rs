//! A single frozen epoch: the STR published for it and the tree it was
//! computed over, kept together so `LookupInEpoch` can serve authentication
//! paths against history without touching the live tree.

use coniks_str::SignedTreeRoot;
use coniks_tree::PrefixTree;

#[derive(Clone)]
pub(crate) struct Snapshot {
    pub str: SignedTreeRoot,
    pub tree: PrefixTree,
}
