//! The directory: the five request operations of spec.md §4.5 layered over
//! a [`Pad`].

use std::collections::HashMap;

use coniks_core::{Digest32, Epoch};
use coniks_pad::Pad;
use coniks_str::{Policies, SignedTreeRoot, TemporaryBinding};
use coniks_tree::LeafContent;
use parking_lot::RwLock;

use crate::wire::{DirectoryProof, ErrorCode};

/// Maintains the PAD, a per-epoch `name → TB` map, and `useTBs` (spec.md
/// §4.5). The reference always sets `useTBs` true; this implementation
/// doesn't expose a way to turn it off, since spec.md records that as the
/// resolved answer to its own open question rather than a real knob.
pub struct Directory {
    pad: Pad,
    pending_bindings: RwLock<HashMap<String, TemporaryBinding>>,
    pending_policies: RwLock<Option<Policies>>,
}

impl Directory {
    #[must_use]
    pub fn new(pad: Pad) -> Self {
        Self { pad, pending_bindings: RwLock::new(HashMap::new()), pending_policies: RwLock::new(None) }
    }

    #[must_use]
    pub fn pad(&self) -> &Pad {
        &self.pad
    }

    fn is_inclusion(path: &coniks_tree::AuthenticationPath) -> bool {
        matches!(path.leaf.content, LeafContent::Value { .. }) && path.leaf.index == path.lookup_index
    }

    /// Register rejects empty name/value, otherwise stages a pending
    /// binding and issues a TB, unless the name already exists in the
    /// published tree or already has one pending. The staged binding is
    /// *not* written into the live tree here — `Pad::lookup` and
    /// `Pad::set` share the same mutable arena (`coniks-tree`'s
    /// `PrefixTree`), so writing immediately would make a same-epoch
    /// `KeyLookup`/`Register` for this name see inclusion right away
    /// instead of the absence-with-TB state spec.md §4.5 requires until
    /// the next `Update`. The actual `Pad::set` happens in [`Self::update`].
    pub fn register(&self, name: &str, value: Vec<u8>) -> (ErrorCode, DirectoryProof) {
        if name.is_empty() || value.is_empty() {
            return (ErrorCode::ErrMalformedMessage, DirectoryProof { ap: vec![], str: vec![], tb: None });
        }

        let (path, str_now) = self.pad.lookup(name);
        if Self::is_inclusion(&path) {
            return (ErrorCode::NameExisted, DirectoryProof { ap: vec![path], str: vec![str_now], tb: None });
        }

        if let Some(existing) = self.pending_bindings.read().get(name).cloned() {
            return (ErrorCode::NameExisted, DirectoryProof { ap: vec![path], str: vec![str_now], tb: Some(existing) });
        }

        let tb = self.pad.sign_temporary_binding(Digest32::from_bytes(path.lookup_index), value);
        self.pending_bindings.write().insert(name.to_string(), tb.clone());

        tracing::info!(name, "registered pending binding");
        (ErrorCode::Success, DirectoryProof { ap: vec![path], str: vec![str_now], tb: Some(tb) })
    }

    /// `KeyLookup`: inclusion, absence-with-TB, or not-found.
    pub fn key_lookup(&self, name: &str) -> (ErrorCode, DirectoryProof) {
        let (path, str_now) = self.pad.lookup(name);
        if Self::is_inclusion(&path) {
            return (ErrorCode::Success, DirectoryProof { ap: vec![path], str: vec![str_now], tb: None });
        }
        if let Some(tb) = self.pending_bindings.read().get(name).cloned() {
            return (ErrorCode::Success, DirectoryProof { ap: vec![path], str: vec![str_now], tb: Some(tb) });
        }
        (ErrorCode::NameNotFound, DirectoryProof { ap: vec![path], str: vec![str_now], tb: None })
    }

    /// `KeyLookupInEpoch(name, e)`: lookup against a frozen snapshot; the
    /// STR slice runs from `e` to the latest epoch. Never returns a TB.
    pub fn key_lookup_in_epoch(&self, name: &str, epoch: Epoch) -> Result<(ErrorCode, DirectoryProof), ErrorCode> {
        if epoch > self.pad.current_epoch() {
            return Err(ErrorCode::ErrMalformedMessage);
        }
        let (path, _) = self.pad.lookup_in_epoch(name, epoch).map_err(|_| ErrorCode::ErrDirectory)?;
        let strs = self.pad.str_history(epoch, self.pad.current_epoch()).map_err(|_| ErrorCode::ErrDirectory)?;
        let error = if Self::is_inclusion(&path) { ErrorCode::Success } else { ErrorCode::NameNotFound };
        Ok((error, DirectoryProof { ap: vec![path], str: strs, tb: None }))
    }

    /// `Monitor(name, start, end)`: one authentication path per epoch in
    /// `[start, end]`, `end` clamped to the latest epoch.
    pub fn monitor(&self, name: &str, start: Epoch, end: Epoch) -> Result<DirectoryProof, ErrorCode> {
        if name.is_empty() || start > self.pad.current_epoch() || start > end {
            return Err(ErrorCode::ErrMalformedMessage);
        }
        let end = end.min(self.pad.current_epoch());

        let mut ap = Vec::new();
        let mut str = Vec::new();
        let mut epoch = start;
        loop {
            let (path, str_e) = self.pad.lookup_in_epoch(name, epoch).map_err(|_| ErrorCode::ErrDirectory)?;
            ap.push(path);
            str.push(str_e);
            if epoch == end {
                break;
            }
            epoch = epoch.next();
        }
        Ok(DirectoryProof { ap, str, tb: None })
    }

    /// `GetSTRHistory(start, end)`.
    pub fn str_history(&self, start: Epoch, end: Epoch) -> Result<Vec<SignedTreeRoot>, ErrorCode> {
        self.pad.str_history(start, end).map_err(|_| ErrorCode::ErrDirectory)
    }

    /// Takes effect at the next `Update`, per spec.md §4.5.
    pub fn set_policies(&self, new_deadline_secs: u64) {
        let current = self.pad.policies();
        *self.pending_policies.write() = Some(Policies::new(new_deadline_secs, current.vrf_public_key));
    }

    /// Folds every staged binding into the live tree, snapshots the PAD,
    /// and clears the pending-binding map: the bindings registered since
    /// the last `update` are now part of the new snapshot's tree (spec.md
    /// §4.5).
    pub fn update(&self) -> SignedTreeRoot {
        for (name, tb) in self.pending_bindings.read().iter() {
            self.pad.set(name, tb.value.clone());
        }
        let policies = self.pending_policies.write().take();
        let str = self.pad.update(policies);
        self.pending_bindings.write().clear();
        str
    }
}
