//! # CONIKS Directory
//!
//! Exposes the five request operations of spec.md §4.5
//! (`Register`/`KeyLookup`/`KeyLookupInEpoch`/`Monitor`/`GetSTRHistory`)
//! over a [`coniks_pad::Pad`], plus the wire types of spec.md §6.

#![forbid(unsafe_code)]

mod directory;
pub mod wire;

pub use directory::Directory;

#[cfg(test)]
mod tests {
    use super::*;
    use coniks_crypto::{SigningKeyPair, VrfKeyPair};
    use coniks_pad::Pad;
    use coniks_str::Policies;
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;
    use wire::ErrorCode;

    fn new_directory() -> Directory {
        let mut rng = ChaCha20Rng::seed_from_u64(21);
        let sign_key = SigningKeyPair::generate(&mut rng);
        let vrf_key = VrfKeyPair::generate(&mut rng);
        let policies = Policies::new(3600, vrf_key.public_key());
        Directory::new(Pad::new(policies, sign_key, vrf_key, 100, &mut rng))
    }

    /// Seed scenario S3 (spec.md §8): register then look up within the same
    /// epoch returns an absence proof plus a TB; after `update`, the lookup
    /// returns inclusion with no TB.
    #[test]
    fn s3_register_then_lookup_same_epoch() {
        let dir = new_directory();

        let (err, proof) = dir.register("alice", b"k".to_vec());
        assert_eq!(err, ErrorCode::Success);
        assert!(proof.tb.is_some());

        let (err, proof) = dir.key_lookup("alice");
        assert_eq!(err, ErrorCode::Success);
        assert!(proof.tb.is_some());
        assert!(!matches!(proof.ap[0].leaf.content, coniks_tree::LeafContent::Value { .. }));

        dir.update();

        let (err, proof) = dir.key_lookup("alice");
        assert_eq!(err, ErrorCode::Success);
        assert!(proof.tb.is_none());
        assert!(matches!(proof.ap[0].leaf.content, coniks_tree::LeafContent::Value { .. }));
    }

    /// Seed scenario S4 (spec.md §8): a second `Register` for the same name
    /// in the same epoch returns `NameExisted` with the original TB; the
    /// tree still maps the first value.
    #[test]
    fn s4_duplicate_register_keeps_first_value() {
        let dir = new_directory();

        let (err1, proof1) = dir.register("alice", b"k1".to_vec());
        assert_eq!(err1, ErrorCode::Success);
        let tb1 = proof1.tb.unwrap();

        let (err2, proof2) = dir.register("alice", b"k2".to_vec());
        assert_eq!(err2, ErrorCode::NameExisted);
        assert_eq!(proof2.tb.unwrap().signature, tb1.signature);

        dir.update();
        let (_, proof) = dir.key_lookup("alice");
        match &proof.ap[0].leaf.content {
            coniks_tree::LeafContent::Value { value, .. } => assert_eq!(value, b"k1"),
            other => panic!("expected inclusion, got {other:?}"),
        }
    }

    #[test]
    fn register_rejects_empty_name_or_value() {
        let dir = new_directory();
        let (err, _) = dir.register("", b"v".to_vec());
        assert_eq!(err, ErrorCode::ErrMalformedMessage);
        let (err, _) = dir.register("name", vec![]);
        assert_eq!(err, ErrorCode::ErrMalformedMessage);
    }

    #[test]
    fn key_lookup_not_found_for_unregistered_name() {
        let dir = new_directory();
        let (err, proof) = dir.key_lookup("nobody");
        assert_eq!(err, ErrorCode::NameNotFound);
        assert!(proof.tb.is_none());
    }
}
