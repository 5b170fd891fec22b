//! Property-based tests for the prefix tree's insertion/lookup contract
//! (spec.md §4.2): whatever name/value/salt/VRF key an arbitrary input
//! picks, a fresh lookup right after insertion must verify as inclusion,
//! and a name that was never inserted must never verify as inclusion of
//! some other value.

#[cfg(test)]
mod tests {
    use coniks_crypto::vrf::VrfKeyPair;
    use coniks_tree::{verify, PrefixTree};
    use proptest::prelude::*;

    fn name_strategy() -> impl Strategy<Value = String> {
        "[a-z]{1,12}"
    }

    fn value_strategy() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec(any::<u8>(), 0..32)
    }

    fn bytes32_strategy() -> impl Strategy<Value = [u8; 32]> {
        prop::array::uniform32(any::<u8>())
    }

    proptest! {
        /// Looking up a name right after inserting it always verifies as
        /// inclusion of exactly the value that was set.
        #[test]
        fn set_then_lookup_verifies_inclusion(
            name in name_strategy(),
            value in value_strategy(),
            salt in bytes32_strategy(),
            tree_nonce in bytes32_strategy(),
            vrf_seed in bytes32_strategy(),
        ) {
            let keys = VrfKeyPair::from_seed(&vrf_seed);
            let (index, proof) = keys.prove(name.as_bytes());

            let mut tree = PrefixTree::new(tree_nonce);
            tree.set(&name, value.clone(), *index.as_bytes(), salt);
            let root = tree.recompute_hash();

            let path = tree.lookup(&name, *index.as_bytes(), proof);
            prop_assert!(verify(&path, &name, &value, &keys.public_key(), &root).is_ok());
        }

        /// A name that was never inserted never verifies as inclusion of an
        /// arbitrary claimed value, whether the tree is empty or holds
        /// unrelated entries.
        #[test]
        fn lookup_for_never_inserted_name_is_not_inclusion(
            present_name in name_strategy(),
            present_value in value_strategy(),
            absent_name in name_strategy(),
            claimed_value in value_strategy(),
            salt in bytes32_strategy(),
            tree_nonce in bytes32_strategy(),
            vrf_seed in bytes32_strategy(),
        ) {
            prop_assume!(present_name != absent_name);

            let keys = VrfKeyPair::from_seed(&vrf_seed);
            let (present_index, _) = keys.prove(present_name.as_bytes());
            let (absent_index, absent_proof) = keys.prove(absent_name.as_bytes());

            let mut tree = PrefixTree::new(tree_nonce);
            tree.set(&present_name, present_value, *present_index.as_bytes(), salt);
            let root = tree.recompute_hash();

            let path = tree.lookup(&absent_name, *absent_index.as_bytes(), absent_proof);
            let result = verify(&path, &absent_name, &claimed_value, &keys.public_key(), &root);
            prop_assert!(result.is_err());
        }
    }
}
