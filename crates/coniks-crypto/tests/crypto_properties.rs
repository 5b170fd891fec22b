//! Property-based tests for the signature and VRF facades (spec.md §4.1):
//! whatever seed/message/name an arbitrary input picks, signing and proving
//! must round-trip, and flipping any single byte of the signed/proved
//! material must be caught.

#[cfg(test)]
mod tests {
    use coniks_crypto::signature::{self, SigningKeyPair};
    use coniks_crypto::vrf::{self, VrfKeyPair};
    use proptest::prelude::*;

    fn seed_strategy() -> impl Strategy<Value = [u8; 32]> {
        prop::array::uniform32(any::<u8>())
    }

    fn message_strategy() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec(any::<u8>(), 0..64)
    }

    fn name_strategy() -> impl Strategy<Value = String> {
        "[a-z]{1,16}"
    }

    proptest! {
        /// Every message signed by a keypair verifies under that keypair's
        /// own public key.
        #[test]
        fn sign_then_verify_round_trips(seed in seed_strategy(), message in message_strategy()) {
            let keys = SigningKeyPair::from_seed(&seed);
            let sig = keys.sign(&message);
            prop_assert!(signature::verify(&keys.public_key(), &message, &sig).is_ok());
        }

        /// Signing is deterministic: the same seed and message always
        /// produce the same signature.
        #[test]
        fn signing_is_deterministic(seed in seed_strategy(), message in message_strategy()) {
            let keys = SigningKeyPair::from_seed(&seed);
            prop_assert_eq!(keys.sign(&message), keys.sign(&message));
        }

        /// Flipping any byte of a signed message breaks verification.
        #[test]
        fn tampering_the_message_breaks_verification(
            seed in seed_strategy(),
            mut message in prop::collection::vec(any::<u8>(), 1..64),
            flip_at in any::<usize>(),
        ) {
            let keys = SigningKeyPair::from_seed(&seed);
            let sig = keys.sign(&message);
            let index = flip_at % message.len();
            message[index] ^= 0xFF;
            prop_assert!(signature::verify(&keys.public_key(), &message, &sig).is_err());
        }

        /// Proving then verifying a name's VRF index always succeeds under
        /// the same key.
        #[test]
        fn prove_then_verify_round_trips(seed in seed_strategy(), name in name_strategy()) {
            let keys = VrfKeyPair::from_seed(&seed);
            let (index, proof) = keys.prove(name.as_bytes());
            prop_assert!(vrf::verify(&keys.public_key(), name.as_bytes(), &index, &proof).is_ok());
        }

        /// Proving a name is deterministic: the same key and name always
        /// yield the same index.
        #[test]
        fn proving_is_deterministic(seed in seed_strategy(), name in name_strategy()) {
            let keys = VrfKeyPair::from_seed(&seed);
            let (i1, _) = keys.prove(name.as_bytes());
            let (i2, _) = keys.prove(name.as_bytes());
            prop_assert_eq!(i1, i2);
        }

        /// A proof for one name never verifies against a different claimed
        /// index for the same key.
        #[test]
        fn proof_does_not_verify_under_a_different_name(
            seed in seed_strategy(),
            name in name_strategy(),
            other_name in name_strategy(),
        ) {
            prop_assume!(name != other_name);
            let keys = VrfKeyPair::from_seed(&seed);
            let (index, proof) = keys.prove(name.as_bytes());
            prop_assert!(vrf::verify(&keys.public_key(), other_name.as_bytes(), &index, &proof).is_err());
        }
    }
}
