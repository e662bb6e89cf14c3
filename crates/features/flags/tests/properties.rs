use proptest::prelude::*;
use sf_domain::features::FeatureDefinition;
use sf_flags::bucket::rollout_bucket;
use sf_flags::{FeatureRegistry, is_feature_enabled};

fn registry(enabled: bool, rollout: u8) -> FeatureRegistry {
    FeatureRegistry::builder()
        .feature(FeatureDefinition::new("x", "X").enabled(enabled).rollout(rollout))
        .build()
        .unwrap()
}

proptest! {
    #[test]
    fn disabled_is_always_off(user in proptest::option::of(".*"), rollout in 0u8..=100) {
        let registry = registry(false, rollout);
        prop_assert!(!is_feature_enabled(&registry, "x", user.as_deref()));
    }

    #[test]
    fn full_rollout_is_always_on(user in proptest::option::of(".*")) {
        let registry = registry(true, 100);
        prop_assert!(is_feature_enabled(&registry, "x", user.as_deref()));
    }

    #[test]
    fn zero_rollout_is_always_off(user in proptest::option::of(".*")) {
        let registry = registry(true, 0);
        prop_assert!(!is_feature_enabled(&registry, "x", user.as_deref()));
    }

    #[test]
    fn anonymous_never_in_partial_rollout(rollout in 1u8..100) {
        let registry = registry(true, rollout);
        prop_assert!(!is_feature_enabled(&registry, "x", None));
    }

    #[test]
    fn bucket_is_in_range(user in ".*") {
        let bucket = rollout_bucket(&user);
        prop_assert!((1..=100).contains(&bucket));
    }

    #[test]
    fn evaluation_is_deterministic(user in ".+", rollout in 1u8..100) {
        let registry = registry(true, rollout);
        let first = is_feature_enabled(&registry, "x", Some(&user));
        for _ in 0..3 {
            prop_assert_eq!(is_feature_enabled(&registry, "x", Some(&user)), first);
        }
    }

    #[test]
    fn raising_rollout_never_drops_a_user(user in ".+", low in 0u8..=100, high in 0u8..=100) {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        let before = is_feature_enabled(&registry(true, low), "x", Some(&user));
        let after = is_feature_enabled(&registry(true, high), "x", Some(&user));
        prop_assert!(!before || after);
    }
}
