use proptest::prelude::*;

use openwith::filter::fuzzy_match;

/// A string plus a subsequence of it, picked by a keep-mask
fn string_and_subsequence() -> impl Strategy<Value = (String, String)> {
    "[a-z0-9.\\-]{0,24}".prop_flat_map(|s| {
        let len = s.chars().count();
        (Just(s), proptest::collection::vec(any::<bool>(), len))
    })
    .prop_map(|(s, keep)| {
        let sub: String = s
            .chars()
            .zip(keep)
            .filter_map(|(c, k)| k.then_some(c))
            .collect();
        (s, sub)
    })
}

proptest! {
    #[test]
    fn subsequences_always_match((candidate, needle) in string_and_subsequence()) {
        prop_assert!(fuzzy_match(&candidate, &needle));
    }

    #[test]
    fn empty_needle_matches_anything(candidate in ".*") {
        prop_assert!(fuzzy_match(&candidate, ""));
    }

    #[test]
    fn longer_needle_never_matches(candidate in "[a-z]{0,12}", extra in "[a-z]") {
        let needle = format!("{candidate}{extra}");
        prop_assert!(!fuzzy_match(&candidate, &needle));
    }
}

#[test]
fn out_of_order_does_not_match() {
    assert!(!fuzzy_match("file", "lef"));
}
