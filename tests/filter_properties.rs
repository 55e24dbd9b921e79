use std::path::PathBuf;
use std::time::{Duration, Instant};

use proptest::prelude::*;
use reloadr::types::ChangeKind;
use reloadr::watch::{ChangeFilter, RawChange, Verdict};

// Suffixes like ".go" or ".tmpl".
fn suffix_strategy() -> impl Strategy<Value = String> {
    "\\.[a-z]{1,4}"
}

fn kind_strategy() -> impl Strategy<Value = ChangeKind> {
    prop_oneof![
        Just(ChangeKind::Write),
        Just(ChangeKind::Create),
        Just(ChangeKind::Remove),
        Just(ChangeKind::Rename),
        Just(ChangeKind::Other),
    ]
}

proptest! {
    // A fresh filter accepts a change iff it is a write whose full path ends
    // with one of the watched suffixes.
    #[test]
    fn acceptance_matches_kind_and_suffix(
        exts in proptest::collection::vec(suffix_strategy(), 1..4),
        stem in "[a-z]{1,8}",
        suffix in suffix_strategy(),
        kind in kind_strategy(),
    ) {
        let path = PathBuf::from(format!("/src/{stem}{suffix}"));
        let path_str = path.to_string_lossy().into_owned();
        let expected = kind == ChangeKind::Write
            && exts.iter().any(|e| path_str.ends_with(e.as_str()));

        let mut filter = ChangeFilter::new(exts, Duration::from_millis(250));
        let verdict = filter.evaluate(&RawChange::new(path, kind));

        prop_assert_eq!(verdict == Verdict::Accepted, expected);
        prop_assert_eq!(filter.last_accepted().is_some(), expected);
    }

    // Accepted changes are always more than `debounce` apart, and a change is
    // dropped only when it falls inside the window of the last accepted one.
    #[test]
    fn debounce_keeps_accepted_changes_apart(
        debounce_ms in 0u64..500,
        offsets in proptest::collection::vec(0u64..3_000, 1..40),
    ) {
        let mut offsets = offsets;
        offsets.sort_unstable();
        let debounce = Duration::from_millis(debounce_ms);
        let base = Instant::now();
        let mut filter = ChangeFilter::new(vec![".go".to_string()], debounce);

        let mut last: Option<u64> = None;
        for offset in offsets {
            let now = base + Duration::from_millis(offset);
            let verdict = filter.evaluate(&RawChange::write("/src/main.go").at(now));

            let expected_accept = match last {
                None => true,
                Some(prev) => offset - prev > debounce_ms,
            };
            prop_assert_eq!(verdict == Verdict::Accepted, expected_accept);
            if !expected_accept {
                prop_assert_eq!(verdict, Verdict::Debounced);
            } else {
                last = Some(offset);
            }
        }
    }
}
