use fieldrules::datasource::MAX_INDEX_GAP;
use fieldrules::path::join;
use fieldrules::{DataSource, PlainDataSource, TentativeOverlay};
use proptest::prelude::*;
use serde_json::{Value, json};

/// Strategy for arbitrary JSON values nested up to `depth` levels.
fn arb_json(depth: u32) -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|i| json!(i)),
        "[a-z]{1,8}".prop_map(Value::String),
    ];

    leaf.prop_recursive(depth, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec(("[a-z][a-z0-9]{0,5}", inner), 1..5).prop_map(|pairs| {
                let map: serde_json::Map<String, Value> = pairs.into_iter().collect();
                Value::Object(map)
            }),
        ]
    })
}

/// Paths whose numeric segments stay small, so writes pad at most a few
/// elements.
fn arb_path() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop_oneof!["[a-z]{1,4}", (0..4usize).prop_map(|i| i.to_string())],
        1..5,
    )
    .prop_map(|segments| join(&segments))
}

/// Paths with one index well past anything `arb_json` builds, up to
/// `usize::MAX`.
fn arb_far_path() -> impl Strategy<Value = String> {
    let floor = MAX_INDEX_GAP + 64;
    (
        "[a-z]{1,4}",
        prop_oneof![
            Just(usize::MAX),
            Just(floor),
            (floor..usize::MAX),
        ],
        prop::option::of("[a-z]{1,4}"),
    )
        .prop_map(|(head, index, tail)| match tail {
            Some(tail) => format!("{}.{}.{}", head, index, tail),
            None => format!("{}.{}", head, index),
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn set_then_get_returns_the_value(root in arb_json(3), p in arb_path(), v in arb_json(1)) {
        let mut source = PlainDataSource::new(root);
        source.set_value(&p, v.clone());
        prop_assert_eq!(source.get_value(&p), Some(v));
        prop_assert!(source.has_path(&p));
    }

    #[test]
    fn clones_do_not_share_writes(root in arb_json(3), p in arb_path(), v in arb_json(1)) {
        let source = PlainDataSource::new(root);
        let before = source.raw_data().into_owned();
        let mut copy = source.clone_source();
        copy.set_value(&p, v);
        copy.remove_path(&p);
        prop_assert_eq!(source.raw_data().into_owned(), before);
    }

    #[test]
    fn overlay_writes_leave_the_base_alone(
        root in arb_json(3),
        writes in prop::collection::vec((arb_path(), arb_json(1)), 1..5),
    ) {
        let base = PlainDataSource::new(root);
        let original = base.clone();
        let mut overlay = TentativeOverlay::new(base);
        for (p, v) in &writes {
            overlay.set_value(p, v.clone());
        }
        for (p, _) in &writes {
            // a later write to the same path wins
            let last = writes.iter().rev().find(|(q, _)| q == p).map(|(_, v)| v);
            let got = overlay.get_value(p);
            prop_assert_eq!(got.as_ref(), last);
        }
        prop_assert_eq!(overlay.base(), &original);
    }

    #[test]
    fn commit_all_matches_the_merged_view(
        root in arb_json(3),
        writes in prop::collection::vec((arb_path(), arb_json(1)), 1..5),
    ) {
        let mut overlay = TentativeOverlay::new(PlainDataSource::new(root));
        for (p, v) in &writes {
            overlay.set_value(p, v.clone());
        }
        let merged = overlay.raw_data().into_owned();
        overlay.commit_all();
        prop_assert_eq!(overlay.into_base().into_inner(), merged);
    }

    #[test]
    fn reads_never_panic(root in arb_json(3), p in "\\PC{0,30}") {
        let source = PlainDataSource::new(root);
        let _ = source.get_value(&p);
        let _ = source.has_path(&p);
    }

    #[test]
    fn far_writes_are_no_ops(root in arb_json(2), p in arb_far_path(), v in arb_json(1)) {
        let mut source = PlainDataSource::new(root);
        let before = source.clone();
        source.set_value(&p, v.clone());
        prop_assert_eq!(&source, &before);

        let mut overlay = TentativeOverlay::new(before.clone());
        overlay.set_value(&p, v.clone());
        prop_assert_eq!(overlay.get_value(&p), Some(v));
        prop_assert_eq!(overlay.raw_data().into_owned(), before.clone().into_inner());
        overlay.commit_all();
        prop_assert_eq!(overlay.into_base(), before);
    }
}
