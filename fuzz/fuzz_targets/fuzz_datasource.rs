#![no_main]

use arbitrary::Arbitrary;
use fieldrules::{DataSource, PlainDataSource, TentativeOverlay};
use libfuzzer_sys::fuzz_target;
use serde_json::{Value, json};

#[derive(Debug, Arbitrary)]
enum Segment {
    Key(u8),
    Index(u8),
}

#[derive(Debug, Arbitrary)]
enum Op {
    Set(Vec<Segment>, i32),
    Remove(Vec<Segment>),
    Commit(Vec<Segment>),
    CommitAll,
}

fn to_path(segments: &[Segment]) -> String {
    let parts: Vec<String> = segments
        .iter()
        .take(6)
        .map(|s| match s {
            Segment::Key(k) => format!("k{}", k % 4),
            Segment::Index(i) => (i % 8).to_string(),
        })
        .collect();
    fieldrules::path::join(&parts)
}

fuzz_target!(|ops: Vec<Op>| {
    let mut overlay = TentativeOverlay::new(PlainDataSource::default());
    for op in ops.iter().take(64) {
        match op {
            Op::Set(segments, v) => {
                let p = to_path(segments);
                overlay.set_value(&p, json!(v));
                assert_eq!(overlay.get_value(&p), Some(json!(v)));
            }
            Op::Remove(segments) => overlay.remove_path(&to_path(segments)),
            Op::Commit(segments) => {
                overlay.commit(&to_path(segments));
            }
            Op::CommitAll => {
                let merged: Value = overlay.raw_data().into_owned();
                overlay.commit_all();
                assert_eq!(overlay.base().raw_data().into_owned(), merged);
            }
        }
    }
});
