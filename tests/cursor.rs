// Cursor test suite.
//
// Invariants exercised:
// - A fresh cursor yields exactly size() distinct keys matching keys().
// - Exhausted cursors report !has_next() forever and fail next() with
//   IteratorExhausted.
// - Outstanding cursors block every mutation with ConcurrentModification;
//   dropping or exhausting them lifts the block.
use chained_hashset::{AnySet, IntegerSet, KeyKind, SetError, StringSet, Value};
use serde_json::json;
use std::collections::HashSet;

fn drain<C: chained_hashset::KeyCodec>(c: &mut chained_hashset::Cursor<C>) -> Vec<Value> {
    let mut out = Vec::new();
    while c.has_next() {
        out.push(c.next().expect("has_next promised a key"));
    }
    out
}

// Test: full traversal.
// Verifies: count == size(), all distinct, same order as keys().
#[test]
fn traversal_matches_keys() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut s = IntegerSet::new();
    for k in 0..300 {
        s.add(Some(&json!(k))).unwrap();
    }
    let mut c = s.iterator();
    let seen = drain(&mut c);
    assert_eq!(seen.len(), s.size());
    let distinct: HashSet<i64> = seen.iter().filter_map(Value::as_i64).collect();
    assert_eq!(distinct.len(), 300);
    assert_eq!(seen, s.keys());
}

// Test: exhaustion is sticky.
#[test]
fn exhausted_stays_exhausted() {
    let mut s = StringSet::new();
    s.add(Some(&json!("only"))).unwrap();
    let mut c = s.iterator();
    assert_eq!(c.next(), Ok(json!("only")));
    for _ in 0..5 {
        assert!(!c.has_next());
        assert_eq!(c.next(), Err(SetError::IteratorExhausted));
    }
}

// Test: snapshot size is fixed at creation.
// Assumes: mutations are refused while the cursor is outstanding.
// Verifies: the cursor yields exactly the keys present when it was created.
#[test]
fn cursor_sees_creation_time_keys() {
    let mut s = IntegerSet::new();
    s.add(Some(&json!(1))).unwrap();
    s.add(Some(&json!(2))).unwrap();
    let mut c = s.iterator();
    assert_eq!(s.add(Some(&json!(3))), Err(SetError::ConcurrentModification));
    assert_eq!(s.remove(Some(&json!(1))), Err(SetError::ConcurrentModification));
    let seen = drain(&mut c);
    assert_eq!(seen.len(), 2);
    assert_eq!(s.size(), 2);
    assert!(!s.contains(Some(&json!(3))).unwrap());
}

// Test: partially consumed cursors still block; dropping unblocks.
#[test]
fn partial_cursor_blocks_until_dropped() {
    let mut s = StringSet::new();
    for k in ["a", "b", "c"] {
        s.add(Some(&json!(k))).unwrap();
    }
    let mut c = s.iterator();
    c.next().unwrap();
    assert!(c.has_next());
    assert_eq!(s.clear(), Err(SetError::ConcurrentModification));
    assert_eq!(s.size(), 3);
    drop(c);
    s.clear().unwrap();
    assert!(s.empty());
}

// Test: a cursor made after mutations sees the new state.
#[test]
fn new_cursor_after_mutation() {
    let mut s = IntegerSet::new();
    s.add(Some(&json!(10))).unwrap();
    {
        let mut c = s.iterator();
        assert_eq!(drain(&mut c), vec![json!(10)]);
    }
    s.remove(Some(&json!(10))).unwrap();
    s.add(Some(&json!(20))).unwrap();
    let mut c = s.iterator();
    assert_eq!(drain(&mut c), vec![json!(20)]);
}

// Test: runtime-selected sets hand out working cursors for both kinds.
#[test]
fn any_set_cursors() {
    for (kind, k) in [(KeyKind::Integer, json!(-13)), (KeyKind::Text, json!("key1"))] {
        let mut s = AnySet::new(kind);
        s.add(Some(&k)).unwrap();
        let mut c = s.iterator();
        assert!(c.has_next());
        assert_eq!(c.next(), Ok(k));
        assert!(!c.has_next());
        assert_eq!(c.next(), Err(SetError::IteratorExhausted));
    }
}
