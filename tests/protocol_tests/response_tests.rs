//! Response Formatting Tests
//!
//! The exact payload text produced for each kind of store result.

use caskkv::protocol::{format_score, Outcome, Status, EMPTY_LIST_TEXT, NIL_TEXT, OK_TEXT};

fn text(outcome: Outcome) -> String {
    String::from_utf8(outcome.render()).unwrap()
}

#[test]
fn test_done_is_quoted_ok() {
    assert_eq!(text(Outcome::Done), "\"OK\"");
    assert_eq!(OK_TEXT, "\"OK\"");
}

#[test]
fn test_scalar_value() {
    assert_eq!(text(Outcome::Value(Some(b"bar".to_vec()))), "bar");
}

#[test]
fn test_absent_and_empty_scalars_are_nil() {
    assert_eq!(text(Outcome::Value(None)), "(nil)");
    assert_eq!(text(Outcome::Value(Some(Vec::new()))), NIL_TEXT);
}

#[test]
fn test_empty_list() {
    assert_eq!(text(Outcome::Values(vec![])), "(empty list)");
    assert_eq!(text(Outcome::Scored(vec![])), EMPTY_LIST_TEXT);
}

#[test]
fn test_values_are_numbered_from_zero() {
    let outcome = Outcome::Values(vec![None, Some(b"vb".to_vec()), None]);
    assert_eq!(text(outcome), "0) (nil)\n1) vb\n2) (nil)");
}

#[test]
fn test_single_value_list_has_no_trailing_newline() {
    let outcome = Outcome::Values(vec![Some(b"only".to_vec())]);
    assert_eq!(text(outcome), "0) only");
}

#[test]
fn test_scored_pairs_alternate_member_and_score() {
    let outcome = Outcome::Scored(vec![(b"alice".to_vec(), 1.5), (b"bob".to_vec(), 20.0)]);
    assert_eq!(
        text(outcome),
        "0) alice\n1) 1.500000\n2) bob\n3) 20.000000"
    );
}

#[test]
fn test_count_and_flag() {
    assert_eq!(text(Outcome::Count(0)), "0");
    assert_eq!(text(Outcome::Count(1234)), "1234");
    assert_eq!(text(Outcome::Flag(true)), "true");
    assert_eq!(text(Outcome::Flag(false)), "false");
}

#[test]
fn test_format_score_fixed_point() {
    assert_eq!(format_score(3.0), "3.000000");
    assert_eq!(format_score(-0.25), "-0.250000");
}

#[test]
fn test_into_reply_is_always_ok() {
    let reply = Outcome::Value(None).into_reply();
    assert_eq!(reply.status(), Some(Status::Ok));
    assert_eq!(reply.text(), "(nil)");
}
