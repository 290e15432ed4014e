//! Shell Tests
//!
//! Tests verify:
//! - Line tokenization and command-name normalization
//! - Local validation (unknown commands, arity) before anything is sent
//! - Reply rendering
//! - History persistence across sessions

use std::io::BufReader;
use std::net::TcpListener;
use std::thread;

use caskkv::client::shell::{
    classify, history_path, open_editor, parse_line, record, render_reply, save_history,
    ShellAction, EXIT_KEYWORD,
};
use caskkv::protocol::{read_frame, write_frame, CommandId, Reply, MAX_PAYLOAD_SIZE};
use caskkv::{CaskError, Client};
use tempfile::TempDir;

// =============================================================================
// Tokenization
// =============================================================================

#[test]
fn test_parse_line_splits_on_whitespace() {
    assert_eq!(parse_line("  set   foo\tbar  "), vec!["set", "foo", "bar"]);
}

#[test]
fn test_parse_line_lowercases_only_the_name() {
    assert_eq!(parse_line("SET Foo BAR"), vec!["set", "Foo", "BAR"]);
}

#[test]
fn test_parse_line_blank() {
    assert!(parse_line("").is_empty());
    assert!(parse_line("   \t ").is_empty());
}

// =============================================================================
// Classification
// =============================================================================

#[test]
fn test_classify_blank_line() {
    assert_eq!(classify("   "), ShellAction::Skip);
}

#[test]
fn test_classify_exit_keyword() {
    assert_eq!(classify(EXIT_KEYWORD), ShellAction::Exit);
    assert_eq!(classify("  QUIT "), ShellAction::Exit);
}

#[test]
fn test_classify_valid_command() {
    assert_eq!(
        classify("Set foo bar"),
        ShellAction::Execute(vec!["set".into(), "foo".into(), "bar".into()])
    );
    assert_eq!(classify("slen"), ShellAction::Execute(vec!["slen".into()]));
}

#[test]
fn test_classify_unknown_command() {
    match classify("flushall now") {
        ShellAction::Reject(msg) => assert_eq!(msg, "unknown command 'flushall'"),
        other => panic!("Expected Reject, got {:?}", other),
    }
}

#[test]
fn test_classify_too_few_tokens() {
    match classify("set a") {
        ShellAction::Reject(msg) => {
            assert_eq!(msg, "wrong number of arguments for 'set' (2 tokens)")
        }
        other => panic!("Expected Reject, got {:?}", other),
    }
}

#[test]
fn test_classify_too_many_tokens() {
    assert!(matches!(classify("get a b"), ShellAction::Reject(_)));
    assert!(matches!(classify("slen x"), ShellAction::Reject(_)));
}

#[test]
fn test_classify_variadic_minimum() {
    assert!(matches!(classify("mget"), ShellAction::Reject(_)));
    assert!(matches!(classify("mget a"), ShellAction::Execute(_)));
    assert!(matches!(classify("lpush l"), ShellAction::Reject(_)));
    assert!(matches!(classify("lpush l a b c d"), ShellAction::Execute(_)));
}

// =============================================================================
// Rejected Lines Never Reach the Wire
// =============================================================================

#[test]
fn test_rejected_line_sends_nothing() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let peer = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut writer = stream.try_clone().unwrap();
        let mut reader = BufReader::new(stream);

        let frame = read_frame(&mut reader, MAX_PAYLOAD_SIZE).unwrap();
        write_frame(&mut writer, 200, b"(nil)").unwrap();
        frame
    });

    let mut client = Client::connect(addr, None).unwrap();

    // Scenario: a short `set` is refused locally, the next line goes out
    assert!(matches!(classify("set a"), ShellAction::Reject(_)));

    // Unknown names fail before any I/O as well
    assert!(matches!(
        client.execute(&["nope", "x"]),
        Err(CaskError::UnknownCommand(name)) if name == "nope"
    ));

    let tokens = match classify("get a") {
        ShellAction::Execute(tokens) => tokens,
        other => panic!("Expected Execute, got {:?}", other),
    };
    let reply = client.execute(&tokens).unwrap();
    assert_eq!(reply.text(), "(nil)");

    let first = peer.join().unwrap();
    assert_eq!(first.selector, CommandId::Get.wire());
    assert_eq!(&first.payload[..], b"a");
}

// =============================================================================
// Rendering
// =============================================================================

#[test]
fn test_render_ok_reply_is_payload() {
    assert_eq!(render_reply(&Reply::ok("\"OK\"")), "\"OK\"");
    assert_eq!(render_reply(&Reply::ok("0) a\n1) b")), "0) a\n1) b");
}

#[test]
fn test_render_error_reply() {
    assert_eq!(render_reply(&Reply::error("key not found")), "(error) key not found");
}

#[test]
fn test_history_path_in_temp_dir() {
    let path = history_path();
    assert!(path.starts_with(std::env::temp_dir()));
    assert_eq!(path.file_name().unwrap(), "caskkv-cli.history");
}

// =============================================================================
// History
// =============================================================================

#[test]
fn test_history_survives_a_new_session() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("history");

    let mut editor = open_editor(&path).unwrap();
    assert_eq!(editor.history().iter().count(), 0);
    record(&mut editor, "set a 1");
    record(&mut editor, "get a");
    record(&mut editor, "set a");
    save_history(&mut editor, &path).unwrap();
    drop(editor);

    let editor = open_editor(&path).unwrap();
    let entries: Vec<String> = editor.history().iter().cloned().collect();
    assert_eq!(entries, vec!["set a 1", "get a", "set a"]);
}

#[test]
fn test_history_is_rewritten_on_save() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("history");

    let mut first = open_editor(&path).unwrap();
    record(&mut first, "slen");
    save_history(&mut first, &path).unwrap();

    let mut second = open_editor(&path).unwrap();
    record(&mut second, "get b");
    save_history(&mut second, &path).unwrap();

    let third = open_editor(&path).unwrap();
    let entries: Vec<String> = third.history().iter().cloned().collect();
    assert_eq!(entries, vec!["slen", "get b"]);
}
