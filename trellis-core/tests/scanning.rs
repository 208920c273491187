//! End-to-end scanning tests driving primitive sequences the way the node
//! builder does: one stream per document, cursor always moving forward.

use pretty_assertions::assert_eq;
use trellis_core::{ErrorKind, Stream};

/// Scan an attribute dict the way the tag builder drives the stream:
/// `{word: expression, word: expression, ...}`.
fn scan_attributes(input: &str) -> Vec<(String, String)> {
    let mut stream = Stream::new(input);
    let mut attributes = Vec::new();

    stream.read_symbol(&["{"]).unwrap();
    loop {
        stream.read_whitespace(true);
        let key = stream.read_word(&['-']).unwrap();
        stream.read_symbol(&[":"]).unwrap();
        stream.read_whitespace(false);
        let value = match stream.peek() {
            Some('"') | Some('\'') => stream.read_quoted_string().unwrap(),
            _ => stream.read_expression().unwrap(),
        };
        attributes.push((key, value));

        stream.read_whitespace(false);
        if stream.read_symbol(&[",", "}"]).unwrap() == "}" {
            break;
        }
    }

    attributes
}

#[test]
fn attribute_dict_with_expressions() {
    let attributes = scan_attributes(
        "{class: \"btn btn-primary\", href: user.get_absolute_url(), visible: count >= 10}",
    );
    assert_eq!(
        attributes,
        vec![
            ("class".to_string(), "btn btn-primary".to_string()),
            ("href".to_string(), "user.get_absolute_url()".to_string()),
            ("visible".to_string(), "count >= 10".to_string()),
        ]
    );
}

#[test]
fn attribute_dict_expression_stops_at_brace() {
    let attributes = scan_attributes("{selected: sort_by == \"turnover\"}");
    assert_eq!(
        attributes,
        vec![("selected".to_string(), "sort_by == \"turnover\"".to_string())]
    );
}

#[test]
fn tag_line_scan() {
    let mut stream = Stream::new("%div.wide#main content here\nnext line\n");

    assert_eq!(stream.read_symbol(&["%"]).unwrap(), "%");
    assert_eq!(stream.read_word(&[]).unwrap(), "div");
    assert_eq!(stream.read_symbol(&[".", "#"]).unwrap(), ".");
    assert_eq!(stream.read_word(&[]).unwrap(), "wide");
    assert_eq!(stream.read_symbol(&[".", "#"]).unwrap(), "#");
    assert_eq!(stream.read_word(&[]).unwrap(), "main");
    stream.read_whitespace(false);
    assert_eq!(stream.read_line().as_deref(), Some("content here"));

    // cursor sits at the start of the next line
    assert_eq!(stream.peek_indentation(), Some(0));
    assert_eq!(stream.read_line().as_deref(), Some("next line"));
    assert_eq!(stream.read_line(), None);
}

#[test]
fn indented_block_walk() {
    let mut stream = Stream::new("%ul\n  %li one\n  %li two\n\n%p tail");

    assert_eq!(stream.peek_indentation(), Some(0));
    stream.read_line();
    assert_eq!(stream.peek_indentation(), Some(2));
    stream.read_line();
    assert_eq!(stream.peek_indentation(), Some(2));
    stream.read_line();
    // blank line
    assert_eq!(stream.peek_indentation(), None);
    stream.read_line();
    assert_eq!(stream.peek_indentation(), Some(0));
}

#[test]
fn failure_is_annotated_with_context() {
    let mut stream = Stream::new("{class: %}");
    stream.read_symbol(&["{"]).unwrap();
    stream.read_word(&[]).unwrap();
    stream.read_symbol(&[":"]).unwrap();
    stream.read_whitespace(false);

    let err = stream.read_expression().unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnexpectedCharacter('%'));
    assert_eq!(err.to_string(), "Unexpected \"%\". @ \"{class: %\" <-");
}

#[test]
fn unterminated_string_reports_terminator_and_context() {
    let mut stream = Stream::new("'no close");
    let err = stream.read_quoted_string().unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnterminatedString('\''));
    // cursor parked at end of input, context covers the tail
    assert!(stream.is_at_end());
    assert_eq!(err.to_string(), "Unterminated string (expected '). @ \"'no close\" <-");
}

#[test]
fn conditional_line_scan() {
    let mut stream = Stream::new("- if user.is_authenticated\n");
    assert_eq!(stream.read_symbol(&["-"]).unwrap(), "-");
    stream.read_whitespace(false);
    assert_eq!(stream.read_word(&[]).unwrap(), "if");
    stream.read_whitespace(false);
    assert_eq!(stream.read_expression().unwrap(), "user.is_authenticated");
    assert_eq!(stream.peek(), Some('\n'));
}
