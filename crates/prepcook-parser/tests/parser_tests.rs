//! Integration tests for prepcook-parser
//!
//! Tests are organized by feature area and cover:
//! - Segmenting text around tags
//! - Block nesting and peer chains
//! - Multiple directives per tag
//! - Structural errors

use pretty_assertions::assert_eq;
use prepcook_parser::{next_segment, parse, NodeKind, ParseError, Parser};

// ============================================================================
// Segmenting
// ============================================================================

#[test]
fn test_segment_without_tags_is_terminal() {
    let seg = next_segment("plain text", "{{", "}}");
    assert_eq!(seg.left, "plain text");
    assert!(!seg.found);
    assert!(seg.is_terminal());
}

#[test]
fn test_segment_splits_first_tag() {
    let seg = next_segment("a{{ b }}c{{ d }}", "{{", "}}");
    assert_eq!(seg.left, "a");
    assert_eq!(seg.segment, " b ");
    assert_eq!(seg.right, "c{{ d }}");
    assert!(!seg.is_terminal());
}

// ============================================================================
// Tree shape
// ============================================================================

#[test]
fn test_nested_loops_and_conditionals() {
    let tree = parse(
        "<ul>{{ #each users }}<li>{{ #if active }}{{ [name] }}{{ #else }}-{{ /else }}</li>{{ /each }}</ul>",
    )
    .unwrap();

    assert_eq!(
        tree.dump(),
        "root
  constant \"<ul>\"
  #each \"users\"
    constant \"<li>\"
    #if \"active\"
      expression \"[name]\"
    #else
      constant \"-\"
    constant \"</li>\"
  constant \"</ul>\"
"
    );
}

#[test]
fn test_long_peer_chain() {
    let tree = parse("{{#if a}}A{{#elseif b}}B{{#elif c}}C{{#else}}D{{/else}}").unwrap();
    let names: Vec<&str> = tree
        .children(tree.root())
        .iter()
        .map(|id| tree[*id].kind.name())
        .collect();
    assert_eq!(names, vec!["#if", "#elseif", "#elif", "#else"]);
}

#[test]
fn test_chain_closed_by_elseif_terminus() {
    let tree = parse("{{ #unless a }}A{{ #elif b }}B{{ /elseif }}after").unwrap();
    let children = tree.children(tree.root());
    assert_eq!(children.len(), 3);
    assert_eq!(tree[children[2]].kind, NodeKind::Constant);
}

#[test]
fn test_text_before_keyword_is_expression() {
    let tree = parse("{{ [title] #if show }}x{{ /if }}").unwrap();
    assert_eq!(
        tree.dump(),
        "root\n  expression \"[title]\"\n  #if \"show\"\n    constant \"x\"\n"
    );
}

#[test]
fn test_template_loader_block() {
    let tree = parse("{{ #template header }}ignored{{ /template }}").unwrap();
    let loader = tree.children(tree.root())[0];
    assert_eq!(tree[loader].payload, "header");
    assert_eq!(tree[loader].kind.reserve_word().map(|w| w.start), Some("#template"));
}

#[test]
fn test_close_two_blocks_in_one_tag() {
    let tree = parse("{{ #each a }}{{ #each b }}x{{ /each /each }}y").unwrap();
    assert_eq!(
        tree.dump(),
        "root\n  #each \"a\"\n    #each \"b\"\n      constant \"x\"\n  constant \"y\"\n"
    );
}

#[test]
fn test_unknown_keyword_is_expression_text() {
    let tree = parse("{{ #while x }}").unwrap();
    let child = tree.children(tree.root())[0];
    assert_eq!(tree[child].kind, NodeKind::Expression);
    assert_eq!(tree[child].payload, "#while x");
}

#[test]
fn test_custom_delimiters_leave_default_tags_alone() {
    let tree = Parser::with_delimiters("<%", "%>")
        .parse("{{ #if a }}<% #if a %>x<% /if %>")
        .unwrap();
    assert_eq!(
        tree.dump(),
        "root\n  constant \"{{ #if a }}\"\n  #if \"a\"\n    constant \"x\"\n"
    );
}

// ============================================================================
// Structural errors
// ============================================================================

#[test]
fn test_else_closed_by_if_is_rejected() {
    let err = parse("{{ #if a }}A{{ #else }}B{{ /if }}").unwrap_err();
    assert_eq!(
        err,
        ParseError::UnexpectedTerminus {
            found: "/if".to_string(),
            expected: "`/else`".to_string(),
        }
    );
}

#[test]
fn test_unclosed_nested_block_reports_innermost() {
    let err = parse("{{ #each a }}{{ #unless b }}x{{ /unless }}{{ #if c }}").unwrap_err();
    assert_eq!(
        err,
        ParseError::UnclosedBlock {
            keyword: "#if".to_string(),
            terminus: "/if".to_string(),
        }
    );
}

#[test]
fn test_error_messages() {
    let err = parse("x{{ /each }}").unwrap_err();
    assert_eq!(
        err.to_string(),
        "unexpected closing tag `/each`, expected no open block"
    );
}
