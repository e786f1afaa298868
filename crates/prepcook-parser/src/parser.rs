// File: src/parser.rs
// Purpose: Build a parse tree from template text with an explicit parent stack

use crate::language::{self, Category, Definition, ReserveWord};
use crate::segment::next_segment;
use crate::tree::{NodeId, NodeKind, ParseTree};
use thiserror::Error;

/// Structural errors found while building the tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected closing tag `{found}`, expected {expected}")]
    UnexpectedTerminus { found: String, expected: String },

    #[error("unclosed `{keyword}` block, expected `{terminus}` before the end of the template")]
    UnclosedBlock { keyword: String, terminus: String },

    #[error("template delimiters must not be empty")]
    EmptyDelimiter,
}

/// Opening and closing tag delimiters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    pub open: String,
    pub close: String,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            open: "{{".to_string(),
            close: "}}".to_string(),
        }
    }
}

/// Tree builder for prepcook templates
#[derive(Debug, Clone, Default)]
pub struct Parser {
    delimiters: Delimiters,
}

/// Currently-open ancestors. The root is never popped.
struct ParseStack {
    root: NodeId,
    open: Vec<(NodeId, &'static ReserveWord)>,
}

impl ParseStack {
    fn new(root: NodeId) -> Self {
        Self {
            root,
            open: Vec::new(),
        }
    }

    fn top(&self) -> NodeId {
        self.open.last().map(|(id, _)| *id).unwrap_or(self.root)
    }

    fn top_word(&self) -> Option<&'static ReserveWord> {
        self.open.last().map(|(_, word)| *word)
    }

    fn push(&mut self, id: NodeId, word: &'static ReserveWord) {
        self.open.push((id, word));
    }

    fn pop(&mut self) {
        self.open.pop();
    }
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom tag delimiters, e.g. `<%` and `%>`
    pub fn with_delimiters(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            delimiters: Delimiters {
                open: open.into(),
                close: close.into(),
            },
        }
    }

    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    /// Parse `template` into a tree in a single forward pass
    pub fn parse(&self, template: &str) -> Result<ParseTree, ParseError> {
        let Delimiters { open, close } = &self.delimiters;
        if open.is_empty() || close.is_empty() {
            return Err(ParseError::EmptyDelimiter);
        }

        let mut tree = ParseTree::new();
        let mut stack = ParseStack::new(tree.root());
        let mut rest = template;

        while !rest.is_empty() {
            let seg = next_segment(rest, open, close);

            if !seg.left.is_empty() {
                tree.add(stack.top(), NodeKind::Constant, seg.left);
            }

            self.parse_tag(seg.segment, &mut tree, &mut stack)?;

            if seg.is_terminal() {
                break;
            }
            rest = seg.right;
        }

        if let Some(word) = stack.top_word() {
            return Err(ParseError::UnclosedBlock {
                keyword: word.start.to_string(),
                terminus: word.end.to_string(),
            });
        }

        tracing::trace!("Built parse tree with {} nodes", tree.len());
        Ok(tree)
    }

    /// Split one tag's inner text into directives and expressions.
    ///
    /// A directive's argument runs up to the next reserve word or the end of
    /// the tag, so `{{ /each /each }}` closes two blocks.
    fn parse_tag(
        &self,
        inner: &str,
        tree: &mut ParseTree,
        stack: &mut ParseStack,
    ) -> Result<(), ParseError> {
        let mut remaining = inner;

        while !remaining.trim().is_empty() {
            let Some(found) = language::first_occurring(remaining) else {
                tree.add(stack.top(), NodeKind::Expression, remaining.trim());
                break;
            };

            let before = remaining[..found.start].trim();
            if !before.is_empty() {
                tree.add(stack.top(), NodeKind::Expression, before);
            }

            let after = &remaining[found.end..];
            let (argument, next) = match language::first_occurring(after) {
                Some(second) => (&after[..second.start], &after[second.start..]),
                None => (after, ""),
            };

            apply_word(found.token, found.definition, argument.trim(), tree, stack)?;
            remaining = next;
        }

        Ok(())
    }
}

/// Place one reserve word into the tree, adjusting the parent stack
fn apply_word(
    token: &str,
    definition: Definition,
    argument: &str,
    tree: &mut ParseTree,
    stack: &mut ParseStack,
) -> Result<(), ParseError> {
    // Peers close the open block and continue the chain as its sibling.
    if stack.top_word().is_some_and(|open| open.has_peer(token)) {
        stack.pop();
        let id = tree.add(stack.top(), NodeKind::Directive(definition.word), argument);
        stack.push(id, definition.word);
        tracing::trace!("Chained {} as peer", token);
        return Ok(());
    }

    match definition.category {
        Category::Block | Category::Loader => {
            let id = tree.add(stack.top(), NodeKind::Directive(definition.word), argument);
            stack.push(id, definition.word);
        }
        Category::Include => {
            tree.add(stack.top(), NodeKind::Directive(definition.word), argument);
        }
        // Includes never open a region, so their terminus has nothing to close.
        Category::Terminus if definition.word.category == Category::Include => {}
        Category::Terminus => match stack.top_word() {
            Some(open) if language::terminus_matches(token, open.start) => stack.pop(),
            Some(open) => {
                return Err(ParseError::UnexpectedTerminus {
                    found: token.to_string(),
                    expected: format!("`{}`", open.end),
                })
            }
            None => {
                return Err(ParseError::UnexpectedTerminus {
                    found: token.to_string(),
                    expected: "no open block".to_string(),
                })
            }
        },
    }

    Ok(())
}

/// Parse with the default `{{ }}` delimiters
pub fn parse(template: &str) -> Result<ParseTree, ParseError> {
    Parser::new().parse(template)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_text_is_single_constant() {
        let tree = parse("<html><body>Hello World</body></html>").unwrap();
        let children = tree.children(tree.root());
        assert_eq!(children.len(), 1);
        assert_eq!(tree[children[0]].kind, NodeKind::Constant);
        assert_eq!(tree[children[0]].payload, "<html><body>Hello World</body></html>");
    }

    #[test]
    fn test_expression_leaf() {
        let tree = parse("<p>{{ [\"Hello\"] }}</p>").unwrap();
        assert_eq!(
            tree.dump(),
            "root\n  constant \"<p>\"\n  expression \"[\\\"Hello\\\"]\"\n  constant \"</p>\"\n"
        );
    }

    #[test]
    fn test_block_nesting() {
        let tree = parse("{{ #each a }}{{ #if b }}x{{ /if }}{{ /each }}").unwrap();
        assert_eq!(
            tree.dump(),
            "root\n  #each \"a\"\n    #if \"b\"\n      constant \"x\"\n"
        );
    }

    #[test]
    fn test_peers_become_siblings() {
        let tree = parse("{{ #if a }}A{{#elif b}}B{{ #else }}C{{ /else }}").unwrap();
        assert_eq!(
            tree.dump(),
            "root\n  #if \"a\"\n    constant \"A\"\n  #elif \"b\"\n    constant \"B\"\n  #else\n    constant \"C\"\n"
        );
    }

    #[test]
    fn test_multiple_directives_in_one_tag() {
        let tree = parse("{{ #each a }}{{ #each b }}x{{ /each /each }}").unwrap();
        let root_children = tree.children(tree.root());
        assert_eq!(root_children.len(), 1);
        let outer = root_children[0];
        assert_eq!(tree.children(outer).len(), 1);
    }

    #[test]
    fn test_mismatched_terminus() {
        let err = parse("{{ #each a }}x{{ /if }}").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedTerminus {
                found: "/if".to_string(),
                expected: "`/each`".to_string(),
            }
        );
    }

    #[test]
    fn test_terminus_at_root() {
        let err = parse("x{{ /each }}").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedTerminus { .. }));
    }

    #[test]
    fn test_unclosed_block() {
        let err = parse("{{ #if a }}A").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnclosedBlock {
                keyword: "#if".to_string(),
                terminus: "/if".to_string(),
            }
        );
    }

    #[test]
    fn test_include_is_self_closing() {
        let tree = parse("{{ #include css:main js:app }}{{ /include }}").unwrap();
        assert_eq!(tree.dump(), "root\n  #include \"css:main js:app\"\n");
    }

    #[test]
    fn test_custom_delimiters() {
        let tree = Parser::with_delimiters("<%", "%>").parse("a<% [b] %>c").unwrap();
        assert_eq!(tree.children(tree.root()).len(), 3);
    }

    #[test]
    fn test_empty_delimiter_rejected() {
        assert_eq!(
            Parser::with_delimiters("", "}}").parse("x").unwrap_err(),
            ParseError::EmptyDelimiter
        );
    }
}
