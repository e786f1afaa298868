// File: src/lib.rs
// Purpose: Tag segmenter, reserve-word grammar and tree builder for prepcook templates
//
// Templates mix literal text with tags (`{{ ... }}`). A tag holds reserve
// words such as `#each`, `#if` or `/if`, or plain expression text. The
// parser turns a template into a `ParseTree` that the evaluator walks.

pub mod language;
pub mod parser;
pub mod segment;
pub mod tree;

pub use language::{Behavior, Category, ReserveWord, Rule, RESERVE_WORDS};
pub use parser::{parse, Delimiters, ParseError, Parser};
pub use segment::{next_segment, split_once, Segment};
pub use tree::{Node, NodeId, NodeKind, ParseTree};
