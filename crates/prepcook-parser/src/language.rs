// File: src/language.rs
// Purpose: Reserve words of the template language, their grammar and behavior

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// How the tree builder treats a reserve word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Opens a region that is closed by its terminus
    Block,
    /// Closes the region opened by its matching block
    Terminus,
    /// Opens a region whose content comes from a named sub-template
    Loader,
    /// Self-contained directive, never opens a region
    Include,
}

/// How the evaluator treats a reserve word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Loop,
    Conditional,
    LinkedConditional,
    Loader,
    Include,
}

/// Pass/fail rule applied to a conditional's result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Pass when the expression holds
    All,
    /// Pass when the expression does not hold
    None,
}

/// Static definition of one reserve word
#[derive(Debug, PartialEq, Eq)]
pub struct ReserveWord {
    pub start: &'static str,
    pub end: &'static str,
    pub category: Category,
    pub behavior: Behavior,
    pub rule: Option<Rule>,
    /// Opening tokens that implicitly close this word and continue its chain
    pub peers: &'static [&'static str],
}

impl ReserveWord {
    /// Does `token` close this word and take its place in the sibling chain?
    pub fn has_peer(&self, token: &str) -> bool {
        self.peers.contains(&token)
    }

    pub fn is_loop(&self) -> bool {
        self.behavior == Behavior::Loop
    }

    pub fn is_conditional(&self) -> bool {
        self.behavior == Behavior::Conditional
    }

    pub fn is_linked_conditional(&self) -> bool {
        self.behavior == Behavior::LinkedConditional
    }

    pub fn is_loader(&self) -> bool {
        self.behavior == Behavior::Loader
    }

    pub fn is_include(&self) -> bool {
        self.behavior == Behavior::Include
    }

    /// A linked conditional without a rule always passes once reached (`#else`)
    pub fn is_unconditional(&self) -> bool {
        self.is_linked_conditional() && self.rule.is_none()
    }
}

const CONDITIONAL_PEERS: &[&str] = &["#elseif", "#elif", "#else"];

/// The grammar table. Read-only for the life of the process.
pub static RESERVE_WORDS: &[ReserveWord] = &[
    ReserveWord {
        start: "#each",
        end: "/each",
        category: Category::Block,
        behavior: Behavior::Loop,
        rule: None,
        peers: &[],
    },
    ReserveWord {
        start: "#if",
        end: "/if",
        category: Category::Block,
        behavior: Behavior::Conditional,
        rule: Some(Rule::All),
        peers: CONDITIONAL_PEERS,
    },
    ReserveWord {
        start: "#else",
        end: "/else",
        category: Category::Block,
        behavior: Behavior::LinkedConditional,
        rule: None,
        peers: &[],
    },
    ReserveWord {
        start: "#elseif",
        end: "/elseif",
        category: Category::Block,
        behavior: Behavior::LinkedConditional,
        rule: Some(Rule::All),
        peers: CONDITIONAL_PEERS,
    },
    // Short alias of #elseif, sharing its terminus.
    ReserveWord {
        start: "#elif",
        end: "/elseif",
        category: Category::Block,
        behavior: Behavior::LinkedConditional,
        rule: Some(Rule::All),
        peers: CONDITIONAL_PEERS,
    },
    ReserveWord {
        start: "#unless",
        end: "/unless",
        category: Category::Block,
        behavior: Behavior::Conditional,
        rule: Some(Rule::None),
        peers: CONDITIONAL_PEERS,
    },
    ReserveWord {
        start: "#template",
        end: "/template",
        category: Category::Loader,
        behavior: Behavior::Loader,
        rule: None,
        peers: &[],
    },
    ReserveWord {
        start: "#include",
        end: "/include",
        category: Category::Include,
        behavior: Behavior::Include,
        rule: None,
        peers: &[],
    },
];

static BY_START: Lazy<HashMap<&'static str, &'static ReserveWord>> =
    Lazy::new(|| RESERVE_WORDS.iter().map(|word| (word.start, word)).collect());

/// Every token the lexer recognizes, longest first
static WORD_LIST: Lazy<Vec<&'static str>> = Lazy::new(|| {
    let mut tokens: Vec<&'static str> = RESERVE_WORDS
        .iter()
        .flat_map(|word| [word.start, word.end])
        .collect();
    tokens.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    tokens.dedup();
    tokens
});

// Alternatives are ordered longest first, so on an equal offset `#elseif`
// wins over `#else`.
static WORD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let alternation = WORD_LIST
        .iter()
        .map(|token| regex::escape(token))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&alternation).expect("reserve word pattern must compile")
});

/// A reserve word definition as seen from one token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Definition {
    pub word: &'static ReserveWord,
    /// `Terminus` when looked up by the closing token, otherwise the word's own category
    pub category: Category,
}

/// A reserve word located inside tag text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordMatch<'a> {
    pub token: &'a str,
    pub start: usize,
    pub end: usize,
    pub definition: Definition,
}

/// All recognized tokens, openings and terminuses alike
pub fn reserve_word_list() -> &'static [&'static str] {
    &WORD_LIST
}

/// Look up the definition for an opening or closing token.
///
/// A terminus (`/x`) is normalized to its opening form (`#x`) and reported
/// with category [`Category::Terminus`].
pub fn lookup(token: &str) -> Option<Definition> {
    match token.strip_prefix('/') {
        Some(name) => {
            let opening = format!("#{name}");
            BY_START.get(opening.as_str()).map(|word| Definition {
                word,
                category: Category::Terminus,
            })
        }
        None => BY_START.get(token).map(|word| Definition {
            word,
            category: word.category,
        }),
    }
}

/// Is `close` the terminus of the block opened by `open`?
pub fn terminus_matches(close: &str, open: &str) -> bool {
    lookup(open)
        .filter(|definition| definition.category != Category::Terminus)
        .is_some_and(|definition| definition.word.end == close)
}

/// Find the first occurring reserve word in `haystack`.
pub fn first_occurring(haystack: &str) -> Option<WordMatch<'_>> {
    WORD_PATTERN.find_iter(haystack).find_map(|m| {
        lookup(m.as_str()).map(|definition| WordMatch {
            token: m.as_str(),
            start: m.start(),
            end: m.end(),
            definition,
        })
    })
}

pub fn is_loop(token: &str) -> bool {
    lookup(token).is_some_and(|d| d.word.is_loop())
}

pub fn is_conditional(token: &str) -> bool {
    lookup(token).is_some_and(|d| d.word.is_conditional())
}

pub fn is_linked_conditional(token: &str) -> bool {
    lookup(token).is_some_and(|d| d.word.is_linked_conditional())
}

pub fn is_loader(token: &str) -> bool {
    lookup(token).is_some_and(|d| d.word.is_loader())
}

pub fn is_include(token: &str) -> bool {
    lookup(token).is_some_and(|d| d.word.is_include())
}
