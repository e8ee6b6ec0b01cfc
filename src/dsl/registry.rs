//! Dictionaries of keywords, reserved names, options and defined names.

use crate::dsl::keywords::{Keyword, BLOCK_KEYWORDS, OPTION_NAMES, RESERVED_NAMES};
use crate::dsl::text;
use crate::error::{ErrorKind, Result};
use crate::trie::{Match, Trie, TrieBuilder};

/// The keyword tries used during extraction plus the growing set of names
/// defined by the model.
#[derive(Debug, Clone)]
pub struct NameRegistry {
    /// Keyword fragments, matched anywhere inside a token
    keywords: Trie,
    /// Keywords as whole words, including the block keywords
    keyword_names: Trie,
    /// Options, whole words and case insensitive
    options: Trie,
    /// Built-in function and constant names
    reserved: Trie,
    /// Names defined so far
    used: Trie,
    /// Reject names that collide with an option
    reserve_options: bool,
}

impl NameRegistry {
    /// Build the fixed dictionaries.
    pub fn new(reserve_options: bool) -> Result<Self> {
        let keywords = TrieBuilder::new().build_from(Keyword::ALL.iter().map(|k| k.text()))?;

        let mut keyword_names = TrieBuilder::new()
            .whole_words(true)
            .build_from(Keyword::ALL.iter().map(|k| k.text()))?;
        for block in BLOCK_KEYWORDS {
            if !keyword_names.keywords().iter().any(|k| k == block) {
                keyword_names.insert(block, true)?;
            }
        }
        keyword_names.build_links();

        let options = TrieBuilder::new()
            .case_sensitive(false)
            .whole_words(true)
            .build_from(OPTION_NAMES.iter().copied())?;
        let reserved = TrieBuilder::new()
            .whole_words(true)
            .build_from(RESERVED_NAMES.iter().copied())?;
        let used = TrieBuilder::new().whole_words(true).build();

        Ok(Self {
            keywords,
            keyword_names,
            options,
            reserved,
            used,
            reserve_options,
        })
    }

    /// Keyword fragments found inside a token, ordered by end offset.
    pub fn keyword_matches(&self, token: &str) -> Vec<Match> {
        self.keywords.scan(token)
    }

    /// The statement keyword a leading word stands for, if any.
    pub fn leading_keyword(&self, word: &str) -> Option<Keyword> {
        self.keyword_names
            .scan(word)
            .first()
            .filter(|m| m.id < Keyword::ALL.len())
            .map(|m| Keyword::from_id(m.id))
    }

    /// Check if a name is a keyword.
    pub fn is_keyword(&self, name: &str) -> bool {
        self.keyword_names.contains_match(name)
    }

    /// Check if a name is a built-in function or constant.
    pub fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains_match(name)
    }

    /// The canonical spelling of an option, if `name` is one.
    pub fn option(&self, name: &str) -> Option<String> {
        self.options.scan(name).into_iter().next().map(|m| m.keyword)
    }

    /// Check if a name has been defined by the model.
    pub fn is_used(&self, name: &str) -> bool {
        self.used.contains_match(name)
    }

    /// Check if an expression operand refers to something known.
    pub fn is_known(&self, name: &str) -> bool {
        self.is_used(name) || self.is_reserved(name)
    }

    /// Every name defined so far, in definition order.
    pub fn used_names(&self) -> &[String] {
        self.used.keywords()
    }

    /// Check whether `name` may be defined.
    pub fn check_name(&self, name: &str) -> std::result::Result<(), ErrorKind> {
        if !text::is_identifier(name) {
            Err(ErrorKind::UnknownAssignment)
        } else if self.is_used(name) {
            Err(ErrorKind::DuplicatedName)
        } else if self.is_reserved(name) {
            Err(ErrorKind::ReservedFunction)
        } else if self.is_keyword(name) {
            Err(ErrorKind::ReservedKeyword)
        } else if self.reserve_options && self.option(name).is_some() {
            Err(ErrorKind::ReservedOption)
        } else {
            Ok(())
        }
    }

    /// Validate and record a newly defined name.
    pub fn reserve(&mut self, name: &str) -> std::result::Result<(), ErrorKind> {
        self.check_name(name)?;
        // check_name has ruled out duplicates
        self.used
            .insert(name, false)
            .map_err(|_| ErrorKind::DuplicatedName)?;
        Ok(())
    }
}
