//! Aho-Corasick automaton over an arena of [`TrieNode`]s.

use std::collections::VecDeque;
use std::ops::Range;

use super::node::{NodeId, TrieNode};
use crate::error::TrieError;

/// A keyword occurrence found by [`Trie::scan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// The keyword as it was inserted
    pub keyword: String,
    /// Index of the keyword in insertion order
    pub id: usize,
    /// Byte offset of the first character of the occurrence
    pub start: usize,
    /// Byte offset of the last character of the occurrence (inclusive)
    pub end: usize,
}

impl Match {
    /// Byte range of the occurrence, suitable for slicing and `replace_range`.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end + 1
    }
}

/// Configuration for a [`Trie`], fixed before any keyword is inserted.
#[derive(Debug, Clone, Copy)]
pub struct TrieBuilder {
    case_sensitive: bool,
    whole_words: bool,
}

impl Default for TrieBuilder {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            whole_words: false,
        }
    }
}

impl TrieBuilder {
    /// Create a builder with default configuration
    /// (case sensitive, substring matches).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether keywords and text are compared case sensitively.
    ///
    /// Case folding is ASCII only.
    pub fn case_sensitive(mut self, flag: bool) -> Self {
        self.case_sensitive = flag;
        self
    }

    /// Set whether a match must span the entire scanned text.
    pub fn whole_words(mut self, flag: bool) -> Self {
        self.whole_words = flag;
        self
    }

    /// Create an empty trie with this configuration.
    pub fn build(self) -> Trie {
        Trie {
            nodes: vec![TrieNode::root()],
            keywords: Vec::new(),
            case_sensitive: self.case_sensitive,
            whole_words: self.whole_words,
        }
    }

    /// Create a trie with this configuration holding `keywords`.
    pub fn build_from<I, S>(self, keywords: I) -> Result<Trie, TrieError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut trie = self.build();
        trie.insert_batch(keywords)?;
        Ok(trie)
    }
}

/// Keyword trie with failure and output links.
#[derive(Debug)]
pub struct Trie {
    nodes: Vec<TrieNode>,
    keywords: Vec<String>,
    case_sensitive: bool,
    whole_words: bool,
}

impl Default for Trie {
    fn default() -> Self {
        TrieBuilder::new().build()
    }
}

impl Clone for Trie {
    /// Re-insert every keyword into a fresh trie with the same configuration.
    fn clone(&self) -> Self {
        let mut trie = TrieBuilder::new()
            .case_sensitive(self.case_sensitive)
            .whole_words(self.whole_words)
            .build();
        for keyword in &self.keywords {
            let inserted = trie.insert(keyword, true);
            debug_assert!(inserted.is_ok(), "keyword {keyword:?} inserted twice");
        }
        trie.build_links();
        trie
    }
}

impl Trie {
    /// Number of inserted keywords.
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    /// Check if no keyword has been inserted.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    /// Inserted keywords, indexed by their match id.
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Check if the trie is case sensitive.
    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Check if the trie only reports whole-text matches.
    pub fn is_whole_words(&self) -> bool {
        self.whole_words
    }

    /// Insert a keyword.
    ///
    /// Returns the id of the new keyword, or `None` for the empty string,
    /// which is ignored. With `defer_linking` set, the caller must call
    /// [`Trie::build_links`] before the next scan.
    pub fn insert(&mut self, keyword: &str, defer_linking: bool) -> Result<Option<usize>, TrieError> {
        if keyword.is_empty() {
            return Ok(None);
        }

        let mut current = NodeId::ROOT;
        for ch in keyword.chars() {
            current = self.add_child(current, self.fold(ch));
        }

        if self.nodes[current.0].terminal.is_some() {
            return Err(TrieError::DuplicateKeyword {
                keyword: keyword.to_string(),
            });
        }

        let id = self.keywords.len();
        self.nodes[current.0].terminal = Some(id);
        self.keywords.push(keyword.to_string());

        if !defer_linking {
            self.build_links();
        }
        Ok(Some(id))
    }

    /// Insert several keywords and rebuild the links once.
    pub fn insert_batch<I, S>(&mut self, keywords: I) -> Result<(), TrieError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for keyword in keywords {
            self.insert(keyword.as_ref(), true)?;
        }
        self.build_links();
        Ok(())
    }

    /// Check if `text` contains (or, in whole-word mode, is) a keyword.
    pub fn contains_match(&self, text: &str) -> bool {
        !self.scan(text).is_empty()
    }

    /// Find all keyword occurrences in `text`, ordered by end position.
    ///
    /// In whole-word mode only a keyword spanning all of `text` is reported.
    /// Otherwise every occurrence is reported, including keywords that are
    /// suffixes of a longer match ending at the same position.
    pub fn scan(&self, text: &str) -> Vec<Match> {
        let mut results = Vec::new();
        if text.is_empty() {
            return results;
        }

        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let mut current = NodeId::ROOT;

        for (i, &(offset, ch)) in chars.iter().enumerate() {
            current = self.step(current, self.fold(ch));
            let end = offset + ch.len_utf8() - 1;

            let node = &self.nodes[current.0];
            if let Some(id) = node.terminal {
                if !self.whole_words || node.depth == chars.len() {
                    results.push(self.make_match(id, &chars, i, node.depth, end));
                }
            }

            if !self.whole_words {
                let mut out = node.output;
                while !out.is_root() {
                    let out_node = &self.nodes[out.0];
                    if let Some(id) = out_node.terminal {
                        results.push(self.make_match(id, &chars, i, out_node.depth, end));
                    }
                    out = out_node.output;
                }
            }
        }

        results
    }

    /// Recompute failure and output links with a breadth-first traversal.
    pub fn build_links(&mut self) {
        let mut queue = VecDeque::new();
        queue.extend(self.nodes[0].children.iter().copied());

        while let Some(id) = queue.pop_front() {
            queue.extend(self.nodes[id.0].children.iter().copied());

            let (depth, edge, parent, failure) = {
                let node = &self.nodes[id.0];
                (node.depth, node.edge, node.parent, node.failure)
            };

            // A failure link one character shorter than the node is optimal
            // and stays valid when further keywords are inserted.
            if self.nodes[failure.0].depth + 1 < depth {
                self.nodes[id.0].failure = self.longest_suffix(parent, edge);
            }

            let mut out = self.nodes[id.0].failure;
            while !out.is_root() && self.nodes[out.0].terminal.is_none() {
                out = self.nodes[out.0].failure;
            }
            self.nodes[id.0].output = out;
        }
    }

    /// Follow the failure chain of `parent` to the deepest node with an
    /// `edge` child. Only valid for nodes of depth two or more.
    fn longest_suffix(&self, parent: NodeId, edge: char) -> NodeId {
        let mut candidate = self.nodes[parent.0].failure;
        loop {
            if let Some(child) = self.find_child(candidate, edge) {
                return child;
            }
            if candidate.is_root() {
                return NodeId::ROOT;
            }
            candidate = self.nodes[candidate.0].failure;
        }
    }

    /// Transition of the automaton from `current` on `ch`.
    fn step(&self, current: NodeId, ch: char) -> NodeId {
        if let Some(child) = self.find_child(current, ch) {
            return child;
        }
        let mut temp = self.nodes[current.0].failure;
        while !temp.is_root() {
            if let Some(child) = self.find_child(temp, ch) {
                return child;
            }
            temp = self.nodes[temp.0].failure;
        }
        self.find_child(NodeId::ROOT, ch).unwrap_or(NodeId::ROOT)
    }

    fn find_child(&self, node: NodeId, ch: char) -> Option<NodeId> {
        self.nodes[node.0]
            .children
            .iter()
            .copied()
            .find(|child| self.nodes[child.0].edge == ch)
    }

    fn add_child(&mut self, parent: NodeId, ch: char) -> NodeId {
        if let Some(child) = self.find_child(parent, ch) {
            return child;
        }
        let id = NodeId(self.nodes.len());
        let depth = self.nodes[parent.0].depth + 1;
        self.nodes.push(TrieNode::child(parent, depth, ch));
        self.nodes[parent.0].children.push(id);
        id
    }

    fn make_match(&self, id: usize, chars: &[(usize, char)], last: usize, depth: usize, end: usize) -> Match {
        Match {
            keyword: self.keywords[id].clone(),
            id,
            start: chars[last + 1 - depth].0,
            end,
        }
    }

    fn fold(&self, ch: char) -> char {
        if self.case_sensitive {
            ch
        } else {
            ch.to_ascii_lowercase()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn keywords_of(matches: &[Match]) -> Vec<&str> {
        matches.iter().map(|m| m.keyword.as_str()).collect()
    }

    #[test]
    fn test_scan_reports_overlapping_matches() {
        let trie = TrieBuilder::new().build_from(["he", "she", "his", "hers"]).unwrap();
        let matches = trie.scan("ushers");
        assert_eq!(keywords_of(&matches), vec!["she", "he", "hers"]);
        assert_eq!((matches[0].start, matches[0].end), (1, 3));
        assert_eq!((matches[1].start, matches[1].end), (2, 3));
        assert_eq!((matches[2].start, matches[2].end), (2, 5));
    }

    #[test]
    fn test_scan_empty_text() {
        let trie = TrieBuilder::new().build_from(["a"]).unwrap();
        assert!(trie.scan("").is_empty());
    }

    #[test]
    fn test_duplicate_keyword() {
        let mut trie = TrieBuilder::new().build();
        trie.insert("par", false).unwrap();
        assert_eq!(
            trie.insert("par", false),
            Err(TrieError::DuplicateKeyword {
                keyword: "par".to_string()
            })
        );
    }

    #[test]
    fn test_duplicate_keyword_case_insensitive() {
        let mut trie = TrieBuilder::new().case_sensitive(false).build();
        trie.insert("DT", false).unwrap();
        assert!(trie.insert("dt", false).is_err());
    }

    #[test]
    fn test_empty_keyword_is_ignored() {
        let mut trie = TrieBuilder::new().build();
        assert_eq!(trie.insert("", false), Ok(None));
        assert!(trie.is_empty());
        assert!(trie.scan("anything").is_empty());
    }

    #[test]
    fn test_whole_words() {
        let trie = TrieBuilder::new()
            .whole_words(true)
            .build_from(["sin", "sinh"])
            .unwrap();
        assert_eq!(keywords_of(&trie.scan("sinh")), vec!["sinh"]);
        assert_eq!(keywords_of(&trie.scan("sin")), vec!["sin"]);
        assert!(trie.scan("asin").is_empty());
        assert!(trie.scan("sinus").is_empty());
    }

    #[test]
    fn test_case_insensitive_options() {
        let trie = TrieBuilder::new()
            .case_sensitive(false)
            .whole_words(true)
            .build_from(["DT", "TOTAL"])
            .unwrap();
        let matches = trie.scan("total");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].keyword, "TOTAL");
        assert_eq!(matches[0].id, 1);
    }

    #[test]
    fn test_incremental_insert_keeps_links_valid() {
        let mut trie = TrieBuilder::new().build();
        trie.insert("bc", false).unwrap();
        trie.insert("abcd", false).unwrap();
        trie.insert("c", false).unwrap();
        let matches = trie.scan("xabcd");
        assert_eq!(keywords_of(&matches), vec!["bc", "c", "abcd"]);
    }

    #[test]
    fn test_failure_chain_longer_than_one_step() {
        // "abcx" has to fall back through "bc" (failure of "abc") to "c" for
        // the occurrence of "cx".
        let trie = TrieBuilder::new().build_from(["abcd", "bcd", "cx"]).unwrap();
        let matches = trie.scan("abcx");
        assert_eq!(keywords_of(&matches), vec!["cx"]);
        assert_eq!(matches[0].range(), 2..4);
    }

    #[test]
    fn test_clone_reinserts_keywords() {
        let trie = TrieBuilder::new()
            .case_sensitive(false)
            .build_from(["alpha", "beta"])
            .unwrap();
        let copy = trie.clone();
        assert_eq!(copy.keywords(), trie.keywords());
        assert!(!copy.is_case_sensitive());
        assert_eq!(copy.scan("ALPHAbeta"), trie.scan("ALPHAbeta"));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut trie = TrieBuilder::new().whole_words(true).build_from(["k"]).unwrap();
        let mut copy = trie.clone();
        copy.insert("kappa", false).unwrap();
        assert!(copy.contains_match("kappa"));
        assert!(!trie.contains_match("kappa"));
        assert!(trie.insert("kappa", false).is_ok());
        assert!(copy.insert("k", false).is_err());
    }

    #[test]
    fn test_non_ascii_offsets() {
        let trie = TrieBuilder::new().build_from(["x"]).unwrap();
        let text = "µ*x";
        let matches = trie.scan(text);
        assert_eq!(matches.len(), 1);
        assert_eq!(&text[matches[0].range()], "x");
    }

    fn brute_force(keywords: &[String], text: &str) -> Vec<(usize, usize)> {
        let mut found = Vec::new();
        for (id, keyword) in keywords.iter().enumerate() {
            let mut from = 0;
            while let Some(pos) = text[from..].find(keyword.as_str()) {
                found.push((id, from + pos));
                from += pos + 1;
            }
        }
        found.sort();
        found
    }

    proptest! {
        #[test]
        fn test_scan_finds_embedded_keyword(
            keywords in proptest::collection::hash_set("[a-c]{1,4}", 1..6),
            prefix in "[a-d]{0,6}",
            suffix in "[a-d]{0,6}",
            pick in any::<prop::sample::Index>(),
        ) {
            let keywords: Vec<String> = keywords.into_iter().collect();
            let trie = TrieBuilder::new().build_from(&keywords).unwrap();
            let chosen = pick.get(&keywords);
            let text = format!("{prefix}{chosen}{suffix}");
            let start = prefix.len();
            let found = trie.scan(&text).iter().any(|m| {
                m.keyword == *chosen && m.start == start && &text[m.range()] == chosen.as_str()
            });
            prop_assert!(found);
        }

        #[test]
        fn test_scan_matches_brute_force(
            keywords in proptest::collection::hash_set("[a-c]{1,4}", 1..8),
            text in "[a-d]{0,24}",
        ) {
            let keywords: Vec<String> = keywords.into_iter().collect();
            let trie = TrieBuilder::new().build_from(&keywords).unwrap();
            let mut found: Vec<(usize, usize)> =
                trie.scan(&text).iter().map(|m| (m.id, m.start)).collect();
            found.sort();
            prop_assert_eq!(found, brute_force(&keywords, &text));
        }

        #[test]
        fn test_scan_ordered_by_end(
            keywords in proptest::collection::hash_set("[a-c]{1,4}", 1..8),
            text in "[a-c]{0,24}",
        ) {
            let keywords: Vec<String> = keywords.into_iter().collect();
            let trie = TrieBuilder::new().build_from(&keywords).unwrap();
            let ends: Vec<usize> = trie.scan(&text).iter().map(|m| m.end).collect();
            prop_assert!(ends.windows(2).all(|w| w[0] <= w[1]));
        }

        #[test]
        fn test_whole_words_span_entire_text(
            keywords in proptest::collection::hash_set("[a-c]{1,4}", 1..8),
            text in "[a-c]{0,8}",
        ) {
            let keywords: Vec<String> = keywords.into_iter().collect();
            let trie = TrieBuilder::new().whole_words(true).build_from(&keywords).unwrap();
            for m in trie.scan(&text) {
                prop_assert_eq!(m.start, 0);
                prop_assert_eq!(m.end + 1, text.len());
            }
            prop_assert_eq!(trie.contains_match(&text), keywords.contains(&text));
        }
    }
}
