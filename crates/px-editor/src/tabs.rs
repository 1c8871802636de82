// SPDX-License-Identifier: MIT
//
// DocumentSet — the ordered collection of open documents.
//
// Documents keep their opening order for the tab bar. Exactly one is
// active whenever the set is nonempty; every editing operation routes to
// it. Closing the active document activates its right neighbor, or the
// new last document when the rightmost one was closed.

use std::io;
use std::path::PathBuf;

use crate::codec;
use crate::document::Document;

/// All open documents plus the active selection.
#[derive(Debug, Default)]
pub struct DocumentSet {
    docs: Vec<Document>,
    active: usize,
}

impl DocumentSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode an image file and append it as a new document.
    ///
    /// The new document becomes active.
    ///
    /// # Errors
    ///
    /// Returns the decode error; the set is unchanged on failure.
    pub fn open(&mut self, path: PathBuf) -> io::Result<()> {
        let canvas = codec::decode(&path)?;
        self.insert(Document::new(path, canvas));
        Ok(())
    }

    /// Append an already-built document and make it active.
    pub fn insert(&mut self, doc: Document) {
        self.docs.push(doc);
        self.active = self.docs.len() - 1;
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Index of the active document in tab order.
    #[inline]
    #[must_use]
    pub const fn active_index(&self) -> usize {
        self.active
    }

    /// The active document, if any are open.
    #[must_use]
    pub fn active(&self) -> Option<&Document> {
        self.docs.get(self.active)
    }

    /// The active document, mutable.
    pub fn active_mut(&mut self) -> Option<&mut Document> {
        self.docs.get_mut(self.active)
    }

    /// All documents in tab order, for the tab bar.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.docs.iter()
    }

    /// Activate the document at `index`. Out-of-range indices are ignored.
    pub fn select(&mut self, index: usize) {
        if index < self.docs.len() {
            self.active = index;
        }
    }

    /// Activate the next document, wrapping past the last tab.
    pub fn next_tab(&mut self) {
        if !self.docs.is_empty() {
            self.active = (self.active + 1) % self.docs.len();
        }
    }

    /// Activate the previous document, wrapping past the first tab.
    pub fn prev_tab(&mut self) {
        if !self.docs.is_empty() {
            self.active = (self.active + self.docs.len() - 1) % self.docs.len();
        }
    }

    /// Close the active document. Returns `false` when the set becomes
    /// empty — the editor's signal to quit.
    ///
    /// The right neighbor takes over the closed slot's index, so it
    /// becomes active; closing the last tab activates the new last one.
    pub fn close_active(&mut self) -> bool {
        if self.docs.is_empty() {
            return false;
        }
        self.docs.remove(self.active);
        if self.docs.is_empty() {
            self.active = 0;
            return false;
        }
        self.active = self.active.min(self.docs.len() - 1);
        true
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::pixel::Rgba;

    /// Helper: a set of `n` documents without touching the filesystem.
    fn set_of(n: usize) -> DocumentSet {
        let mut set = DocumentSet::new();
        for i in 0..n {
            set.insert(Document::new(
                PathBuf::from(format!("img-{i}.png")),
                Canvas::new(2, 2, Rgba::OPAQUE_BLACK),
            ));
        }
        set
    }

    fn labels(set: &DocumentSet) -> Vec<String> {
        set.documents().map(Document::tab_label).collect()
    }

    // ── Opening ─────────────────────────────────────────────────────────

    #[test]
    fn empty_set() {
        let set = DocumentSet::new();
        assert!(set.is_empty());
        assert!(set.active().is_none());
    }

    #[test]
    fn open_failure_leaves_set_unchanged() {
        let mut set = DocumentSet::new();
        let err = set.open(PathBuf::from("/nonexistent/missing.png"));
        assert!(err.is_err());
        assert!(set.is_empty());
    }

    // ── Selection ───────────────────────────────────────────────────────

    #[test]
    fn next_and_prev_wrap() {
        let mut set = set_of(3);
        set.select(2);
        set.next_tab();
        assert_eq!(set.active_index(), 0);
        set.prev_tab();
        assert_eq!(set.active_index(), 2);
        set.prev_tab();
        assert_eq!(set.active_index(), 1);
    }

    #[test]
    fn select_out_of_range_is_ignored() {
        let mut set = set_of(2);
        set.select(0);
        set.select(5);
        assert_eq!(set.active_index(), 0);
    }

    #[test]
    fn single_tab_wraps_to_itself() {
        let mut set = set_of(1);
        set.next_tab();
        set.prev_tab();
        assert_eq!(set.active_index(), 0);
    }

    // ── Closing ─────────────────────────────────────────────────────────

    #[test]
    fn closing_middle_tab_activates_right_neighbor() {
        let mut set = set_of(3);
        set.select(1);
        assert!(set.close_active());
        assert_eq!(labels(&set), ["img-0.png", "img-2.png"]);
        assert_eq!(set.active().unwrap().tab_label(), "img-2.png");
    }

    #[test]
    fn closing_last_tab_activates_previous() {
        let mut set = set_of(3);
        set.select(2);
        assert!(set.close_active());
        assert_eq!(set.active().unwrap().tab_label(), "img-1.png");
    }

    #[test]
    fn closing_only_tab_empties_the_set() {
        let mut set = set_of(1);
        assert!(!set.close_active());
        assert!(set.is_empty());
        assert!(!set.close_active());
    }
}
