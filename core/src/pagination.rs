//! Page navigation for a notebook being edited.
//!
//! Navigable positions are the cover followed by pages `0..N`. Moving past
//! either end is a no-op; the only way to grow the book is `add_page` from
//! the last page.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::Page;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    Cover,
    Page(usize),
}

impl Position {
    /// Cover is -1, pages count from 0.
    pub fn index(self) -> isize {
        match self {
            Position::Cover => -1,
            Position::Page(i) => i as isize,
        }
    }
}

/// Arrow keys, routed through the same transitions as buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
}

/// The ordered pages of one notebook plus the current position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageBook {
    pages: Vec<Page>,
    position: Position,
}

impl PageBook {
    /// Start on the cover. A book with no pages gets one blank page.
    pub fn new(pages: Vec<Page>) -> Self {
        let pages = if pages.is_empty() {
            vec![Page::blank()]
        } else {
            pages
        };
        Self {
            pages,
            position: Position::Cover,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Mutable access for the save orchestrator; order can't change through it.
    pub(crate) fn pages_mut(&mut self) -> &mut [Page] {
        &mut self.pages
    }

    pub fn current(&self) -> Option<&Page> {
        match self.position {
            Position::Cover => None,
            Position::Page(i) => self.pages.get(i),
        }
    }

    pub fn can_next(&self) -> bool {
        match self.position {
            Position::Cover => true,
            Position::Page(i) => i + 1 < self.pages.len(),
        }
    }

    pub fn can_prev(&self) -> bool {
        self.position != Position::Cover
    }

    /// Whether `add_page` is available (on the last page).
    pub fn can_add(&self) -> bool {
        self.position == Position::Page(self.pages.len() - 1)
    }

    pub fn next(&mut self) -> bool {
        if !self.can_next() {
            return false;
        }
        self.position = match self.position {
            Position::Cover => Position::Page(0),
            Position::Page(i) => Position::Page(i + 1),
        };
        true
    }

    pub fn prev(&mut self) -> bool {
        self.position = match self.position {
            Position::Cover => return false,
            Position::Page(0) => Position::Cover,
            Position::Page(i) => Position::Page(i - 1),
        };
        true
    }

    /// Append a blank page and move onto it. Only allowed from the last page.
    pub fn add_page(&mut self) -> bool {
        if !self.can_add() {
            return false;
        }
        self.pages.push(Page::blank());
        self.position = Position::Page(self.pages.len() - 1);
        true
    }

    pub fn handle_key(&mut self, key: Key) -> bool {
        match key {
            Key::Left => self.prev(),
            Key::Right => self.next(),
        }
    }

    /// Jump straight to page `index` if it exists.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index < self.pages.len() {
            self.position = Position::Page(index);
            true
        } else {
            false
        }
    }

    /// Replace the text of the current page. No-op on the cover.
    pub fn set_content(&mut self, content: impl Into<String>) -> bool {
        match self.position {
            Position::Cover => false,
            Position::Page(i) => {
                self.pages[i].content = content.into();
                true
            }
        }
    }

    /// Take the current page out of the book, keeping at least one page.
    /// The position stays on the same index, or the new last page.
    pub(crate) fn take_current(&mut self) -> Option<Page> {
        let Position::Page(i) = self.position else {
            return None;
        };
        if self.pages.len() <= 1 {
            return None;
        }
        let page = self.pages.remove(i);
        self.position = Position::Page(i.min(self.pages.len() - 1));
        Some(page)
    }

    /// Put a page back where `take_current` removed it.
    pub(crate) fn restore(&mut self, index: usize, page: Page) {
        let index = index.min(self.pages.len());
        self.pages.insert(index, page);
        self.position = Position::Page(index);
    }
}

impl fmt::Display for PageBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Position::Cover => f.write_str("Cover"),
            Position::Page(i) => write!(f, "Page {} of {}", i + 1, self.pages.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_book_is_seeded_and_starts_on_cover() {
        let book = PageBook::new(vec![]);
        assert_eq!(book.len(), 1);
        assert_eq!(book.position(), Position::Cover);
        assert_eq!(book.position().index(), -1);
        assert!(book.pages()[0].is_ephemeral());
    }

    #[test]
    fn existing_pages_start_on_cover() {
        let book = PageBook::new(vec![Page::persisted(1, "a"), Page::persisted(2, "b")]);
        assert_eq!(book.len(), 2);
        assert_eq!(book.position(), Position::Cover);
        assert_eq!(book.to_string(), "Cover");
    }

    #[test]
    fn next_stops_at_last_page_and_add_grows() {
        let mut book = PageBook::new(vec![]);
        assert!(book.next());
        assert_eq!(book.position(), Position::Page(0));
        assert!(!book.next());
        assert_eq!(book.position(), Position::Page(0));
        assert_eq!(book.len(), 1);
        assert!(book.add_page());
        assert_eq!(book.position(), Position::Page(1));
        assert_eq!(book.len(), 2);
        assert_eq!(book.to_string(), "Page 2 of 2");
    }

    #[test]
    fn prev_stops_at_cover() {
        let mut book = PageBook::new(vec![Page::persisted(1, "a")]);
        assert!(!book.prev());
        book.next();
        assert!(book.prev());
        assert_eq!(book.position(), Position::Cover);
        assert!(!book.prev());
    }

    #[test]
    fn add_page_only_from_last_page() {
        let mut book = PageBook::new(vec![Page::persisted(1, "a"), Page::persisted(2, "b")]);
        assert!(!book.add_page());
        book.next();
        assert!(!book.add_page());
        book.next();
        assert!(book.add_page());
        assert_eq!(book.len(), 3);
    }

    #[test]
    fn keys_follow_the_same_bounds() {
        let mut book = PageBook::new(vec![Page::persisted(1, "a")]);
        assert!(!book.handle_key(Key::Left));
        assert!(book.handle_key(Key::Right));
        assert!(!book.handle_key(Key::Right));
        assert_eq!(book.position(), Position::Page(0));
        assert!(book.handle_key(Key::Left));
        assert_eq!(book.position(), Position::Cover);
    }

    #[test]
    fn editing_never_reorders() {
        let mut book = PageBook::new(vec![Page::persisted(1, "a"), Page::persisted(2, "b")]);
        assert!(!book.set_content("cover text"));
        book.go_to(1);
        assert!(book.set_content("changed"));
        let ids: Vec<_> = book.pages().iter().map(|p| p.server_id()).collect();
        assert_eq!(ids, vec![Some(1), Some(2)]);
        assert_eq!(book.current().unwrap().content, "changed");
    }

    #[test]
    fn taking_the_last_page_is_refused() {
        let mut book = PageBook::new(vec![Page::persisted(1, "a")]);
        book.next();
        assert!(book.take_current().is_none());
        assert!(book.add_page());
        let taken = book.take_current().unwrap();
        assert!(taken.is_ephemeral());
        assert_eq!(book.position(), Position::Page(0));
    }
}
