//! Cursor over an ordered list.
//!
//! Both panes use a [`SelectableList`]. Movement stops at either end instead
//! of wrapping, and every move reports whether the cursor actually changed so
//! the caller can decide whether a new preview is needed.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectableList<T> {
    items: Vec<T>,
    cursor: Option<usize>,
}

impl<T> Default for SelectableList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
        }
    }
}

impl<T> SelectableList<T> {
    /// A list with the cursor on the first item, or none when empty.
    pub fn new(items: Vec<T>) -> Self {
        let cursor = if items.is_empty() { None } else { Some(0) };
        Self { items, cursor }
    }

    /// Swap in a freshly loaded list. The cursor returns to the first item.
    pub fn replace(&mut self, items: Vec<T>) {
        *self = Self::new(items);
    }

    pub fn clear(&mut self) {
        self.replace(Vec::new());
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&T> {
        self.cursor.and_then(|i| self.items.get(i))
    }

    pub fn current_mut(&mut self) -> Option<&mut T> {
        self.cursor.and_then(move |i| self.items.get_mut(i))
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Move to the first item. Returns false on an empty list.
    pub fn first(&mut self) -> bool {
        if self.items.is_empty() {
            self.cursor = None;
            return false;
        }
        self.cursor = Some(0);
        true
    }

    /// Move down one item. Returns false at the last item.
    pub fn next(&mut self) -> bool {
        match self.cursor {
            Some(i) if i + 1 < self.items.len() => {
                self.cursor = Some(i + 1);
                true
            }
            _ => false,
        }
    }

    /// Move up one item. Returns false at the first item.
    pub fn previous(&mut self) -> bool {
        match self.cursor {
            Some(i) if i > 0 => {
                self.cursor = Some(i - 1);
                true
            }
            _ => false,
        }
    }
}
