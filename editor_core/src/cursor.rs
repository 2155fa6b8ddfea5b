//! Selection handling.

/// A text selection with an anchor and a head offset (UTF-16 code units).
/// When anchor == head, there is no active selection and the head is the
/// caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    /// The anchor point (where selection started).
    pub anchor: usize,
    /// The head (where the selection ends / caret is).
    pub head: usize,
}

impl Selection {
    /// Creates a collapsed selection at the given offset.
    pub fn new(pos: usize) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    /// Creates a selection from anchor to head.
    pub fn with_range(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Returns true if there's an active selection (anchor != head).
    pub fn has_selection(&self) -> bool {
        self.anchor != self.head
    }

    /// Returns the start and end of the selection (ordered).
    pub fn range(&self) -> (usize, usize) {
        if self.anchor <= self.head {
            (self.anchor, self.head)
        } else {
            (self.head, self.anchor)
        }
    }

    /// Lower bound of the selection.
    pub fn start(&self) -> usize {
        self.range().0
    }

    /// Upper bound of the selection.
    pub fn end(&self) -> usize {
        self.range().1
    }

    /// Returns the selected range, or None if no selection.
    pub fn selected_range(&self) -> Option<(usize, usize)> {
        if self.has_selection() {
            Some(self.range())
        } else {
            None
        }
    }

    /// Returns the selection ordered so that `anchor <= head`.
    pub fn normalized(&self) -> Self {
        let (start, end) = self.range();
        Self::with_range(start, end)
    }

    /// Orders the selection and clamps both ends into `0..=len`.
    pub fn clamped(&self, len: usize) -> Self {
        let (start, end) = self.range();
        Self::with_range(start.min(len), end.min(len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_range() {
        let sel = Selection::with_range(10, 5);
        assert_eq!(sel.range(), (5, 10));
        assert!(sel.has_selection());
        assert_eq!(sel.normalized(), Selection::with_range(5, 10));
    }

    #[test]
    fn test_collapsed_selection() {
        let sel = Selection::new(3);
        assert!(!sel.has_selection());
        assert_eq!(sel.selected_range(), None);
        assert_eq!(sel.start(), 3);
        assert_eq!(sel.end(), 3);
    }

    #[test]
    fn test_clamped() {
        let sel = Selection::with_range(12, 4).clamped(8);
        assert_eq!(sel, Selection::with_range(4, 8));
        assert_eq!(Selection::new(20).clamped(0), Selection::new(0));
    }
}
