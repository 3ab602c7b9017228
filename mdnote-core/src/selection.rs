//! Character-offset selection model for the editor text area

/// A selection in the document text, measured in `char` offsets.
///
/// `start == end` is a caret. Construction always normalises the pair so
/// that `start <= end`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    /// Create a selection from two offsets in either order
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// Create an empty selection at a single offset
    pub fn caret(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub fn is_caret(&self) -> bool {
        self.start == self.end
    }

    /// Number of characters covered
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Pairs with `len`; same as `is_caret`
    pub fn is_empty(&self) -> bool {
        self.is_caret()
    }

    /// Clamp both ends into `0..=len`
    pub fn clamp(&self, len: usize) -> Self {
        Self::new(self.start.min(len), self.end.min(len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_forward_selection() {
        let sel = Selection::new(5, 10);
        assert_eq!((sel.start, sel.end), (5, 10));
        assert_eq!(sel.len(), 5);
    }

    #[test]
    fn test_new_backward_selection() {
        let sel = Selection::new(10, 5);
        assert_eq!((sel.start, sel.end), (5, 10));
    }

    #[test]
    fn test_caret() {
        let sel = Selection::caret(7);
        assert!(sel.is_caret());
        assert!(sel.is_empty());
        assert_eq!(sel.len(), 0);
        assert!(!Selection::new(1, 2).is_empty());
    }

    #[test]
    fn test_clamp_past_end() {
        let sel = Selection::new(3, 100).clamp(8);
        assert_eq!(sel, Selection::new(3, 8));

        let sel = Selection::new(50, 100).clamp(8);
        assert_eq!(sel, Selection::caret(8));
    }
}
