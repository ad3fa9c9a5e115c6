//! Compose-line buffer.

/// Accumulated compose-line text.
///
/// Mutated only by [`append_char`](Self::append_char),
/// [`backspace`](Self::backspace) and [`submit`](Self::submit).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    text: String,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one character. No length bound.
    pub fn append_char(&mut self, c: char) {
        self.text.push(c);
    }

    /// Removes the last character; no-op if empty.
    pub fn backspace(&mut self) {
        self.text.pop();
    }

    /// Returns the current contents and resets the buffer to empty.
    pub fn submit(&mut self) -> String {
        std::mem::take(&mut self.text)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(text: &str) -> InputBuffer {
        let mut input = InputBuffer::new();
        text.chars().for_each(|c| input.append_char(c));
        input
    }

    #[test]
    fn test_append_then_backspace_restores_contents() {
        for c in ['a', ' ', 'é', '中', '🎉', '/', '#'] {
            let mut input = buffer("hello");
            let before = input.clone();
            input.append_char(c);
            input.backspace();
            assert_eq!(input, before, "char {c:?}");
        }
    }

    #[test]
    fn test_backspace_on_empty_is_noop() {
        let mut input = InputBuffer::new();
        input.backspace();
        assert!(input.is_empty());
    }

    #[test]
    fn test_backspace_removes_whole_multibyte_char() {
        let mut input = buffer("ok中");
        input.backspace();
        assert_eq!(input.as_str(), "ok");
    }

    #[test]
    fn test_submit_returns_contents_and_clears() {
        let mut input = buffer("/join #general");
        assert_eq!(input.len(), 14);
        assert_eq!(input.submit(), "/join #general");
        assert!(input.is_empty());
        assert_eq!(input.submit(), "");
    }
}
