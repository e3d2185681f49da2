/// Incremental reveal of a message body that is already fully stored.
///
/// Tracks progress in characters but indexes in bytes, so multi-byte text
/// never gets split mid-character. Restartable and cancellable by simply
/// dropping it; the stored body is the fallback either way.
#[derive(Debug, Clone)]
pub struct RevealSequence {
    body: String,
    // Byte offset of each character boundary, including the terminal one.
    boundaries: Vec<usize>,
    shown: usize,
}

impl RevealSequence {
    pub fn new(body: impl Into<String>) -> Self {
        let body = body.into();
        let mut boundaries: Vec<usize> = body.char_indices().map(|(i, _)| i).collect();
        boundaries.push(body.len());
        Self {
            body,
            boundaries,
            shown: 0,
        }
    }

    /// Total length in characters.
    pub fn total_chars(&self) -> usize {
        self.boundaries.len() - 1
    }

    pub fn shown_chars(&self) -> usize {
        self.shown
    }

    pub fn is_complete(&self) -> bool {
        self.shown >= self.total_chars()
    }

    /// Currently visible prefix.
    pub fn visible(&self) -> &str {
        &self.body[..self.boundaries[self.shown]]
    }

    pub fn full_body(&self) -> &str {
        &self.body
    }

    /// Advances by `chars` characters, saturating at the full body.
    /// Returns true while there is still more to show.
    pub fn advance(&mut self, chars: usize) -> bool {
        self.shown = (self.shown + chars).min(self.total_chars());
        !self.is_complete()
    }

    pub fn restart(&mut self) {
        self.shown = 0;
    }
}

impl Iterator for RevealSequence {
    type Item = String;

    /// Yields the next longer prefix, one character at a time, ending with
    /// the full body.
    fn next(&mut self) -> Option<String> {
        if self.is_complete() {
            return None;
        }
        self.advance(1);
        Some(self.visible().to_string())
    }
}
