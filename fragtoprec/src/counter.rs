/// Hands out monotonically increasing integer identifiers.
///
/// The counter is passed explicitly to every operation that creates identified
/// results, so separate runs never share hidden numbering state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IdCounter {
    next: usize,
}

impl IdCounter {
    pub fn new(start: usize) -> Self {
        Self { next: start }
    }

    pub fn next_id(&mut self) -> usize {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The identifier the next call to [`IdCounter::next_id`] will return
    pub fn peek(&self) -> usize {
        self.next
    }
}
