//! A single write transaction and its outcome

/// Outcome of a [`Transaction`]
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Not run yet
    Pending,
    /// Every byte was acknowledged
    Success,
    /// A byte was not acknowledged, or a line failed
    Failed,
}

/// Bytes to put on the wire, address byte first
///
/// Built right before [`Engine::execute`](crate::Engine::execute) and
/// dropped after it returns.
#[derive(Debug)]
pub struct Transaction<'a> {
    bytes: &'a [u8],
    outcome: Outcome,
}

impl<'a> Transaction<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Transaction {
            bytes,
            outcome: Outcome::Pending,
        }
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub(crate) fn finish(&mut self, success: bool) {
        self.outcome = if success {
            Outcome::Success
        } else {
            Outcome::Failed
        };
    }
}
