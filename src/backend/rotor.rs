//! Weighted round-robin rotor.
//!
//! A [`WeightedRotor`] expands a list of weighted backends into a fixed
//! rotation sequence once, then hands out one entry per call in strict
//! cyclic order. Weights are expanded in blocks: `[(A, 3), (B, 1)]` yields
//! `A, A, A, B` repeating.

use parking_lot::Mutex;
use thiserror::Error;

/// Errors produced by a rotor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RotorError {
    #[error("backend '{id}' at position {index} has negative weight {weight}")]
    InvalidWeight { index: usize, id: String, weight: i64 },

    #[error("total backend weight does not fit in a rotation sequence")]
    SequenceTooLong,

    #[error("no backend available: rotation sequence is empty")]
    EmptyPool,
}

/// A routable backend identifier and its relative selection weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backend {
    pub id: String,
    pub weight: i64,
}

impl Backend {
    /// Create a weighted backend.
    pub fn new(id: impl Into<String>, weight: i64) -> Self {
        Self {
            id: id.into(),
            weight,
        }
    }

    /// Create a backend with the default weight of 1.
    pub fn unweighted(id: impl Into<String>) -> Self {
        Self::new(id, 1)
    }
}

/// A single successful selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection<'a> {
    /// Number of selections issued before this one.
    pub ticket: u64,
    /// Index into the rotation sequence.
    pub position: usize,
    /// The selected backend identifier.
    pub backend: &'a str,
}

#[derive(Debug, Default)]
struct Cursor {
    position: usize,
    issued: u64,
}

/// Thread-safe weighted round-robin selector.
///
/// The rotation sequence is immutable after construction; only the cursor
/// is shared mutable state, guarded by the rotor's own mutex.
#[derive(Debug)]
pub struct WeightedRotor {
    sequence: Box<[String]>,
    cursor: Mutex<Cursor>,
}

impl WeightedRotor {
    /// Build a rotor from weighted backends.
    ///
    /// Fails with [`RotorError::InvalidWeight`] if any weight is negative, and
    /// with [`RotorError::SequenceTooLong`] if the expanded sequence cannot be
    /// allocated. Zero-weight backends are accepted and never selected.
    pub fn new(backends: &[Backend]) -> Result<Self, RotorError> {
        let mut total: usize = 0;
        let mut blocks = Vec::with_capacity(backends.len());
        for (index, backend) in backends.iter().enumerate() {
            if backend.weight < 0 {
                return Err(RotorError::InvalidWeight {
                    index,
                    id: backend.id.clone(),
                    weight: backend.weight,
                });
            }
            let copies =
                usize::try_from(backend.weight).map_err(|_| RotorError::SequenceTooLong)?;
            total = total
                .checked_add(copies)
                .ok_or(RotorError::SequenceTooLong)?;
            blocks.push((backend.id.as_str(), copies));
        }

        let mut sequence = Vec::new();
        sequence
            .try_reserve_exact(total)
            .map_err(|_| RotorError::SequenceTooLong)?;
        for (id, copies) in blocks {
            sequence.extend(std::iter::repeat_n(id.to_owned(), copies));
        }

        Ok(Self::from_sequence(sequence))
    }

    /// Build a plain round-robin rotor where every backend has weight 1.
    pub fn round_robin<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_sequence(ids.into_iter().map(Into::into).collect())
    }

    fn from_sequence(sequence: Vec<String>) -> Self {
        Self {
            sequence: sequence.into_boxed_slice(),
            cursor: Mutex::new(Cursor::default()),
        }
    }

    /// Return the next backend in the rotation.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&self) -> Result<&str, RotorError> {
        self.next_selection().map(|selection| selection.backend)
    }

    /// Return the next backend along with its ticket and sequence position.
    ///
    /// Tickets are assigned inside the same critical section that advances
    /// the cursor, so ordering selections by ticket reproduces the exact
    /// order in which callers acquired the rotor.
    pub fn next_selection(&self) -> Result<Selection<'_>, RotorError> {
        if self.sequence.is_empty() {
            return Err(RotorError::EmptyPool);
        }

        let (position, ticket) = {
            let mut cursor = self.cursor.lock();
            let position = cursor.position;
            let ticket = cursor.issued;
            cursor.position = (position + 1) % self.sequence.len();
            cursor.issued = cursor.issued.wrapping_add(1);
            (position, ticket)
        };

        Ok(Selection {
            ticket,
            position,
            backend: &self.sequence[position],
        })
    }

    /// Length of the rotation sequence.
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Whether every selection will fail with [`RotorError::EmptyPool`].
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// The expanded rotation sequence.
    pub fn sequence(&self) -> &[String] {
        &self.sequence
    }
}
