//! Single-slot hand-off between pipeline layers.

use crate::diagnostics::ContractError;

/// A slot holding at most one value.
///
/// Every layer reads its input from a `Cell`: the producer fills it, the consumer takes the value once it has
/// processed it. A layer that leaves the value in place has not consumed it yet, which is how a layer looks at an
/// upcoming token without committing to it.
///
/// ## Examples
/// ```rust
/// use strata_syntax::Cell;
///
/// let mut cell = Cell::new();
/// cell.put(1).unwrap();
/// assert!(cell.put(2).is_err());
/// assert_eq!(cell.take(), Some(1));
/// assert!(cell.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell<T>(Option<T>);

impl<T> Cell<T> {
    pub const fn new() -> Self {
        Cell(None)
    }

    pub fn with(value: T) -> Self {
        Cell(Some(value))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn is_full(&self) -> bool {
        self.0.is_some()
    }

    /// Store `value`; the cell must be empty.
    pub fn put(&mut self, value: T) -> Result<(), ContractError> {
        if self.0.is_some() {
            return Err(ContractError::CellOccupied);
        }
        self.0 = Some(value);
        Ok(())
    }

    pub fn take(&mut self) -> Option<T> {
        self.0.take()
    }

    pub fn peek(&self) -> Option<&T> {
        self.0.as_ref()
    }
}

impl<T> Default for Cell<T> {
    fn default() -> Self {
        Cell::new()
    }
}
