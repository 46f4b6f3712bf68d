//! Guard predicates for controlling transitions.
//!
//! Guards are zero-argument boolean functions attached to a transition rule.
//! A rule fires only when every one of its guards returns `true`.

use std::fmt;

/// Predicate that must hold for a transition rule to fire.
///
/// Guards are evaluated fresh on every message. They usually close over
/// shared handles (`Rc<Cell<_>>` and the like) owned by the embedding
/// application.
///
/// # Example
///
/// ```rust
/// use hsm_engine::core::Guard;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let stock = Rc::new(Cell::new(0));
/// let in_stock = {
///     let stock = Rc::clone(&stock);
///     Guard::new(move || stock.get() > 0)
/// };
///
/// assert!(!in_stock.check());
/// stock.set(3);
/// assert!(in_stock.check());
/// ```
pub struct Guard {
    predicate: Box<dyn Fn() -> bool>,
}

impl Guard {
    /// Create a guard from a predicate function.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn() -> bool + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    /// Evaluate the guard.
    pub fn check(&self) -> bool {
        (self.predicate)()
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard")
    }
}
