//! Compute-once memoization of step state.
//!
//! A [`LazyState`] holds a state computation and, once it has succeeded, the
//! computed value. Equality, hashing and serialisation are defined by that
//! value alone and force the computation when it has not yet run.
//!
//! # Concurrency
//!
//! The cell is deliberately not synchronised. It is `Send` (when the state
//! is) but not `Sync`, so a step can move between threads but cannot be
//! shared across them without an external lock. Under that single-writer
//! assumption the computation runs at most once.

use std::fmt;
use std::hash::{Hash, Hasher};

use once_cell::unsync::OnceCell;
use serde::{Serialize, Serializer};

use crate::error::BoxError;

type StateSupplier<S> = Box<dyn Fn() -> Result<S, BoxError> + Send>;

/// A lazily computed, value-compared state.
///
/// # Example
///
/// ```
/// use lustre_step::LazyState;
///
/// let state = LazyState::new(|| Ok(String::from("v1")));
/// assert!(!state.is_computed());
/// assert_eq!(state.state()?, "v1");
/// assert!(state.is_computed());
/// # Ok::<(), lustre_step::BoxError>(())
/// ```
pub struct LazyState<S> {
    /// `None` when the state was supplied up front.
    supplier: Option<StateSupplier<S>>,
    state: OnceCell<S>,
}

impl<S> LazyState<S> {
    /// Creates a cell that computes its state on first use.
    #[must_use]
    pub fn new<F>(supplier: F) -> Self
    where
        F: Fn() -> Result<S, BoxError> + Send + 'static,
    {
        Self {
            supplier: Some(Box::new(supplier)),
            state: OnceCell::new(),
        }
    }

    /// Creates a cell whose state is already known.
    #[must_use]
    pub fn ready(state: S) -> Self {
        Self {
            supplier: None,
            state: OnceCell::with_value(state),
        }
    }

    /// Returns the state, computing it on the first call.
    ///
    /// # Errors
    ///
    /// Returns the computation's error. Nothing is cached on failure, so the
    /// next call runs the computation again.
    pub fn state(&self) -> Result<&S, BoxError> {
        self.state.get_or_try_init(|| {
            self.supplier.as_ref().map_or_else(
                || Err(BoxError::from("eagerly supplied state is missing")),
                |supply| supply(),
            )
        })
    }

    /// Returns `true` once the state has been computed. Never forces it.
    #[must_use]
    pub fn is_computed(&self) -> bool {
        self.state.get().is_some()
    }

    /// Compares both states, computing either if needed.
    ///
    /// # Errors
    ///
    /// Returns the first computation failure encountered.
    pub fn try_eq(&self, other: &Self) -> Result<bool, BoxError>
    where
        S: PartialEq,
    {
        Ok(self.state()? == other.state()?)
    }
}

/// A state that fails to compute is unequal to everything, itself included.
/// The failure is not cached, so a later comparison retries the computation.
impl<S: PartialEq> PartialEq for LazyState<S> {
    fn eq(&self, other: &Self) -> bool {
        self.try_eq(other).unwrap_or(false)
    }
}

impl<S: Hash> Hash for LazyState<S> {
    fn hash<H: Hasher>(&self, hasher: &mut H) {
        if let Ok(state) = self.state() {
            state.hash(hasher);
        }
    }
}

impl<S: Serialize> Serialize for LazyState<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        self.state()
            .map_err(<Ser::Error as serde::ser::Error>::custom)?
            .serialize(serializer)
    }
}

impl<S: fmt::Debug> fmt::Debug for LazyState<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyState")
            .field("state", &self.state.get())
            .finish_non_exhaustive()
    }
}
