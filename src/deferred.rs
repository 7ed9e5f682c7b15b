//! A value that may be left for someone else to decide.
//!
//! `Deferred::Unspecified` means "use whatever the caller, command or chain
//! would otherwise use". It is distinct from every explicit value, including
//! ones like `Stdio::Null` that mean "nothing".

use crate::error::{PipeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred<T> {
    Unspecified,
    Explicit(T),
}

impl<T> Default for Deferred<T> {
    fn default() -> Self { Deferred::Unspecified }
}

impl<T> Deferred<T> {
    pub fn is_unspecified(&self) -> bool { matches!(self, Deferred::Unspecified) }
    pub fn is_explicit(&self) -> bool { !self.is_unspecified() }

    /// Keep `self` if explicit, otherwise fall back to `other`.
    pub fn or(self, other: Deferred<T>) -> Deferred<T> {
        match self {
            Deferred::Explicit(v) => Deferred::Explicit(v),
            Deferred::Unspecified => other,
        }
    }

    pub fn or_else<F: FnOnce() -> Deferred<T>>(self, f: F) -> Deferred<T> {
        match self {
            Deferred::Explicit(v) => Deferred::Explicit(v),
            Deferred::Unspecified => f(),
        }
    }

    /// Explicit value, or `default` when nothing was specified.
    pub fn resolve(self, default: T) -> T {
        match self {
            Deferred::Explicit(v) => v,
            Deferred::Unspecified => default,
        }
    }

    pub fn require(self) -> Result<T> {
        self.into_option().ok_or(PipeError::Unresolved)
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Deferred::Explicit(v) => Some(v),
            Deferred::Unspecified => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Deferred<U> {
        match self {
            Deferred::Explicit(v) => Deferred::Explicit(f(v)),
            Deferred::Unspecified => Deferred::Unspecified,
        }
    }

    /// Move the value out, leaving `Unspecified` behind.
    pub fn take(&mut self) -> Deferred<T> { std::mem::take(self) }
}

impl<T> From<T> for Deferred<T> {
    fn from(v: T) -> Self { Deferred::Explicit(v) }
}

/// First explicit value in priority order.
pub fn first_specified<T, I>(vals: I) -> Deferred<T>
where
    I: IntoIterator<Item = Deferred<T>>,
{
    vals.into_iter().find(Deferred::is_explicit).unwrap_or_default()
}

/// As [`first_specified`], but failing when every value is unspecified.
pub fn resolve_required<T, I>(vals: I) -> Result<T>
where
    I: IntoIterator<Item = Deferred<T>>,
{
    first_specified(vals).require()
}
