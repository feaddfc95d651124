// Crate implementing the Engineering Principles of Optionals

use std::fmt;

use crate::errors::{BoxedError, OptionalError, OptionalResult};

/// Optional is a mutable optional cell: it is always in exactly one of
/// two states (present with a value, or absent) and a bounded set of
/// operations may flip that state in place on the same instance. Every
/// operation re-reads the slot at call time, so a cell that started
/// absent and was later filled behaves as present from that point on.
///
/// Fallible caller-supplied callbacks are the `try_` prefixed members:
/// each one either swallows the callback failure (producing the
/// documented empty result) or wraps it into an [`OptionalError`] and
/// raises it. The failure policy is per operation, never a blanket rule.
#[derive(Debug, Clone)]
pub struct Optional<T> {
    slot: Option<T>,
}

pub fn present<T>(value: T) -> Optional<T> {
    Optional::present(value)
}

pub fn absent<T>() -> Optional<T> {
    Optional::absent()
}

impl<T> Optional<T> {
    pub fn present(value: T) -> Self {
        Self { slot: Some(value) }
    }

    pub fn absent() -> Self {
        Self { slot: None }
    }

    // -- query operations: non-mutating and total.

    pub fn is_some(&self) -> bool {
        self.slot.is_some()
    }

    pub fn is_none(&self) -> bool {
        self.slot.is_none()
    }

    pub fn is_some_and<F>(&self, f: F) -> bool
    where
        F: FnOnce(&T) -> bool,
    {
        match &self.slot {
            Some(value) => f(value),
            None => false,
        }
    }

    pub fn is_none_or<F>(&self, f: F) -> bool
    where
        F: FnOnce(&T) -> bool,
    {
        match &self.slot {
            Some(value) => f(value),
            None => true,
        }
    }

    /// A failing predicate is not a definitive yes, so it reports `false`.
    pub fn try_is_some_and<F, E>(&self, f: F) -> bool
    where
        F: FnOnce(&T) -> Result<bool, E>,
    {
        match &self.slot {
            Some(value) => f(value).unwrap_or(false),
            None => false,
        }
    }

    /// A failing predicate is not a definitive yes, so it reports `false`.
    pub fn try_is_none_or<F, E>(&self, f: F) -> bool
    where
        F: FnOnce(&T) -> Result<bool, E>,
    {
        match &self.slot {
            Some(value) => f(value).unwrap_or(false),
            None => true,
        }
    }

    pub fn as_ref(&self) -> Option<&T> {
        self.slot.as_ref()
    }

    pub fn as_mut(&mut self) -> Option<&mut T> {
        self.slot.as_mut()
    }

    // -- transform operations: callback failures are swallowed and the
    // operation yields its documented empty result.

    pub fn map<U, F>(self, f: F) -> Optional<U>
    where
        F: FnOnce(T) -> U,
    {
        match self.slot {
            Some(value) => Optional::present(f(value)),
            None => Optional::absent(),
        }
    }

    pub fn try_map<U, F, E>(self, f: F) -> Optional<U>
    where
        F: FnOnce(T) -> Result<U, E>,
    {
        match self.slot {
            Some(value) => match f(value) {
                Ok(mapped) => Optional::present(mapped),
                Err(_) => Optional::absent(),
            },
            None => Optional::absent(),
        }
    }

    pub fn and_then<U, F>(self, f: F) -> Optional<U>
    where
        F: FnOnce(T) -> Optional<U>,
    {
        match self.slot {
            Some(value) => f(value),
            None => Optional::absent(),
        }
    }

    pub fn try_and_then<U, F, E>(self, f: F) -> Optional<U>
    where
        F: FnOnce(T) -> Result<Optional<U>, E>,
    {
        match self.slot {
            Some(value) => f(value).unwrap_or_else(|_| Optional::absent()),
            None => Optional::absent(),
        }
    }

    pub fn filter<F>(self, f: F) -> Self
    where
        F: FnOnce(&T) -> bool,
    {
        match self.slot {
            Some(value) => {
                if f(&value) {
                    Self::present(value)
                } else {
                    Self::absent()
                }
            }
            None => Self::absent(),
        }
    }

    pub fn try_filter<F, E>(self, f: F) -> Self
    where
        F: FnOnce(&T) -> Result<bool, E>,
    {
        match self.slot {
            Some(value) => {
                if matches!(f(&value), Ok(true)) {
                    Self::present(value)
                } else {
                    Self::absent()
                }
            }
            None => Self::absent(),
        }
    }

    pub fn or_else<F>(self, f: F) -> Self
    where
        F: FnOnce() -> Optional<T>,
    {
        if self.slot.is_some() {
            self
        } else {
            f()
        }
    }

    /// There is no fallback value to reach for when the fallback
    /// producer itself fails, so the failure collapses to absent.
    pub fn try_or_else<F, E>(self, f: F) -> Self
    where
        F: FnOnce() -> Result<Optional<T>, E>,
    {
        if self.slot.is_some() {
            self
        } else {
            f().unwrap_or_else(|_| Self::absent())
        }
    }

    pub fn inspect<F>(self, f: F) -> Self
    where
        F: FnOnce(&T),
    {
        if let Some(value) = &self.slot {
            f(value);
        }
        self
    }

    /// A failing side effect must not alter control flow; the receiver
    /// comes back unchanged either way.
    pub fn try_inspect<F, E>(self, f: F) -> Self
    where
        F: FnOnce(&T) -> Result<(), E>,
    {
        if let Some(value) = &self.slot {
            _ = f(value);
        }
        self
    }

    // -- combine operations: pure, no callback, no failure path.

    pub fn and<U>(self, other: Optional<U>) -> Optional<U> {
        match self.slot {
            Some(_) => other,
            None => Optional::absent(),
        }
    }

    pub fn or(self, other: Self) -> Self {
        if self.slot.is_some() {
            self
        } else {
            other
        }
    }

    // present only when exactly one side is present.
    pub fn xor(self, other: Self) -> Self {
        match (self.slot, other.slot) {
            (Some(value), None) => Self::present(value),
            (None, Some(value)) => Self::present(value),
            _ => Self::absent(),
        }
    }

    // -- extraction operations.

    pub fn unwrap(self) -> OptionalResult<T> {
        self.slot.ok_or(OptionalError::AbsentValue)
    }

    pub fn expect<M>(self, message: M) -> OptionalResult<T>
    where
        M: Into<String>,
    {
        self.slot
            .ok_or_else(|| OptionalError::Expectation(message.into()))
    }

    pub fn unwrap_or(self, default: T) -> T {
        self.slot.unwrap_or(default)
    }

    pub fn unwrap_or_else<F>(self, f: F) -> T
    where
        F: FnOnce() -> T,
    {
        self.slot.unwrap_or_else(f)
    }

    pub fn try_unwrap_or_else<F, E>(self, f: F) -> OptionalResult<T>
    where
        F: FnOnce() -> Result<T, E>,
        E: Into<BoxedError>,
    {
        match self.slot {
            Some(value) => Ok(value),
            None => f().map_err(|err| {
                OptionalError::callback(
                    "Fallback generator failed while computing a replacement value",
                    err,
                )
            }),
        }
    }

    // -- mutating operations: the only members that flip the cell's
    // state in place.

    pub fn insert(&mut self, value: T) -> &mut T {
        self.slot.insert(value)
    }

    pub fn get_or_insert(&mut self, value: T) -> &mut T {
        self.slot.get_or_insert(value)
    }

    pub fn get_or_insert_with<F>(&mut self, f: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        self.slot.get_or_insert_with(f)
    }

    /// When the generator fails the cell is left exactly as it was;
    /// there is no partial mutation to observe.
    pub fn try_get_or_insert_with<F, E>(&mut self, f: F) -> OptionalResult<&mut T>
    where
        F: FnOnce() -> Result<T, E>,
        E: Into<BoxedError>,
    {
        if self.slot.is_none() {
            let value = f().map_err(|err| {
                OptionalError::callback("Generator failed while computing a value to insert", err)
            })?;
            self.slot = Some(value);
        }

        Ok(self
            .slot
            .as_mut()
            .expect("slot should have been filled above"))
    }

    pub fn replace(&mut self, value: T) -> Optional<T> {
        Optional {
            slot: self.slot.replace(value),
        }
    }

    pub fn take(&mut self) -> Optional<T> {
        Optional {
            slot: self.slot.take(),
        }
    }

    pub fn take_if<F>(&mut self, f: F) -> Optional<T>
    where
        F: FnOnce(&mut T) -> bool,
    {
        Optional {
            slot: self.slot.take_if(f),
        }
    }

    /// A failing predicate swallows to "nothing taken": the call
    /// returns absent and the receiver keeps whatever it held.
    pub fn try_take_if<F, E>(&mut self, f: F) -> Optional<T>
    where
        F: FnOnce(&mut T) -> Result<bool, E>,
    {
        let should_take = match &mut self.slot {
            Some(value) => matches!(f(value), Ok(true)),
            None => false,
        };

        if should_take {
            self.take()
        } else {
            Optional::absent()
        }
    }

    // -- folding operations: exactly one of two code paths runs.

    pub fn map_or<U, F>(self, default: U, f: F) -> U
    where
        F: FnOnce(T) -> U,
    {
        match self.slot {
            Some(value) => f(value),
            None => default,
        }
    }

    /// A failing fold falls back to the provided default since a safe
    /// default exists here.
    pub fn try_map_or<U, F, E>(self, default: U, f: F) -> U
    where
        F: FnOnce(T) -> Result<U, E>,
    {
        match self.slot {
            Some(value) => f(value).unwrap_or(default),
            None => default,
        }
    }

    pub fn map_or_else<U, D, F>(self, mk_default: D, f: F) -> U
    where
        D: FnOnce() -> U,
        F: FnOnce(T) -> U,
    {
        match self.slot {
            Some(value) => f(value),
            None => mk_default(),
        }
    }

    /// Both branches are functions, so there is no safe default left
    /// when one of them fails: the failure is wrapped and raised.
    pub fn try_map_or_else<U, D, F, E>(self, mk_default: D, f: F) -> OptionalResult<U>
    where
        D: FnOnce() -> Result<U, E>,
        F: FnOnce(T) -> Result<U, E>,
        E: Into<BoxedError>,
    {
        match self.slot {
            Some(value) => f(value).map_err(|err| {
                OptionalError::callback("Present branch failed while folding an optional", err)
            }),
            None => mk_default().map_err(|err| {
                OptionalError::callback("Absent branch failed while folding an optional", err)
            }),
        }
    }

    pub fn when<U, F, G>(self, on_present: F, on_absent: G) -> U
    where
        F: FnOnce(T) -> U,
        G: FnOnce() -> U,
    {
        match self.slot {
            Some(value) => on_present(value),
            None => on_absent(),
        }
    }

    pub fn try_when<U, F, G, E>(self, on_present: F, on_absent: G) -> OptionalResult<U>
    where
        F: FnOnce(T) -> Result<U, E>,
        G: FnOnce() -> Result<U, E>,
        E: Into<BoxedError>,
    {
        match self.slot {
            Some(value) => on_present(value).map_err(|err| {
                OptionalError::callback("Present branch failed while matching an optional", err)
            }),
            None => on_absent().map_err(|err| {
                OptionalError::callback("Absent branch failed while matching an optional", err)
            }),
        }
    }

    // -- conversion operations: deterministic structural conversions
    // into the outcome type.

    pub fn ok_or<E>(self, err: E) -> Result<T, E> {
        self.slot.ok_or(err)
    }

    pub fn ok_or_else<E, F>(self, f: F) -> Result<T, E>
    where
        F: FnOnce() -> E,
    {
        self.slot.ok_or_else(f)
    }

    pub fn try_ok_or_else<E2, F, E>(self, f: F) -> OptionalResult<Result<T, E2>>
    where
        F: FnOnce() -> Result<E2, E>,
        E: Into<BoxedError>,
    {
        match self.slot {
            Some(value) => Ok(Ok(value)),
            None => match f() {
                Ok(failure) => Ok(Err(failure)),
                Err(err) => Err(OptionalError::callback(
                    "Error producer failed while converting an absent optional",
                    err,
                )),
            },
        }
    }

    pub fn into_option(self) -> Option<T> {
        self.slot
    }
}

impl<T, E> Optional<Result<T, E>> {
    /// Turns an optional of an outcome into an outcome of an optional:
    /// a carried failure propagates, an absent cell becomes a success
    /// holding absent.
    pub fn transpose(self) -> Result<Optional<T>, E> {
        match self.slot {
            Some(Ok(value)) => Ok(Optional::present(value)),
            Some(Err(err)) => Err(err),
            None => Ok(Optional::absent()),
        }
    }
}

impl<T> Optional<Optional<T>> {
    // removes exactly one level of nesting.
    pub fn flatten(self) -> Optional<T> {
        match self.slot {
            Some(inner) => inner,
            None => Optional::absent(),
        }
    }
}

impl<T> Default for Optional<T> {
    fn default() -> Self {
        Self::absent()
    }
}

impl<T> From<Option<T>> for Optional<T> {
    fn from(slot: Option<T>) -> Self {
        Self { slot }
    }
}

impl<T> From<Optional<T>> for Option<T> {
    fn from(optional: Optional<T>) -> Option<T> {
        optional.slot
    }
}

impl<T> From<T> for Optional<T> {
    fn from(value: T) -> Self {
        Self::present(value)
    }
}

impl<T: fmt::Display> fmt::Display for Optional<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.slot {
            Some(value) => write!(f, "Some {{ {value} }}"),
            None => f.write_str("None"),
        }
    }
}
