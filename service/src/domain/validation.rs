//! Field-level validation failures.

use std::fmt;

use derive_more::{Display, Error, From};

/// A single field-level validation failure.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
#[display("`{field}`: {message}")]
pub struct Invalid {
    /// Name of the offending field.
    pub field: &'static str,

    /// Human-readable message.
    pub message: String,
}

impl Invalid {
    /// Creates a new [`Invalid`] for the provided field.
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Accumulated field-level validation failures of one submission.
#[derive(Clone, Debug, Default, Eq, Error, From, PartialEq)]
pub struct Invalids(#[error(not(source))] pub Vec<Invalid>);

impl Invalids {
    /// Creates a new empty [`Invalids`] accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Records the provided failure.
    pub fn push(&mut self, invalid: Invalid) {
        self.0.push(invalid);
    }

    /// Indicates whether no failures were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns this accumulator as a `Result`: `Ok` when empty.
    ///
    /// # Errors
    ///
    /// Returns itself if any failure was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<Invalid> for Invalids {
    fn from(invalid: Invalid) -> Self {
        Self(vec![invalid])
    }
}

impl fmt::Display for Invalids {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for invalid in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{invalid}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod spec {
    use super::{Invalid, Invalids};

    #[test]
    fn accumulates_and_formats() {
        let mut acc = Invalids::new();
        assert!(acc.clone().into_result().is_ok());

        acc.push(Invalid::new("phone", "invalid phone"));
        acc.push(Invalid::new("area", "out of bounds"));

        let err = acc.into_result().unwrap_err();
        assert_eq!(
            err.to_string(),
            "`phone`: invalid phone; `area`: out of bounds",
        );
    }
}
