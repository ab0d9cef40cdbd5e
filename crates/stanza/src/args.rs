//! Positional-argument count constraints.

use std::fmt;

use crate::diagnostics::Diagnostic;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Constraint {
    Zero,
    Minimum(usize),
    Maximum(usize),
    Exact(usize),
    EndExclusive { min: usize, max: usize },
    EndInclusive { min: usize, max: usize },
}

/// How many positional arguments a command accepts.
///
/// Ranges are checked when they are built, so a specification that exists
/// is always satisfiable.
///
/// ```rust
/// use stanza::ArgumentSpecification;
///
/// let spec = ArgumentSpecification::end_inclusive(1, 3)?;
/// assert!(spec.validate(3).is_ok());
/// assert!(spec.validate(4).is_err());
///
/// assert!(ArgumentSpecification::end_exclusive(2, 2).is_err());
/// # Ok::<(), stanza::Diagnostic>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgumentSpecification(Constraint);

impl ArgumentSpecification {
    pub fn zero() -> Self {
        Self(Constraint::Zero)
    }

    pub fn minimum(n: usize) -> Self {
        Self(Constraint::Minimum(n))
    }

    pub fn maximum(n: usize) -> Self {
        Self(Constraint::Maximum(n))
    }

    pub fn exact(n: usize) -> Self {
        Self(Constraint::Exact(n))
    }

    /// `min <= count < max`; requires `max > min`.
    pub fn end_exclusive(min: usize, max: usize) -> Result<Self, Diagnostic> {
        if max <= min {
            return Err(Diagnostic::InvalidRange { min, max });
        }
        Ok(Self(Constraint::EndExclusive { min, max }))
    }

    /// `min <= count <= max`; requires `max >= min`.
    pub fn end_inclusive(min: usize, max: usize) -> Result<Self, Diagnostic> {
        if max < min {
            return Err(Diagnostic::InvalidRange { min, max });
        }
        Ok(Self(Constraint::EndInclusive { min, max }))
    }

    /// Checks a positional-argument count.
    pub fn validate(&self, count: usize) -> Result<(), Diagnostic> {
        let actual = count;
        match self.0 {
            Constraint::Zero if count != 0 => Err(Diagnostic::ArgumentsNotEqualToZero { actual }),
            Constraint::Minimum(expected) if count < expected => {
                Err(Diagnostic::ArgumentsLessThanMinimum { expected, actual })
            }
            Constraint::Maximum(expected) if count > expected => {
                Err(Diagnostic::ArgumentsGreaterThanMaximum { expected, actual })
            }
            Constraint::Exact(expected) if count != expected => {
                Err(Diagnostic::ArgumentsNotEqualToExact { expected, actual })
            }
            Constraint::EndExclusive { min, max } if !(min..max).contains(&count) => {
                Err(Diagnostic::ArgumentsNotInEndExclusiveRange { min, max, actual })
            }
            Constraint::EndInclusive { min, max } if !(min..=max).contains(&count) => {
                Err(Diagnostic::ArgumentsNotInEndInclusiveRange { min, max, actual })
            }
            _ => Ok(()),
        }
    }

    /// The smallest accepted count and, when bounded, the largest.
    pub fn bounds(&self) -> (usize, Option<usize>) {
        match self.0 {
            Constraint::Zero => (0, Some(0)),
            Constraint::Minimum(n) => (n, None),
            Constraint::Maximum(n) => (0, Some(n)),
            Constraint::Exact(n) => (n, Some(n)),
            Constraint::EndExclusive { min, max } => (min, Some(max - 1)),
            Constraint::EndInclusive { min, max } => (min, Some(max)),
        }
    }
}

impl fmt::Display for ArgumentSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Constraint::Zero => write!(f, "no arguments"),
            Constraint::Minimum(n) => write!(f, "at least {} {}", n, plural(n)),
            Constraint::Maximum(n) => write!(f, "at most {} {}", n, plural(n)),
            Constraint::Exact(n) => write!(f, "exactly {} {}", n, plural(n)),
            Constraint::EndExclusive { min, max } => {
                write!(f, "at least {} and fewer than {} arguments", min, max)
            }
            Constraint::EndInclusive { min, max } => {
                write!(f, "between {} and {} arguments", min, max)
            }
        }
    }
}

pub(crate) fn plural(n: usize) -> &'static str {
    if n == 1 {
        "argument"
    } else {
        "arguments"
    }
}
