//! Core traits for Formwright
//!
//! This module defines the traits shared across the engine: validation,
//! modification timestamps, and the injectable sources
//! of field ids and wall-clock time.

use crate::error::FormResult;
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::{Arc, Mutex};

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for types that can check their own consistency
///
/// # Example
///
/// ```rust,ignore
/// use formwright_core::{FormError, FormResult, Validatable};
///
/// struct Choice { label: String }
///
/// impl Validatable for Choice {
///     fn validate(&self) -> FormResult<()> {
///         if self.label.trim().is_empty() {
///             return Err(FormError::EmptyLabel);
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Validate the current state of the object
    fn validate(&self) -> FormResult<()>;

    /// Check if the object is valid without returning error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Get all validation errors (for types that can have multiple errors)
    fn validation_errors(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => vec![],
            Err(e) => vec![e.to_string()],
        }
    }
}

// ============================================================================
// Timestamped Trait
// ============================================================================

/// Trait for types that track their last modification time
pub trait Timestamped {
    /// Get the last modification timestamp
    fn modified_at(&self) -> DateTime<Utc>;

    /// Set the last modification timestamp
    fn set_modified_at(&mut self, at: DateTime<Utc>);

    /// Bump the modification time using `clock`.
    ///
    /// The new timestamp is always strictly after the previous one, even when
    /// the clock has not advanced.
    fn touch(&mut self, clock: &dyn Clock) {
        let previous = self.modified_at();
        let now = clock.now();
        let next = if now > previous {
            now
        } else {
            previous + TimeDelta::milliseconds(1)
        };
        self.set_modified_at(next);
    }
}

// ============================================================================
// Clock
// ============================================================================

/// Source of wall-clock time
pub trait Clock: Send + Sync {
    /// Current time
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to; clones share the same time
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: TimeDelta) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }

    /// Jump the clock to `at`
    pub fn set(&self, at: DateTime<Utc>) {
        if let Ok(mut now) = self.now.lock() {
            *now = at;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

// ============================================================================
// Id Generation
// ============================================================================

/// Source of fresh field ids
pub trait IdGenerator: Send {
    /// Produce the next candidate id.
    ///
    /// Callers are responsible for skipping ids already in use.
    fn next_id(&mut self) -> String;
}

/// Monotonic counter yielding `<prefix>1`, `<prefix>2`, ...
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    /// Create a generator with a custom prefix
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl SequentialIds {
    /// Continue numbering after the highest `<prefix>N` found in `ids`
    pub fn resume_after<'a>(mut self, ids: impl IntoIterator<Item = &'a str>) -> Self {
        let highest = ids
            .into_iter()
            .filter_map(|id| id.strip_prefix(self.prefix.as_str()))
            .filter_map(|n| n.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        self.next = self.next.max(highest.saturating_add(1));
        self
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("field_")
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

/// Random ids of the form `field_<uuid>`
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self) -> String {
        format!("field_{}", uuid::Uuid::new_v4().simple())
    }
}

// ============================================================================
// Tests
// ============================================================================
