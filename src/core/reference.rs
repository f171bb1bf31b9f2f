//! Reference-number generation for ledger entries
//!
//! A reference number is the externally-facing token of a transaction. It
//! combines the wall-clock millisecond with a per-generator sequence, so two
//! transfers completed within the same clock tick still get distinct tokens.

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Default prefix of every reference number
pub const DEFAULT_REFERENCE_PREFIX: &str = "TXN";

/// Produces unique reference numbers of the form `TXN1718000000000-000042`
///
/// Generators derived through [`ReferenceGenerator::with_prefix`] draw from
/// the same sequence.
#[derive(Debug)]
pub struct ReferenceGenerator {
    prefix: String,
    sequence: Arc<AtomicU64>,
}

impl ReferenceGenerator {
    /// Create a generator whose tokens start with `prefix`
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            sequence: Arc::new(AtomicU64::new(1)),
        }
    }

    /// A generator issuing tokens with `prefix` from this generator's sequence
    pub fn with_prefix(&self, prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            sequence: Arc::clone(&self.sequence),
        }
    }

    /// The prefix prepended to every token
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Produce the next reference number
    ///
    /// Unique across every generator sharing the sequence: the sequence
    /// component never repeats, whatever the clock does.
    pub fn next_reference(&self) -> String {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!(
            "{}{}-{:06}",
            self.prefix,
            Utc::now().timestamp_millis(),
            sequence
        )
    }
}

impl Default for ReferenceGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_REFERENCE_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn test_reference_format() {
        let generator = ReferenceGenerator::default();

        let reference = generator.next_reference();

        assert!(reference.starts_with("TXN"));
        assert!(reference.ends_with("-000001"));
    }

    #[test]
    fn test_custom_prefix() {
        let generator = ReferenceGenerator::new("LDG");

        assert_eq!(generator.prefix(), "LDG");
        assert!(generator.next_reference().starts_with("LDG"));
    }

    #[test]
    fn test_derived_generator_shares_sequence() {
        let generator = ReferenceGenerator::default();
        let derived = generator.with_prefix("TXN");

        let first = generator.next_reference();
        let second = derived.next_reference();

        assert!(first.ends_with("-000001"));
        assert!(second.ends_with("-000002"));
        assert_eq!(derived.prefix(), "TXN");
    }

    #[test]
    fn test_same_tick_references_differ() {
        let generator = ReferenceGenerator::default();

        let references: HashSet<String> = (0..1000).map(|_| generator.next_reference()).collect();

        assert_eq!(references.len(), 1000);
    }

    #[test]
    fn test_concurrent_references_are_unique() {
        let generator = Arc::new(ReferenceGenerator::default());
        let mut handles = vec![];

        for _ in 0..8 {
            let generator_clone = Arc::clone(&generator);
            handles.push(thread::spawn(move || {
                (0..500)
                    .map(|_| generator_clone.next_reference())
                    .collect::<Vec<_>>()
            }));
        }

        let references: HashSet<String> = handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect();

        assert_eq!(references.len(), 4000);
    }
}
