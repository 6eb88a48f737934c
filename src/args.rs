//! Directive argument lists.
//!
//! A payload such as `reflex|dc:20|basic` splits into arguments that are either keyed
//! (`dc:20`) or positional (`reflex`, whose key is its own value). Every argument has to be
//! consumed by the handler; anything left over is an error.

use crate::context::RollData;
use crate::error::EnrichError;
use std::borrow::Cow;
use std::collections::{BTreeSet, HashSet};
use std::fmt;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct Entry<'r> {
    key: &'r str,
    value: &'r str,
}

impl Entry<'_> {
    fn is_positional(&self) -> bool {
        self.key == self.value
    }
}

#[derive(Debug, Clone)]
pub struct Args<'r> {
    raw: &'r str,
    context: String,
    entries: Vec<Entry<'r>>,
    consumed: HashSet<usize>,
}

impl<'r> Args<'r> {
    /// Every piece is kept, so `1d4 + 1d4` holds two `1d4` arguments.
    pub fn new(raw: &'r str, arg_sep: char, key_value_sep: char, context: impl Into<String>) -> Self {
        let entries = raw
            .split(arg_sep)
            .map(|arg| {
                let (key, value) = arg.split_once(key_value_sep).unwrap_or((arg, arg));
                Entry { key, value }
            })
            .collect();
        Self {
            raw,
            context: context.into(),
            entries,
            consumed: HashSet::new(),
        }
    }

    fn take(&mut self, index: usize) -> Option<Entry<'r>> {
        let entry = *self.entries.get(index)?;
        if self.consumed.insert(index) {
            Some(entry)
        } else {
            None
        }
    }

    /// Consumes every entry under `key`; the last one wins.
    fn take_key(&mut self, key: &str) -> Option<Entry<'r>> {
        let mut found = None;
        for index in 0..self.entries.len() {
            if self.entries[index].key == key {
                found = self.take(index).or(found);
            }
        }
        found
    }

    /// True when the value is `true`, or when the key appears on its own as a flag.
    pub fn consume_bool(&mut self, key: &str, default: bool) -> bool {
        match self.take_key(key) {
            Some(entry) => entry.value == "true" || entry.is_positional(),
            None => default,
        }
    }

    pub fn consume_str(&mut self, key: &str, default: Option<&'r str>) -> Option<&'r str> {
        self.take_key(key).map(|e| e.value).or(default)
    }

    /// A comma-separated value as a set of trimmed items.
    pub fn consume_set(&mut self, key: &str, default: &[&'r str]) -> BTreeSet<&'r str> {
        match self.consume_str(key, None) {
            Some(value) if !value.is_empty() => value.split(',').map(str::trim).collect(),
            _ => default.iter().copied().collect(),
        }
    }

    /// Like [`Args::consume_str`], substituting an `@path` value from the roll data.
    pub fn consume_resolved(&mut self, key: &str, data: &RollData) -> Option<Cow<'r, str>> {
        self.consume_str(key, None).map(|value| data.resolve_arg(value))
    }

    /// The value of the argument at `index`, counting keyed and positional arguments alike.
    pub fn consume_index(&mut self, index: usize) -> Result<&'r str, EnrichError> {
        self.take(index)
            .map(|e| e.value)
            .ok_or(EnrichError::MissingArgument { index })
    }

    pub fn consume_index_or(&mut self, index: usize, default: Option<&'r str>) -> Option<&'r str> {
        self.take(index).map(|e| e.value).or(default)
    }

    /// Drains the remaining positional arguments in order.
    pub fn consume_positional(&mut self) -> Vec<&'r str> {
        let mut ret = Vec::new();
        for index in 0..self.entries.len() {
            if self.entries[index].is_positional() {
                if let Some(entry) = self.take(index) {
                    ret.push(entry.value);
                }
            }
        }
        ret
    }

    /// Marks keys the handler knows about but does not render.
    pub fn ignore(&mut self, keys: &[&str]) {
        for key in keys {
            self.take_key(key);
        }
    }

    fn remaining(&self) -> impl Iterator<Item = &Entry<'r>> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.consumed.contains(i))
            .map(|(_, e)| e)
    }

    pub fn assert_consumed(&self) -> Result<(), EnrichError> {
        let (positional, keyed): (Vec<&Entry>, Vec<&Entry>) =
            self.remaining().partition(|e| e.is_positional());
        if keyed.is_empty() && positional.is_empty() {
            return Ok(());
        }
        Err(EnrichError::Unconsumed {
            keyed: keyed.iter().map(|e| e.key.to_string()).collect(),
            positional: positional.iter().map(|e| e.key.to_string()).collect(),
        })
    }

    /// Runs `f` over the arguments, then requires that everything was consumed.
    ///
    /// Any failure, whether from `f` or from the final check, is annotated with the context
    /// label and the raw payload. When `f` itself fails the check is skipped.
    pub fn with<T>(mut self, f: impl FnOnce(&mut Self) -> Result<T, EnrichError>) -> Result<T, EnrichError> {
        let result = f(&mut self).and_then(|value| {
            self.assert_consumed()?;
            Ok(value)
        });
        result.map_err(|source| EnrichError::Annotated {
            context: self.context.clone(),
            args: self.raw.to_string(),
            source: Box::new(source),
        })
    }
}

impl fmt::Display for Args<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Args(")?;
        for (i, entry) in self.remaining().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if entry.is_positional() {
                f.write_str(entry.key)?;
            } else {
                write!(f, "{}={}", entry.key, entry.value)?;
            }
        }
        f.write_str(")")
    }
}
