//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Keyed save-game records
//!
//! A `Record` is an ordered map of named, typed values. Records nest, so a
//! participant can write its own fields and hand a child record to each of its
//! parts (schedule, position, ...). How a record reaches the disk is up to the
//! caller; the type is `serde` serializable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors raised by typed record accessors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    /// No value is stored under the key.
    #[error("Record has no field named '{0}'")]
    Missing(String),

    /// A value exists but holds a different type.
    #[error("Record field '{key}' is a {found}, expected {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// An integer does not fit the requested width.
    #[error("Record field '{key}' holds {value}, which is out of range for {expected}")]
    OutOfRange {
        key: String,
        value: i64,
        expected: &'static str,
    },
}

/// Result type for record accessors.
pub type RecordResult<T> = Result<T, RecordError>;

/// A single value stored in a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Record(Record),
}

impl RecordValue {
    fn kind(&self) -> &'static str {
        match self {
            RecordValue::Bool(_) => "bool",
            RecordValue::Integer(_) => "integer",
            RecordValue::Float(_) => "float",
            RecordValue::String(_) => "string",
            RecordValue::Record(_) => "record",
        }
    }
}

/// Ordered, nestable key/value record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, RecordValue>);

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether a field with the given key exists
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterate over field names in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Remove all fields
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Store a raw value, replacing any previous value under the key
    pub fn put(&mut self, key: impl Into<String>, value: RecordValue) {
        self.0.insert(key.into(), value);
    }

    /// Get a raw value
    pub fn get(&self, key: &str) -> Option<&RecordValue> {
        self.0.get(key)
    }

    pub fn put_bool(&mut self, key: impl Into<String>, value: bool) {
        self.put(key, RecordValue::Bool(value));
    }

    pub fn put_i64(&mut self, key: impl Into<String>, value: i64) {
        self.put(key, RecordValue::Integer(value));
    }

    pub fn put_i32(&mut self, key: impl Into<String>, value: i32) {
        self.put(key, RecordValue::Integer(i64::from(value)));
    }

    pub fn put_u16(&mut self, key: impl Into<String>, value: u16) {
        self.put(key, RecordValue::Integer(i64::from(value)));
    }

    pub fn put_u32(&mut self, key: impl Into<String>, value: u32) {
        self.put(key, RecordValue::Integer(i64::from(value)));
    }

    pub fn put_f32(&mut self, key: impl Into<String>, value: f32) {
        self.put(key, RecordValue::Float(f64::from(value)));
    }

    pub fn put_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.put(key, RecordValue::String(value.into()));
    }

    pub fn put_record(&mut self, key: impl Into<String>, value: Record) {
        self.put(key, RecordValue::Record(value));
    }

    fn require(&self, key: &str) -> RecordResult<&RecordValue> {
        self.0
            .get(key)
            .ok_or_else(|| RecordError::Missing(key.to_string()))
    }

    fn mismatch(key: &str, expected: &'static str, found: &RecordValue) -> RecordError {
        RecordError::TypeMismatch {
            key: key.to_string(),
            expected,
            found: found.kind(),
        }
    }

    pub fn get_bool(&self, key: &str) -> RecordResult<bool> {
        match self.require(key)? {
            RecordValue::Bool(value) => Ok(*value),
            other => Err(Self::mismatch(key, "bool", other)),
        }
    }

    pub fn get_i64(&self, key: &str) -> RecordResult<i64> {
        match self.require(key)? {
            RecordValue::Integer(value) => Ok(*value),
            other => Err(Self::mismatch(key, "integer", other)),
        }
    }

    pub fn get_i32(&self, key: &str) -> RecordResult<i32> {
        self.get_narrowed(key, "i32")
    }

    pub fn get_u16(&self, key: &str) -> RecordResult<u16> {
        self.get_narrowed(key, "u16")
    }

    pub fn get_u32(&self, key: &str) -> RecordResult<u32> {
        self.get_narrowed(key, "u32")
    }

    fn get_narrowed<T: TryFrom<i64>>(&self, key: &str, expected: &'static str) -> RecordResult<T> {
        let value = self.get_i64(key)?;
        T::try_from(value).map_err(|_| RecordError::OutOfRange {
            key: key.to_string(),
            value,
            expected,
        })
    }

    /// Get a float; integers are widened since formats like JSON drop the
    /// fractional part of whole numbers
    pub fn get_f32(&self, key: &str) -> RecordResult<f32> {
        match self.require(key)? {
            RecordValue::Float(value) => Ok(*value as f32),
            RecordValue::Integer(value) => Ok(*value as f32),
            other => Err(Self::mismatch(key, "float", other)),
        }
    }

    pub fn get_string(&self, key: &str) -> RecordResult<&str> {
        match self.require(key)? {
            RecordValue::String(value) => Ok(value.as_str()),
            other => Err(Self::mismatch(key, "string", other)),
        }
    }

    pub fn get_record(&self, key: &str) -> RecordResult<&Record> {
        match self.require(key)? {
            RecordValue::Record(value) => Ok(value),
            other => Err(Self::mismatch(key, "record", other)),
        }
    }

    /// Get a nested record if present, `None` when the key is absent
    pub fn get_record_opt(&self, key: &str) -> RecordResult<Option<&Record>> {
        match self.0.get(key) {
            None => Ok(None),
            Some(RecordValue::Record(value)) => Ok(Some(value)),
            Some(other) => Err(Self::mismatch(key, "record", other)),
        }
    }
}
