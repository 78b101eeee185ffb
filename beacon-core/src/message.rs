//! The message entity forwarded to every listener.

use crate::error::MessageError;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// A message forwarded to every registered listener.
///
/// A message has an immutable `id`, a creation `timestamp`, and a mutable
/// string payload. Annotations are applied fluently before the message is
/// handed to a dispatcher; once submitted, the dispatcher owns it.
///
/// # Example
///
/// ```rust,ignore
/// let message = Message::new("checkout")
///     .with("cart_size", "3")
///     .annotate("coupon", None::<String>);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    id: String,
    data: HashMap<String, String>,
    timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message with an empty payload, stamped with the current time.
    ///
    /// # Panics
    ///
    /// Panics if `id` is empty. Use [`Message::try_new`] to handle that case.
    pub fn new(id: impl Into<String>) -> Self {
        match Self::try_new(id) {
            Ok(message) => message,
            Err(e) => panic!("{e}"),
        }
    }

    /// Create a message, rejecting an empty id.
    pub fn try_new(id: impl Into<String>) -> Result<Self, MessageError> {
        let id = id.into();
        if id.is_empty() {
            return Err(MessageError::EmptyId);
        }
        Ok(Self {
            id,
            data: HashMap::new(),
            timestamp: Utc::now(),
        })
    }

    /// Set or clear an annotation.
    ///
    /// `Some(value)` inserts or overwrites `key`; `None` removes it.
    pub fn annotate<K, V>(mut self, key: K, value: Option<V>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.annotate_mut(key, value);
        self
    }

    /// Set or clear an annotation (mutable version).
    pub fn annotate_mut<K, V>(&mut self, key: K, value: Option<V>) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let key = key.into();
        match value {
            Some(value) => {
                self.data.insert(key, value.into());
            }
            None => {
                self.data.remove(&key);
            }
        }
        self
    }

    /// Insert or overwrite an annotation.
    pub fn with(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotate(key, Some(value))
    }

    /// Remove an annotation.
    pub fn without(self, key: impl Into<String>) -> Self {
        self.annotate(key, None::<String>)
    }

    /// The message identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// All annotations.
    pub fn data(&self) -> &HashMap<String, String> {
        &self.data
    }

    /// Look up a single annotation.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// Whether `key` is annotated.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// When the message was created.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
