//! Messages routed through the node hierarchy.
//!
//! A message is an opaque payload paired with its textual form. Transition
//! rules match on the textual form only, so two payloads that render the
//! same way are treated as the same message.

use std::any::{Any, TypeId};
use std::fmt;
use std::rc::Rc;

/// An opaque message matched by its string form.
///
/// The key is captured from the payload's `Display` output when the message
/// is built. Domain types must render a stable, distinguishing string form.
///
/// # Example
///
/// ```rust
/// use hsm_engine::core::Message;
/// use std::fmt;
///
/// #[derive(Debug, PartialEq)]
/// enum Order {
///     Submit,
///     Cancel { reason: String },
/// }
///
/// impl fmt::Display for Order {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         match self {
///             Self::Submit => write!(f, "submit"),
///             Self::Cancel { .. } => write!(f, "cancel"),
///         }
///     }
/// }
///
/// let message = Message::new(Order::Cancel { reason: "late".into() });
/// assert_eq!(message.key(), "cancel");
/// assert!(message.payload::<Order>().is_some());
/// assert_eq!(message, Message::from("cancel"));
/// ```
#[derive(Clone)]
pub struct Message {
    key: Rc<str>,
    payload: Rc<dyn Any>,
    type_name: &'static str,
}

impl Message {
    /// Wrap a payload, capturing its string form as the match key.
    pub fn new<T>(payload: T) -> Self
    where
        T: fmt::Display + 'static,
    {
        Self {
            key: Rc::from(payload.to_string()),
            payload: Rc::new(payload),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// The string form used for rule matching.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Borrow the payload if it has type `T`.
    pub fn payload<T: 'static>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// Check the payload type without borrowing it.
    pub fn is<T: 'static>(&self) -> bool {
        (*self.payload).type_id() == TypeId::of::<T>()
    }

    /// Check whether this message matches a rule key.
    pub fn matches(&self, key: &str) -> bool {
        *self.key == *key
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Message {}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("key", &&*self.key)
            .field("type", &self.type_name)
            .finish()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl From<&str> for Message {
    fn from(value: &str) -> Self {
        Message::new(value.to_string())
    }
}

impl From<String> for Message {
    fn from(value: String) -> Self {
        Message::new(value)
    }
}

impl From<&Message> for Message {
    fn from(value: &Message) -> Self {
        value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Reading(u32);

    impl fmt::Display for Reading {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "reading")
        }
    }

    #[test]
    fn key_is_display_form() {
        let message = Message::new(Reading(7));
        assert_eq!(message.key(), "reading");
        assert!(message.matches("reading"));
        assert!(!message.matches("Reading"));
    }

    #[test]
    fn payload_downcasts_to_original_type() {
        let message = Message::new(Reading(7));
        assert_eq!(message.payload::<Reading>().map(|r| r.0), Some(7));
        assert!(message.payload::<String>().is_none());
        assert!(message.is::<Reading>());
    }

    #[test]
    fn equality_ignores_payload_structure() {
        let a = Message::new(Reading(1));
        let b = Message::new(Reading(2));
        let c = Message::from("reading");

        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_ne!(a, Message::from("other"));
    }

    #[test]
    fn string_payloads_round_trip() {
        let message = Message::from("go");
        assert_eq!(message.payload::<String>().map(String::as_str), Some("go"));
        assert_eq!(message.to_string(), "go");
    }
}
