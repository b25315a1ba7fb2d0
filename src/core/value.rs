//! Dynamic payload values passed to log calls
//!
//! Lists and maps are shared nodes, so a payload can contain the same node
//! twice or even contain itself. The serializer is responsible for turning
//! such graphs into something printable.

use parking_lot::RwLock;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Shared, interior-mutable node of a payload graph
pub type Shared<T> = Arc<RwLock<T>>;

/// Error captured into a payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorValue {
    pub name: String,
    pub message: String,
    pub stack: Option<String>,
}

impl ErrorValue {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            stack: None,
        }
    }

    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Capture a `std::error::Error`: the type name, its message, and its
    /// source chain as the stack.
    pub fn capture<E: std::error::Error + ?Sized>(error: &E) -> Self {
        let full_name = std::any::type_name::<E>();
        let name = full_name
            .split('<')
            .next()
            .and_then(|path| path.rsplit("::").next())
            .unwrap_or(full_name);

        let mut chain = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            chain.push(format!("    caused by: {}", cause));
            source = cause.source();
        }

        Self {
            name: name.to_string(),
            message: error.to_string(),
            stack: (!chain.is_empty()).then(|| chain.join("\n")),
        }
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

/// A value that can be logged
#[derive(Clone)]
pub enum LogValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Error(ErrorValue),
    List(Shared<Vec<LogValue>>),
    Map(Shared<Vec<(String, LogValue)>>),
}

impl LogValue {
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<LogValue>,
    {
        LogValue::List(Arc::new(RwLock::new(
            items.into_iter().map(Into::into).collect(),
        )))
    }

    /// Build a map, keeping insertion order
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<LogValue>,
    {
        LogValue::Map(Arc::new(RwLock::new(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )))
    }

    pub fn error<E: std::error::Error + ?Sized>(error: &E) -> Self {
        LogValue::Error(ErrorValue::capture(error))
    }

    /// Convert any serializable value. Values that serde cannot represent
    /// become their error message as a string.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(json) => LogValue::from(json),
            Err(e) => LogValue::String(e.to_string()),
        }
    }

    /// Append to a list node. Returns `false` if this is not a list.
    ///
    /// Pushing a node into itself, directly or through descendants, forms a
    /// reference cycle that is never freed on its own. Call [`LogValue::clear`]
    /// on the node once it has been logged to release it.
    pub fn push(&self, value: impl Into<LogValue>) -> bool {
        match self {
            LogValue::List(items) => {
                items.write().push(value.into());
                true
            }
            _ => false,
        }
    }

    /// Insert or replace a key in a map node. Returns `false` if this is not a map.
    ///
    /// Inserting a node into itself leaks it until [`LogValue::clear`] is
    /// called, the same as [`LogValue::push`].
    pub fn insert(&self, key: impl Into<String>, value: impl Into<LogValue>) -> bool {
        match self {
            LogValue::Map(entries) => {
                let key = key.into();
                let value = value.into();
                let mut entries = entries.write();
                match entries.iter_mut().find(|(k, _)| *k == key) {
                    Some(slot) => slot.1 = value,
                    None => entries.push((key, value)),
                }
                true
            }
            _ => false,
        }
    }

    /// Empty a list or map node, dropping its children. This breaks any
    /// cycle running through the node.
    pub fn clear(&self) {
        match self {
            LogValue::List(items) => items.write().clear(),
            LogValue::Map(entries) => entries.write().clear(),
            _ => {}
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, LogValue::Null)
    }

    /// Lists, maps, and errors
    pub fn is_object(&self) -> bool {
        matches!(
            self,
            LogValue::List(_) | LogValue::Map(_) | LogValue::Error(_)
        )
    }

    /// Identity of a shared node, used for cycle detection
    pub(crate) fn node_id(&self) -> Option<usize> {
        match self {
            LogValue::List(items) => Some(Arc::as_ptr(items) as *const () as usize),
            LogValue::Map(entries) => Some(Arc::as_ptr(entries) as *const () as usize),
            _ => None,
        }
    }
}

impl Default for LogValue {
    fn default() -> Self {
        LogValue::Null
    }
}

impl fmt::Debug for LogValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::core::serializer::inline(self))
    }
}

impl fmt::Display for LogValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::core::serializer::inline(self))
    }
}

impl From<String> for LogValue {
    fn from(s: String) -> Self {
        LogValue::String(s)
    }
}

impl From<&str> for LogValue {
    fn from(s: &str) -> Self {
        LogValue::String(s.to_string())
    }
}

impl From<&String> for LogValue {
    fn from(s: &String) -> Self {
        LogValue::String(s.clone())
    }
}

impl From<i64> for LogValue {
    fn from(i: i64) -> Self {
        LogValue::Int(i)
    }
}

impl From<i32> for LogValue {
    fn from(i: i32) -> Self {
        LogValue::Int(i as i64)
    }
}

impl From<u32> for LogValue {
    fn from(i: u32) -> Self {
        LogValue::Int(i as i64)
    }
}

impl From<usize> for LogValue {
    fn from(i: usize) -> Self {
        i64::try_from(i)
            .map(LogValue::Int)
            .unwrap_or(LogValue::Float(i as f64))
    }
}

impl From<u64> for LogValue {
    fn from(i: u64) -> Self {
        i64::try_from(i)
            .map(LogValue::Int)
            .unwrap_or(LogValue::Float(i as f64))
    }
}

impl From<f64> for LogValue {
    fn from(f: f64) -> Self {
        LogValue::Float(f)
    }
}

impl From<bool> for LogValue {
    fn from(b: bool) -> Self {
        LogValue::Bool(b)
    }
}

impl From<ErrorValue> for LogValue {
    fn from(e: ErrorValue) -> Self {
        LogValue::Error(e)
    }
}

impl<T: Into<LogValue>> From<Option<T>> for LogValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(LogValue::Null)
    }
}

impl<T: Into<LogValue>> From<Vec<T>> for LogValue {
    fn from(items: Vec<T>) -> Self {
        LogValue::list(items)
    }
}

impl From<serde_json::Value> for LogValue {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value;
        match json {
            Value::Null => LogValue::Null,
            Value::Bool(b) => LogValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => LogValue::Int(i),
                None => LogValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => LogValue::String(s),
            Value::Array(items) => LogValue::list(items),
            Value::Object(entries) => LogValue::map(entries),
        }
    }
}

/// The ordered arguments of one leveled call
#[derive(Debug, Clone, Default)]
pub struct Payload(Vec<LogValue>);

impl Payload {
    pub fn new(values: Vec<LogValue>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[LogValue] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<LogValue>> for Payload {
    fn from(values: Vec<LogValue>) -> Self {
        Payload(values)
    }
}

impl<const N: usize> From<[LogValue; N]> for Payload {
    fn from(values: [LogValue; N]) -> Self {
        Payload(values.into())
    }
}

impl From<LogValue> for Payload {
    fn from(value: LogValue) -> Self {
        Payload(vec![value])
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Payload(vec![s.into()])
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Payload(vec![s.into()])
    }
}

impl From<ErrorValue> for Payload {
    fn from(e: ErrorValue) -> Self {
        Payload(vec![e.into()])
    }
}

impl From<serde_json::Value> for Payload {
    fn from(json: serde_json::Value) -> Self {
        Payload(vec![json.into()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct Inner;

    impl fmt::Display for Inner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("disk unplugged")
        }
    }

    impl std::error::Error for Inner {}

    #[derive(Debug)]
    struct Outer(Inner);

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("save failed")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_capture_error() {
        let captured = ErrorValue::capture(&Outer(Inner));
        assert_eq!(captured.name, "Outer");
        assert_eq!(captured.message, "save failed");
        assert_eq!(
            captured.stack.as_deref(),
            Some("    caused by: disk unplugged")
        );
        assert_eq!(ErrorValue::capture(&Inner).stack, None);
    }

    #[test]
    fn test_map_insert_keeps_order() {
        let map = LogValue::map([("b", 1), ("a", 2)]);
        assert!(map.insert("c", 3));
        assert!(map.insert("b", 10));
        let LogValue::Map(entries) = &map else {
            panic!("expected map");
        };
        let keys: Vec<String> = entries.read().iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert!(!LogValue::Null.insert("x", 1));
    }

    #[test]
    fn test_from_json() {
        // serde_json maps are key-sorted
        let value = LogValue::from(json!({"id": 7, "tags": ["a"], "ratio": 0.5}));
        assert!(value.is_object());
        assert_eq!(value.to_string(), "{ id: 7, ratio: 0.5, tags: [ 'a' ] }");
    }

    #[test]
    fn test_from_serialize() {
        #[derive(Serialize)]
        struct User {
            name: &'static str,
            admin: bool,
        }

        let value = LogValue::from_serialize(&User {
            name: "ada",
            admin: true,
        });
        assert_eq!(value.to_string(), "{ admin: true, name: 'ada' }");
    }

    #[test]
    fn test_self_reference_debug_terminates() {
        let list = LogValue::list(Vec::<LogValue>::new());
        list.push(list.clone());
        assert_eq!(format!("{:?}", list), "[ [Circular] ]");
    }

    #[test]
    fn test_payload_conversions() {
        assert_eq!(Payload::from("hello").len(), 1);
        assert_eq!(Payload::from([LogValue::from(1), LogValue::from("x")]).len(), 2);
        assert!(Payload::default().is_empty());
    }

    #[test]
    fn test_clear_releases_cycle() {
        let map = LogValue::map([("name", "root")]);
        map.insert("self", map.clone());
        let weak = match &map {
            LogValue::Map(entries) => Arc::downgrade(entries),
            _ => unreachable!(),
        };

        map.clear();
        drop(map);
        assert!(weak.upgrade().is_none());
    }
}
