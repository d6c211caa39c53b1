use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A shared, argument-less callback carried as a prop.
#[derive(Clone)]
pub struct Callback(Arc<dyn Fn() + Send + Sync>);

impl Callback {
    /// Wrap a function as a callback.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// A callback that does nothing.
    pub fn noop() -> Self {
        Self::new(|| {})
    }

    /// Invoke the callback.
    pub fn call(&self) {
        (self.0)()
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback")
    }
}

/// Object-safe view of a prop value: typed access, equality and debug
/// output survive erasure.
trait PropData: Any + Send + Sync + fmt::Debug {
    fn as_any(&self) -> &dyn Any;

    fn eq_data(&self, other: &dyn PropData) -> bool;
}

impl<T> PropData for T
where
    T: Any + Send + Sync + PartialEq + fmt::Debug,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_data(&self, other: &dyn PropData) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }
}

/// A data prop, stored exactly as it was given.
///
/// Values keep their Rust type: floats stay floats (including `inf` and
/// `NaN`), and structs reach the component without being converted. Read
/// them back with [`PropValue::downcast_ref`] or [`Props::get`].
///
/// String slices are stored as owned `String`s, and wrapping a `PropValue`
/// again returns it unchanged.
#[derive(Clone)]
pub struct PropValue(Arc<dyn PropData>);

impl PropValue {
    /// Wrap a value.
    pub fn new<T>(value: T) -> Self
    where
        T: Any + Send + Sync + PartialEq + fmt::Debug,
    {
        let erased = &value as &dyn Any;
        if let Some(text) = erased.downcast_ref::<&'static str>() {
            return Self(Arc::new(text.to_string()));
        }
        if let Some(inner) = erased.downcast_ref::<PropValue>() {
            return inner.clone();
        }
        Self(Arc::new(value))
    }

    /// Wrap an already shared value without cloning it.
    ///
    /// The prop reads back as `T`, not as `Arc<T>`.
    pub fn shared<T>(value: Arc<T>) -> Self
    where
        T: Any + Send + Sync + PartialEq + fmt::Debug,
    {
        Self(value)
    }

    /// The value, if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Whether the value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.0.as_any().is::<T>()
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.eq_data(&*other.0)
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

/// A single prop: plain data or a callback.
#[derive(Clone, Debug, PartialEq)]
pub enum Prop {
    Value(PropValue),
    Callback(Callback),
}

impl From<Callback> for Prop {
    fn from(callback: Callback) -> Self {
        Prop::Callback(callback)
    }
}

impl From<PropValue> for Prop {
    fn from(value: PropValue) -> Self {
        Prop::Value(value)
    }
}

macro_rules! prop_from_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Prop {
                fn from(value: $ty) -> Self {
                    Prop::Value(PropValue::new(value))
                }
            }
        )*
    };
}

prop_from_value!(Value, &'static str, String, bool, i32, i64, u32, u64, usize, f64);

/// The props record handed to a component.
///
/// Keys are prop names. Merging is shallow: a later source replaces the
/// whole value of a colliding key.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props {
    entries: BTreeMap<String, Prop>,
}

impl Props {
    /// Create an empty props record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Props::insert`] for data values.
    ///
    /// The value is stored as given; read it back as the same type with
    /// [`Props::get`]. A [`Callback`] is stored as a callback prop.
    pub fn with<T>(mut self, key: impl Into<String>, value: T) -> Self
    where
        T: Any + Send + Sync + PartialEq + fmt::Debug,
    {
        let callback = (&value as &dyn Any).downcast_ref::<Callback>().cloned();
        match callback {
            Some(callback) => self.insert(key, Prop::Callback(callback)),
            None => self.insert(key, PropValue::new(value)),
        };
        self
    }

    /// Builder form of [`Props::insert`] for a value that is already shared,
    /// such as a state snapshot. The prop reads back as `T`.
    pub fn with_shared<T>(mut self, key: impl Into<String>, value: Arc<T>) -> Self
    where
        T: Any + Send + Sync + PartialEq + fmt::Debug,
    {
        self.insert(key, PropValue::shared(value));
        self
    }

    /// Builder form of [`Props::insert`] for callbacks.
    pub fn with_callback<F>(mut self, key: impl Into<String>, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.insert(key, Prop::Callback(Callback::new(f)));
        self
    }

    /// Set a prop, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, prop: impl Into<Prop>) -> Option<Prop> {
        self.entries.insert(key.into(), prop.into())
    }

    /// Remove a prop, returning it.
    pub fn remove(&mut self, key: &str) -> Option<Prop> {
        self.entries.remove(key)
    }

    /// The raw prop under `key`, data or callback.
    pub fn prop(&self, key: &str) -> Option<&Prop> {
        self.entries.get(key)
    }

    /// The data value of a prop, if it is one.
    pub fn value(&self, key: &str) -> Option<&PropValue> {
        match self.entries.get(key)? {
            Prop::Value(value) => Some(value),
            Prop::Callback(_) => None,
        }
    }

    /// The data prop under `key`, if it holds a `T`.
    ///
    /// Returns `None` for absent keys, callbacks, and values of another type.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.value(key)?.downcast_ref::<T>()
    }

    /// The string value of a prop, if it is one.
    pub fn str(&self, key: &str) -> Option<&str> {
        self.get::<String>(key).map(String::as_str)
    }

    /// Deserialize a JSON prop into `T`.
    ///
    /// Only props holding a [`serde_json::Value`] are converted; use
    /// [`Props::get`] for everything else. Returns `None` for absent keys,
    /// callbacks, non-JSON values and JSON of another shape.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        serde_json::from_value(self.get::<Value>(key)?.clone()).ok()
    }

    /// The callback stored under `key`, if it is one.
    pub fn callback(&self, key: &str) -> Option<&Callback> {
        match self.entries.get(key)? {
            Prop::Callback(callback) => Some(callback),
            Prop::Value(_) => None,
        }
    }

    /// Whether a prop is set under `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Prop names in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Props in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Prop)> {
        self.entries.iter().map(|(key, prop)| (key.as_str(), prop))
    }

    /// Number of props.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no props are set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Overlay `other` onto this record; keys from `other` win.
    pub fn extend(&mut self, other: Props) {
        self.entries.extend(other.entries);
    }

    /// Shallow merge in fixed precedence: own < state < dispatch.
    pub fn merge(own: Props, state: Props, dispatch: Props) -> Props {
        let mut merged = own;
        merged.extend(state);
        merged.extend(dispatch);
        merged
    }
}

impl<K: Into<String>, P: Into<Prop>> FromIterator<(K, P)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, P)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, prop)| (key.into(), prop.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn builder_and_accessors() {
        let props = Props::new()
            .with("name", "John")
            .with("size", 45)
            .with_callback("on_edit", || {});

        assert_eq!(props.str("name"), Some("John"));
        assert_eq!(props.get::<String>("name").map(String::as_str), Some("John"));
        assert_eq!(props.get::<i32>("size"), Some(&45));
        assert_eq!(props.get::<u32>("size"), None);
        assert!(props.callback("on_edit").is_some());
        assert!(props.value("on_edit").is_none());
        assert!(props.callback("name").is_none());
        assert!(matches!(props.prop("on_edit"), Some(Prop::Callback(_))));
        assert_eq!(props.len(), 3);
        assert_eq!(props.keys().collect::<Vec<_>>(), ["name", "on_edit", "size"]);
    }

    #[test]
    fn merge_precedence_is_own_state_dispatch() {
        let on_edit = Callback::new(|| {});
        let own = Props::new().with("size", 45).with("name", "own");
        let state = Props::new().with("name", "John").with("color", "red");
        let dispatch: Props = [("on_edit", Prop::Callback(on_edit.clone())), ("color", Prop::from("blue"))]
            .into_iter()
            .collect();

        let merged = Props::merge(own, state, dispatch);

        assert_eq!(merged.get::<i32>("size"), Some(&45));
        assert_eq!(merged.str("name"), Some("John"));
        assert_eq!(merged.str("color"), Some("blue"));
        assert_eq!(merged.callback("on_edit"), Some(&on_edit));
        assert_eq!(merged.len(), 4);
    }

    #[test]
    fn values_keep_their_type() {
        #[derive(Debug, PartialEq)]
        struct Size {
            width: u32,
            height: u32,
        }

        let shared = Arc::new(Size {
            width: 1,
            height: 2,
        });
        let props = Props::new()
            .with("ratio", f64::INFINITY)
            .with("missing", f64::NAN)
            .with("size", Size {
                width: 3,
                height: 4,
            })
            .with_shared("shared", Arc::clone(&shared));

        assert_eq!(props.get::<f64>("ratio"), Some(&f64::INFINITY));
        assert!(props.get::<f64>("missing").is_some_and(|value| value.is_nan()));
        assert_eq!(
            props.get::<Size>("size"),
            Some(&Size {
                width: 3,
                height: 4
            })
        );
        assert!(std::ptr::eq(props.get::<Size>("shared").unwrap(), &*shared));
        assert!(props.value("size").is_some_and(PropValue::is::<Size>));
        assert_eq!(props.get_as::<f64>("ratio"), None);
    }

    #[test]
    fn equality_compares_values() {
        assert_eq!(Props::new().with("a", 1).with("b", "x"), Props::new().with("a", 1).with("b", "x"));
        assert_ne!(Props::new().with("a", 1), Props::new().with("a", 2));
        assert_ne!(Props::new().with("a", 1), Props::new().with("a", 1u64));
        assert_eq!(format!("{:?}", PropValue::new(7)), "7");
        assert_eq!(PropValue::new(PropValue::new(7)).downcast_ref::<i32>(), Some(&7));

        let on_edit = Callback::noop();
        let props = Props::new().with("on_edit", on_edit.clone());
        assert_eq!(props.callback("on_edit"), Some(&on_edit));
    }

    #[test]
    fn get_as_structured_value() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Size {
            width: u32,
            height: u32,
        }

        let props = Props::new().with("size", json!({ "width": 3, "height": 4 }));
        assert_eq!(
            props.get_as::<Size>("size"),
            Some(Size {
                width: 3,
                height: 4
            })
        );
        assert_eq!(props.get_as::<String>("size"), None);
        assert_eq!(props.get_as::<String>("missing"), None);
    }

    #[test]
    fn callback_equality_is_identity() {
        let a = Callback::noop();
        let b = a.clone();
        assert_eq!(a, b);
        assert_ne!(a, Callback::noop());
    }
}
