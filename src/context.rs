//! Shared storage for one workflow run.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

/// Type-safe context key wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextKey(String);

impl ContextKey {
    /// Creates a new ContextKey.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ContextKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ContextKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::borrow::Borrow<str> for ContextKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A map of heterogeneous values keyed by string.
///
/// Values of any `Send + Sync` type are stored boxed and read back by
/// downcasting. Asking for the wrong type reads as absent.
///
/// # Examples
///
/// ```
/// use ayumi::ValueMap;
///
/// let state = ValueMap::new()
///     .with("n_messages", 4000u32)
///     .with("success", true);
///
/// assert_eq!(state.get::<u32>("n_messages"), Some(&4000));
/// assert_eq!(state.get::<bool>("success"), Some(&true));
/// assert_eq!(state.get::<String>("success"), None);
/// ```
#[derive(Default)]
pub struct ValueMap {
    data: HashMap<ContextKey, Box<dyn Any + Send + Sync>>,
}

impl fmt::Debug for ValueMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueMap")
            .field("keys", &self.data.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ValueMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with<T: Any + Send + Sync>(mut self, key: impl Into<ContextKey>, value: T) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts a value, replacing any previous value under `key`.
    pub fn insert<T: Any + Send + Sync>(&mut self, key: impl Into<ContextKey>, value: T) {
        self.data.insert(key.into(), Box::new(value));
    }

    /// Returns a reference to the value for `key` if it holds a `T`.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.data.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    /// Returns a mutable reference to the value for `key` if it holds a `T`.
    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.data.get_mut(key).and_then(|v| v.downcast_mut::<T>())
    }

    /// Removes a value by key and returns it if it holds a `T`.
    pub fn remove<T: Any>(&mut self, key: &str) -> Option<T> {
        self.data
            .remove(key)
            .and_then(|v| v.downcast::<T>().ok())
            .map(|b| *b)
    }

    /// Returns `true` if `key` holds a value of any type.
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Returns an iterator over all keys.
    pub fn keys(&self) -> impl Iterator<Item = &ContextKey> {
        self.data.keys()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Storage shared by every step of a run.
///
/// Two independent namespaces: a persistent *store* updated one key at a
/// time, and an ephemeral *state* that is only ever replaced as a whole.
pub trait ContextStore {
    /// Inserts or overwrites `key` in the store.
    fn store_value<T: Any + Send + Sync>(&mut self, key: impl Into<ContextKey>, value: T);

    /// Reads `key` from the store. Absent keys and type mismatches are `None`.
    fn get_value<T: Any>(&self, key: &str) -> Option<&T>;

    /// The current state.
    fn state(&self) -> &ValueMap;

    /// Replaces the state. Nothing from the previous state survives.
    fn set_state(&mut self, state: ValueMap);
}

/// The base [`ContextStore`].
///
/// # Examples
///
/// ```
/// use ayumi::{Context, ContextStore, ValueMap};
///
/// let mut ctx = Context::new(ValueMap::new(), ValueMap::new().with("iterations", 3u32));
///
/// ctx.store_value("api_credit", 200u32);
/// assert_eq!(ctx.get_value::<u32>("api_credit"), Some(&200));
///
/// ctx.set_state(ValueMap::new().with("done", true));
/// assert_eq!(ctx.state().get::<bool>("done"), Some(&true));
/// assert!(!ctx.state().contains_key("iterations"));
/// ```
pub struct Context {
    store: ValueMap,
    state: ValueMap,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("store", &self.store)
            .field("state", &self.state)
            .finish()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(ValueMap::new(), ValueMap::new())
    }
}

impl Context {
    /// Creates a context from an initial store and state.
    pub fn new(store: ValueMap, state: ValueMap) -> Self {
        Self { store, state }
    }

    /// The persistent store.
    pub fn store(&self) -> &ValueMap {
        &self.store
    }

    /// Mutable access to the persistent store.
    ///
    /// Writes here land in the store only, exactly like
    /// [`ContextStore::store_value`].
    pub fn store_mut(&mut self) -> &mut ValueMap {
        &mut self.store
    }

    /// Takes the current state out, leaving an empty one behind.
    pub fn take_state(&mut self) -> ValueMap {
        std::mem::take(&mut self.state)
    }
}

impl ContextStore for Context {
    fn store_value<T: Any + Send + Sync>(&mut self, key: impl Into<ContextKey>, value: T) {
        self.store.insert(key, value);
    }

    fn get_value<T: Any>(&self, key: &str) -> Option<&T> {
        self.store.get(key)
    }

    fn state(&self) -> &ValueMap {
        &self.state
    }

    fn set_state(&mut self, state: ValueMap) {
        self.state = state;
    }
}
