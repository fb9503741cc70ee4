use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Keys the application reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    W,
    A,
    S,
    D,
    Q,
    E,
    Space,
    LeftShift,
    RightShift,
    Tab,
    Escape,
    F1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// A discrete, high-level command triggered by a key press.
///
/// The app consumes actions, never raw key events, so bindings can be
/// changed in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Close the window and exit.
    Quit,
    /// Show or hide the editor UI.
    ToggleUi,
    /// Switch to the next camera.
    CycleCamera,
}

/// Key to action mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    map: HashMap<Key, Action>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut bindings = Self {
            map: HashMap::new(),
        };
        bindings.bind(Key::Escape, Action::Quit);
        bindings.bind(Key::F1, Action::ToggleUi);
        bindings.bind(Key::Tab, Action::CycleCamera);
        bindings
    }
}

impl KeyBindings {
    /// Bindings with nothing bound.
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Bind `key`, replacing any previous action for it.
    pub fn bind(&mut self, key: Key, action: Action) -> Option<Action> {
        let previous = self.map.insert(key, action);
        if let Some(previous) = previous.filter(|p| *p != action) {
            tracing::debug!(?key, ?previous, ?action, "key rebound");
        }
        previous
    }

    pub fn unbind(&mut self, key: Key) -> Option<Action> {
        self.map.remove(&key)
    }

    pub fn action_for(&self, key: Key) -> Option<Action> {
        self.map.get(&key).copied()
    }

    /// Keys bound to `action`.
    pub fn keys_for(&self, action: Action) -> impl Iterator<Item = Key> + '_ {
        self.map
            .iter()
            .filter(move |(_, a)| **a == action)
            .map(|(k, _)| *k)
    }
}
