//! Header include bookkeeping
//!
//! Every generation run owns one [`IncludeSet`] and threads it through the
//! type mapper and member generators, so nothing is shared between runs.

use serde::Serialize;
use std::collections::BTreeSet;

/// Includes every generated interface header needs
pub const INTERFACE_H_INCLUDES: &[&str] = &[
    "bindings/v8/V8Binding.h",
    "bindings/v8/V8DOMWrapper.h",
    "bindings/v8/WrapperTypeInfo.h",
    "heap/Handle.h",
];

/// Includes every generated interface implementation needs
pub const INTERFACE_CPP_INCLUDES: &[&str] = &[
    "RuntimeEnabledFeatures.h",
    "bindings/v8/ExceptionState.h",
    "bindings/v8/V8DOMConfiguration.h",
    "bindings/v8/V8HiddenValue.h",
    "bindings/v8/V8ObjectConstructor.h",
    "core/dom/ContextFeatures.h",
    "core/dom/Document.h",
    "platform/TraceEvent.h",
    "wtf/GetPtr.h",
    "wtf/RefPtr.h",
];

pub const CALLBACK_INTERFACE_H_INCLUDES: &[&str] = &[
    "bindings/v8/ActiveDOMCallback.h",
    "bindings/v8/DOMWrapperWorld.h",
    "bindings/v8/ScopedPersistent.h",
];

pub const CALLBACK_INTERFACE_CPP_INCLUDES: &[&str] = &[
    "bindings/v8/V8Binding.h",
    "bindings/v8/V8Callback.h",
    "core/dom/ExecutionContext.h",
    "wtf/Assertions.h",
    "wtf/GetPtr.h",
    "wtf/RefPtr.h",
];

/// Types whose includes do not follow the `V8<Name>.h` convention
pub fn special_includes(base_type: &str) -> Option<&'static [&'static str]> {
    let includes: &'static [&'static str] = match base_type {
        "object" | "CompareHow" => &[],
        "Dictionary" => &["bindings/v8/Dictionary.h"],
        "EventHandler" => &[
            "bindings/v8/V8AbstractEventListener.h",
            "bindings/v8/V8EventListenerList.h",
        ],
        "EventListener" => &[
            "bindings/v8/BindingSecurity.h",
            "bindings/v8/V8EventListenerList.h",
            "core/frame/DOMWindow.h",
        ],
        "MediaQueryListListener" => &["core/css/MediaQueryListListener.h"],
        "Promise" => &["bindings/v8/ScriptPromise.h"],
        "SerializedScriptValue" => &["bindings/v8/SerializedScriptValue.h"],
        "ScriptValue" => &["bindings/v8/ScriptValue.h"],
        _ => return None,
    };
    Some(includes)
}

/// Sorted, de-duplicated set of include paths
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IncludeSet {
    includes: BTreeSet<String>,
}

impl IncludeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a set from a constant table
    pub fn from_static(includes: &[&str]) -> Self {
        let mut set = Self::new();
        set.extend(includes.iter().copied());
        set
    }

    pub fn add(&mut self, include: impl Into<String>) {
        self.includes.insert(include.into());
    }

    pub fn extend<I, S>(&mut self, includes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.includes.extend(includes.into_iter().map(Into::into));
    }

    pub fn contains(&self, include: &str) -> bool {
        self.includes.contains(include)
    }

    pub fn len(&self) -> usize {
        self.includes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.includes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.includes.iter()
    }

    pub fn into_sorted_vec(self) -> Vec<String> {
        self.includes.into_iter().collect()
    }
}

impl FromIterator<String> for IncludeSet {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self {
            includes: iter.into_iter().collect(),
        }
    }
}
