//! Layout engine attributes.
//!
//! Two types live here:
//!
//! - [`AttrMap`] is an insertion-ordered `key = value` map. It is what the
//!   renderer finally emits for the graph, a cluster, a node or an edge.
//! - [`RenderAttributes`] is the user-facing attribute set handed to a diagram
//!   when it is opened. It names the keys Trellis knows about (`pad`,
//!   `fontname`, `labelfontname`) and carries every other key through to the
//!   engine untouched, so engine features Trellis does not model remain
//!   reachable.
//!
//! # Example
//!
//! ```
//! use trellis_core::attributes::RenderAttributes;
//!
//! let attrs = RenderAttributes::new()
//!     .with_pad("0.5")
//!     .with_fontname("Open Sans")
//!     .with("dpi", "150");
//!
//! let map = attrs.to_attr_map();
//! let keys: Vec<&str> = map.iter().map(|(key, _)| key).collect();
//! assert_eq!(keys, ["pad", "fontname", "dpi"]);
//! ```

use indexmap::IndexMap;
use serde::Deserialize;

/// Insertion-ordered attribute map.
///
/// Setting an existing key replaces its value but keeps its original
/// position, which keeps the emitted output stable when defaults are
/// overridden.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttrMap(IndexMap<String, String>);

impl AttrMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns the value of `key`, if set.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Applies every entry of `other` on top of this map.
    pub fn merge(&mut self, other: &AttrMap) -> &mut Self {
        for (key, value) in other.iter() {
            self.set(key, value);
        }
        self
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for AttrMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Attribute set supplied when a diagram is opened.
///
/// Recognized keys get typed accessors. Anything else is kept, in order, as a
/// pass-through entry and reaches the layout engine verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RenderAttributes {
    /// Padding around the whole drawing, in inches.
    #[serde(default)]
    pad: Option<String>,

    /// Default font for labels.
    #[serde(default)]
    fontname: Option<String>,

    /// Default font for edge head/tail labels.
    #[serde(default)]
    labelfontname: Option<String>,

    #[serde(flatten)]
    passthrough: IndexMap<String, String>,
}

impl RenderAttributes {
    /// Creates an empty attribute set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pad(mut self, pad: impl Into<String>) -> Self {
        self.pad = Some(pad.into());
        self
    }

    pub fn with_fontname(mut self, fontname: impl Into<String>) -> Self {
        self.fontname = Some(fontname.into());
        self
    }

    pub fn with_labelfontname(mut self, labelfontname: impl Into<String>) -> Self {
        self.labelfontname = Some(labelfontname.into());
        self
    }

    /// Sets an arbitrary attribute.
    ///
    /// Recognized keys are routed to their typed slot; all others become
    /// pass-through entries.
    pub fn with(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        match key.as_str() {
            "pad" => self.with_pad(value),
            "fontname" => self.with_fontname(value),
            "labelfontname" => self.with_labelfontname(value),
            _ => {
                let mut attrs = self;
                attrs.passthrough.insert(key, value.into());
                attrs
            }
        }
    }

    pub fn pad(&self) -> Option<&str> {
        self.pad.as_deref()
    }

    pub fn fontname(&self) -> Option<&str> {
        self.fontname.as_deref()
    }

    pub fn labelfontname(&self) -> Option<&str> {
        self.labelfontname.as_deref()
    }

    /// Iterates the unrecognized entries in insertion order.
    pub fn passthrough(&self) -> impl Iterator<Item = (&str, &str)> {
        self.passthrough
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.pad.is_none()
            && self.fontname.is_none()
            && self.labelfontname.is_none()
            && self.passthrough.is_empty()
    }

    /// Returns these attributes layered on top of `base`.
    ///
    /// Every key set here wins; keys only present in `base` are kept.
    pub fn layered_over(self, base: RenderAttributes) -> RenderAttributes {
        let mut passthrough = base.passthrough;
        passthrough.extend(self.passthrough);
        RenderAttributes {
            pad: self.pad.or(base.pad),
            fontname: self.fontname.or(base.fontname),
            labelfontname: self.labelfontname.or(base.labelfontname),
            passthrough,
        }
    }

    /// Flattens into an [`AttrMap`]: recognized keys first, then pass-through
    /// entries.
    pub fn to_attr_map(&self) -> AttrMap {
        let mut map = AttrMap::new();
        let recognized = [
            ("pad", &self.pad),
            ("fontname", &self.fontname),
            ("labelfontname", &self.labelfontname),
        ];
        for (key, value) in recognized {
            if let Some(value) = value {
                map.set(key, value.as_str());
            }
        }
        for (key, value) in self.passthrough() {
            map.set(key, value);
        }
        map
    }
}
