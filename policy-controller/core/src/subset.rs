use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

/// A set of tags identifying a slice of traffic, e.g. a service at a given version.
///
/// Tags are held in a sorted map so that two elements built from the same tags in a different
/// order compare (and hash) equal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Element(BTreeMap<String, String>);

/// A single tag selector.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct Tag {
    pub key: String,
    pub value: String,

    /// Inverts the selector so that it matches elements that do _not_ carry `key=value`.
    #[serde(default)]
    pub not: bool,
}

/// A conjunction of tag selectors.
///
/// Selectors are kept sorted and deduplicated so that equality does not depend on the order in
/// which a policy author listed them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Subset(Vec<Tag>);

// === impl Element ===

impl Element {
    /// Builds the element that identifies a service by name.
    pub fn service(name: impl ToString) -> Self {
        Self::default().with(crate::SERVICE_TAG, name)
    }

    pub fn with(mut self, key: impl ToString, value: impl ToString) -> Self {
        self.0.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn service_name(&self) -> Option<&str> {
        self.get(crate::SERVICE_TAG)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns a copy of this element with `other`'s tags added wherever this element does not
    /// already define the key.
    pub fn merged_over(&self, other: &Element) -> Self {
        let mut tags = other.0.clone();
        tags.extend(self.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self(tags)
    }
}

impl<K: ToString, V: ToString> FromIterator<(K, V)> for Element {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, String>> for Element {
    fn from(tags: BTreeMap<String, String>) -> Self {
        Self(tags)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (k, v) in self.iter() {
            if !first {
                f.write_str(",")?;
            }
            first = false;
            write!(f, "{}={}", k, v)?;
        }
        Ok(())
    }
}

// === impl Tag ===

impl Tag {
    pub fn new(key: impl ToString, value: impl ToString) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
            not: false,
        }
    }

    pub fn negated(key: impl ToString, value: impl ToString) -> Self {
        Self {
            not: true,
            ..Self::new(key, value)
        }
    }

    fn matches(&self, element: &Element) -> bool {
        let carries = element.get(&self.key) == Some(self.value.as_str());
        carries != self.not
    }
}

// === impl Subset ===

impl Subset {
    /// The subset that selects every element.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn is_all(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns true if every selector is satisfied by `element`.
    pub fn matches(&self, element: &Element) -> bool {
        self.0.iter().all(|tag| tag.matches(element))
    }

    /// The number of selectors. A subset with more selectors is more specific.
    pub fn specificity(&self) -> usize {
        self.0.len()
    }

    pub fn tags(&self) -> &[Tag] {
        &self.0
    }
}

impl FromIterator<Tag> for Subset {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        let mut tags = iter.into_iter().collect::<Vec<_>>();
        tags.sort();
        tags.dedup();
        Self(tags)
    }
}

impl<'de> Deserialize<'de> for Subset {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let tags = Vec::<Tag>::deserialize(deserializer)?;
        Ok(tags.into_iter().collect())
    }
}
