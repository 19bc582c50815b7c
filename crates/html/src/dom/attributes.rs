//! Element attribute storage.

use smallvec::SmallVec;

/// One attribute. A `None` value is a boolean attribute (`<input disabled>`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    key: String,
    value: Option<String>,
}

impl Attribute {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }

    pub fn boolean(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The value; boolean attributes read as the empty string.
    pub fn value(&self) -> &str {
        self.value.as_deref().unwrap_or_default()
    }

    pub const fn is_boolean(&self) -> bool {
        self.value.is_none()
    }
}

/// Ordered attribute map with ASCII case-insensitive keys.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: SmallVec<[Attribute; 4]>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|attr| attr.key.eq_ignore_ascii_case(key))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_attribute(key).map(Attribute::value)
    }

    pub fn get_attribute(&self, key: &str) -> Option<&Attribute> {
        self.position(key).and_then(|index| self.entries.get(index))
    }

    pub fn has(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    /// True if any key starts with `prefix` (case-insensitive).
    pub fn has_key_with_prefix(&self, prefix: &str) -> bool {
        self.entries.iter().any(|attr| {
            attr.key
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        })
    }

    /// Set a value. An existing key keeps its position and spelling.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.put(Attribute {
            key: key.to_owned(),
            value: Some(value.into()),
        });
    }

    /// Set a boolean (valueless) attribute.
    pub fn set_boolean(&mut self, key: &str) {
        self.put(Attribute::boolean(key));
    }

    /// Insert `attr`, replacing the value of an existing entry with the same key.
    pub fn put(&mut self, attr: Attribute) {
        match self.position(&attr.key) {
            Some(index) => {
                if let Some(existing) = self.entries.get_mut(index) {
                    existing.value = attr.value;
                }
            }
            None => self.entries.push(attr),
        }
    }

    /// Add `attr` only if no attribute with that key exists yet.
    pub fn put_if_absent(&mut self, attr: Attribute) {
        if !self.has(&attr.key) {
            self.entries.push(attr);
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Attribute> {
        self.position(key).map(|index| self.entries.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `data-*` attributes with the prefix stripped.
    pub fn dataset(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|attr| {
            let rest = attr.key.strip_prefix("data-")?;
            Some((rest, attr.value()))
        })
    }
}

impl FromIterator<Attribute> for Attributes {
    fn from_iter<I: IntoIterator<Item = Attribute>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for attr in iter {
            attrs.put(attr);
        }
        attrs
    }
}

impl<'attrs> IntoIterator for &'attrs Attributes {
    type Item = &'attrs Attribute;
    type IntoIter = core::slice::Iter<'attrs, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Keys are matched without regard to ASCII case.
    ///
    /// # Panics
    /// Panics if a differently-cased lookup misses.
    #[test]
    fn case_insensitive_keys() {
        let mut attrs = Attributes::new();
        attrs.set("Data-X", "1");
        assert_eq!(attrs.get("data-x"), Some("1"));
        assert!(attrs.has("DATA-X"));
        attrs.set("data-x", "2");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get_attribute("data-x").map(Attribute::key), Some("Data-X"));
        assert_eq!(attrs.get("data-x"), Some("2"));
    }

    /// Replacing a value keeps insertion order.
    ///
    /// # Panics
    /// Panics if the order changes.
    #[test]
    fn order_is_preserved() {
        let mut attrs = Attributes::new();
        attrs.set("a", "1");
        attrs.set("b", "2");
        attrs.set("c", "3");
        attrs.set("a", "4");
        let keys: Vec<&str> = attrs.iter().map(Attribute::key).collect();
        assert_eq!(keys, ["a", "b", "c"]);
        assert_eq!(attrs.remove("b").map(|attr| attr.value().to_owned()), Some("2".to_owned()));
        let keys: Vec<&str> = attrs.iter().map(Attribute::key).collect();
        assert_eq!(keys, ["a", "c"]);
    }

    /// Boolean attributes are present and read as empty.
    ///
    /// # Panics
    /// Panics if the boolean marker is lost.
    #[test]
    fn boolean_attribute() {
        let mut attrs = Attributes::new();
        attrs.set_boolean("disabled");
        assert!(attrs.has("disabled"));
        assert_eq!(attrs.get("disabled"), Some(""));
        assert!(attrs.get_attribute("disabled").is_some_and(Attribute::is_boolean));
        attrs.set("disabled", "disabled");
        assert!(!attrs.get_attribute("disabled").is_some_and(Attribute::is_boolean));
    }

    /// Prefix queries and the dataset view.
    ///
    /// # Panics
    /// Panics if a data attribute is missed.
    #[test]
    fn prefixes_and_dataset() {
        let attrs: Attributes = [
            Attribute::new("data-name", "jo"),
            Attribute::new("href", "/x"),
            Attribute::new("data-id", "7"),
        ]
        .into_iter()
        .collect();
        assert!(attrs.has_key_with_prefix("DATA-"));
        assert!(!attrs.has_key_with_prefix("aria-"));
        let data: Vec<(&str, &str)> = attrs.dataset().collect();
        assert_eq!(data, [("name", "jo"), ("id", "7")]);
    }
}
