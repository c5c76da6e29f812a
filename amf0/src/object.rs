use crate::Amf0Value;
use std::iter::FromIterator;

/// The properties of an AMF0 object or ECMA array, in insertion order.
///
/// Lookups are linear.  Command and metadata objects only carry a handful of
/// properties, and keeping the wire order matters more than lookup speed.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Amf0Object {
    properties: Vec<(String, Amf0Value)>,
}

impl Amf0Object {
    pub fn new() -> Self {
        Amf0Object {
            properties: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Amf0Object {
            properties: Vec::with_capacity(capacity),
        }
    }

    /// Sets a property.  If the name already exists its value is replaced without changing
    /// its position, and the previous value is returned.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Amf0Value>) -> Option<Amf0Value> {
        let name = name.into();
        let value = value.into();
        match self.properties.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.properties.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Amf0Value> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Amf0Value::as_str)
    }

    pub fn get_number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Amf0Value::as_number)
    }

    pub fn get_boolean(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Amf0Value::as_boolean)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<Amf0Value> {
        let index = self.properties.iter().position(|(key, _)| key == name)?;
        Some(self.properties.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Amf0Value)> {
        self.properties
            .iter()
            .map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(|(key, _)| key.as_str())
    }
}

impl<K: Into<String>, V: Into<Amf0Value>> FromIterator<(K, V)> for Amf0Object {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut object = Amf0Object::new();
        for (name, value) in iter {
            object.insert(name, value);
        }

        object
    }
}

impl IntoIterator for Amf0Object {
    type Item = (String, Amf0Value);
    type IntoIter = std::vec::IntoIter<(String, Amf0Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.properties.into_iter()
    }
}
