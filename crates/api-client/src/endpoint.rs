//! Endpoint templates and address construction

use std::borrow::Cow;

/// Ordered parameter mapping
///
/// Keeps insertion order; inserting an existing key replaces its value in
/// place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
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
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

/// Percent-encode one URL component
pub fn encode_component(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

/// Substitute `:key` tokens in `template`
///
/// Each key replaces its first `:key` occurrence only. Substituted values are
/// percent-encoded, so they never contain `:` and later keys cannot match
/// inside them. Tokens without a parameter stay as written.
pub fn substitute_path(template: &str, path_params: &Params) -> String {
    let mut path = template.to_string();
    for (key, value) in path_params.iter() {
        let token = format!(":{key}");
        path = path.replacen(&token, &encode_component(value), 1);
    }
    path
}

/// Serialize query parameters as `key=value` pairs joined by `&`
pub fn encode_query(query: &Params) -> String {
    query
        .iter()
        .map(|(key, value)| format!("{}={}", encode_component(key), encode_component(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Build the full request address: `base + template`, plus `?query` when
/// there are query parameters
pub fn build_url(base: &str, template: &str, path_params: &Params, query: &Params) -> String {
    let mut url = format!("{base}{}", substitute_path(template, path_params));
    if !query.is_empty() {
        url.push('?');
        url.push_str(&encode_query(query));
    }
    url
}
