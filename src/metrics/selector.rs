use std::fmt;

use crate::error::ThresholdError;

use super::Tags;

/// A metric name plus an optional tag filter, written `name{tag:value,...}`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MetricKey {
    pub name: String,
    pub filter: Vec<(String, String)>,
}

impl MetricKey {
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            filter: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        self.filter.push((key.to_owned(), value.to_owned()));
        self.filter.sort();
        self
    }

    #[must_use]
    pub fn is_submetric(&self) -> bool {
        !self.filter.is_empty()
    }

    /// A sample belongs to this key when its metric name matches and every
    /// filter pair is present in its tags.
    #[must_use]
    pub fn matches(&self, metric: &str, tags: &Tags) -> bool {
        self.name == metric
            && self
                .filter
                .iter()
                .all(|(key, value)| tags.get(key).is_some_and(|tag| tag == value))
    }
}

impl std::str::FromStr for MetricKey {
    type Err = ThresholdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ThresholdError::InvalidSelector {
            selector: s.to_owned(),
        };
        let trimmed = s.trim();
        let Some((name, rest)) = trimmed.split_once('{') else {
            if trimmed.is_empty() || trimmed.contains('}') {
                return Err(invalid());
            }
            return Ok(Self::named(trimmed));
        };
        let name = name.trim();
        let body = rest.strip_suffix('}').ok_or_else(invalid)?;
        if name.is_empty() || body.contains('{') || body.contains('}') {
            return Err(invalid());
        }
        let mut key = Self::named(name);
        for pair in body.split(',').filter(|pair| !pair.trim().is_empty()) {
            let (tag, value) = pair.split_once(':').ok_or_else(invalid)?;
            let (tag, value) = (tag.trim(), value.trim());
            if tag.is_empty() {
                return Err(invalid());
            }
            key = key.with_tag(tag, value);
        }
        Ok(key)
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.filter.is_empty() {
            return Ok(());
        }
        f.write_str("{")?;
        for (idx, (key, value)) in self.filter.iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}:{}", key, value)?;
        }
        f.write_str("}")
    }
}
