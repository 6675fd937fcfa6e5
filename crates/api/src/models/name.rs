use crate::error::{ApiError, ApiResult};
use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::borrow::Cow;
use std::fmt;

/// Dot separated name of a package or declaration.
///
/// The root package is the empty name. Names are compared structurally, so
/// `a.b` parsed twice yields equal, equally hashed values.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QualifiedName(SmolStr);

impl QualifiedName {
    pub fn root() -> Self {
        Self(SmolStr::default())
    }

    /// Parse a dotted name. The empty string is the root package. Every
    /// segment must be an identifier, so `a..b`, `a. b` and `a b` are
    /// rejected.
    pub fn parse(text: &str) -> ApiResult<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Self::root());
        }
        if !text.split('.').all(is_identifier) {
            return Err(ApiError::InvalidArgument(format!(
                "malformed qualified name `{}`",
                text
            )));
        }
        Ok(Self(SmolStr::new(text)))
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Drop the last segment. The root has no parent.
    pub fn parent(&self) -> Option<QualifiedName> {
        if self.is_root() {
            return None;
        }
        match self.0.rsplit_once('.') {
            Some((parent, _)) => Some(Self(SmolStr::new(parent))),
            None => Some(Self::root()),
        }
    }

    pub fn child(&self, segment: &str) -> QualifiedName {
        if self.is_root() {
            Self(SmolStr::new(segment))
        } else {
            Self(SmolStr::new(format!("{}.{}", self.0, segment)))
        }
    }

    /// Last segment, empty for the root.
    pub fn short_name(&self) -> &str {
        match self.0.rsplit_once('.') {
            Some((_, last)) => last,
            None => &self.0,
        }
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.').filter(|s| !s.is_empty())
    }

    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// `self` followed by every parent up to and including the root.
    pub fn ancestors(&self) -> Ancestors {
        Ancestors {
            next: Some(self.clone()),
        }
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

pub struct Ancestors {
    next: Option<QualifiedName>,
}

impl Iterator for Ancestors {
    type Item = QualifiedName;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.parent();
        Some(current)
    }
}

impl TryFrom<String> for QualifiedName {
    type Error = ApiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for QualifiedName {
    type Error = ApiError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl std::str::FromStr for QualifiedName {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<QualifiedName> for String {
    fn from(value: QualifiedName) -> Self {
        value.0.to_string()
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("<root>")
        } else {
            f.write_str(&self.0)
        }
    }
}

impl fmt::Debug for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QualifiedName({})", self)
    }
}

impl JsonSchema for QualifiedName {
    fn schema_name() -> Cow<'static, str> {
        "QualifiedName".into()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        String::json_schema(generator)
    }
}
