use super::ids::{FileId, SourceUnitId};
use super::name::QualifiedName;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    Class,
    Interface,
    Object,
    Enum,
    Annotation,
    Function,
    Property,
    TypeAlias,
}

impl DeclarationKind {
    /// Kinds that open a member scope of their own.
    pub fn is_class_like(&self) -> bool {
        matches!(
            self,
            DeclarationKind::Class
                | DeclarationKind::Interface
                | DeclarationKind::Object
                | DeclarationKind::Enum
                | DeclarationKind::Annotation
        )
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeclarationKind::Class => "class",
            DeclarationKind::Interface => "interface",
            DeclarationKind::Object => "object",
            DeclarationKind::Enum => "enum",
            DeclarationKind::Annotation => "annotation",
            DeclarationKind::Function => "function",
            DeclarationKind::Property => "property",
            DeclarationKind::TypeAlias => "typealias",
        };
        f.write_str(s)
    }
}

/// A declaration as written in its container, before it is attached to one.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, JsonSchema)]
pub struct DeclarationStub {
    #[schemars(with = "String")]
    pub name: SmolStr,
    pub kind: DeclarationKind,
}

impl DeclarationStub {
    pub fn new(name: impl Into<SmolStr>, kind: DeclarationKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Where a declaration was discovered.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationOrigin {
    /// Found through the search index.
    Indexed(FileId),
    /// Held in memory by a not-yet-indexed source unit.
    Source(SourceUnitId),
    /// Read from the parsed representation of a class.
    Parsed,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Declaration {
    pub name: SmolStr,
    /// Package for top-level declarations, owning class for members.
    pub container: QualifiedName,
    pub kind: DeclarationKind,
    pub origin: DeclarationOrigin,
}

impl Declaration {
    pub fn from_stub(stub: &DeclarationStub, container: QualifiedName, origin: DeclarationOrigin) -> Self {
        Self {
            name: stub.name.clone(),
            container,
            kind: stub.kind,
            origin,
        }
    }

    pub fn fq_name(&self) -> QualifiedName {
        self.container.child(&self.name)
    }
}

/// Parsed information about one class-like declaration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct ClassLikeInfo {
    pub fq_name: QualifiedName,
    pub kind: DeclarationKind,
    #[serde(default)]
    pub members: Vec<DeclarationStub>,
}
