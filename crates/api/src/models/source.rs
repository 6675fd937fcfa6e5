use super::declaration::DeclarationStub;
use super::ids::{FileId, SourceUnitId};
use super::name::QualifiedName;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Source,
    Script,
    Binary,
}

/// Handle to a file known to the search index.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileHandle {
    pub id: FileId,
    pub path: PathBuf,
    pub kind: FileKind,
}

/// An already parsed unit of source that the index has not seen yet, such
/// as an unsaved editor buffer.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, JsonSchema)]
pub struct SourceUnit {
    pub id: SourceUnitId,
    pub display_name: String,
    /// False for virtual buffers with no backing file.
    pub is_physical: bool,
    pub modification_stamp: u64,
    pub package: QualifiedName,
    #[serde(default)]
    pub declarations: Vec<DeclarationStub>,
}
