//! Table-level descriptors: composite unique constraints, indexes and the
//! table schema itself.

use serde::{Deserialize, Serialize};

use crate::schema::column::Column;

/// A `UNIQUE (a, b, ...)` table constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueConstraint {
    pub columns: Vec<String>,
}

/// A named index, emitted as a separate `CREATE INDEX` statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
}

/// One entry in a table declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Member {
    Column(Column),
    Unique(UniqueConstraint),
    Index(Index),
}

impl From<Column> for Member {
    fn from(col: Column) -> Self {
        Member::Column(col)
    }
}

impl From<UniqueConstraint> for Member {
    fn from(constraint: UniqueConstraint) -> Self {
        Member::Unique(constraint)
    }
}

impl From<Index> for Member {
    fn from(index: Index) -> Self {
        Member::Index(index)
    }
}

/// A table declaration.
///
/// Indexes can be declared two ways: inline as [`Member::Index`] or through the
/// separate `indexes` list. Both are honored; [`TableSchema::all_indexes`]
/// yields inline ones first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indexes: Vec<Index>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            indexes: Vec::new(),
        }
    }

    pub fn member(mut self, member: impl Into<Member>) -> Self {
        self.members.push(member.into());
        self
    }

    /// Adds an entry to the separate `indexes` list.
    pub fn with_index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.members.iter().filter_map(|m| match m {
            Member::Column(col) => Some(col),
            _ => None,
        })
    }

    pub fn unique_constraints(&self) -> impl Iterator<Item = &UniqueConstraint> {
        self.members.iter().filter_map(|m| match m {
            Member::Unique(u) => Some(u),
            _ => None,
        })
    }

    /// Inline index members followed by the `indexes` list.
    pub fn all_indexes(&self) -> impl Iterator<Item = &Index> {
        self.members
            .iter()
            .filter_map(|m| match m {
                Member::Index(idx) => Some(idx),
                _ => None,
            })
            .chain(self.indexes.iter())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns().find(|c| c.name == name)
    }
}

pub fn table<I, M>(name: impl Into<String>, members: I) -> TableSchema
where
    I: IntoIterator<Item = M>,
    M: Into<Member>,
{
    TableSchema {
        name: name.into(),
        members: members.into_iter().map(Into::into).collect(),
        indexes: Vec::new(),
    }
}

/// Composite uniqueness across `columns`.
pub fn unique<I, S>(columns: I) -> UniqueConstraint
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    UniqueConstraint {
        columns: columns.into_iter().map(Into::into).collect(),
    }
}

pub fn index<I, S>(name: impl Into<String>, columns: I, unique: bool) -> Index
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Index {
        name: name.into(),
        columns: columns.into_iter().map(Into::into).collect(),
        unique,
    }
}
