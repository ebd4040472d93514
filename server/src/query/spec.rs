//! Assembled query specification handed to the data layer

use serde::{Deserialize, Serialize};

use super::restriction::Restriction;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    /// Case-insensitive `asc` / `desc`
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("asc") {
            Some(Self::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Some(Self::Desc)
        } else {
            None
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortKey {
    pub field: String,
    pub direction: OrderDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JoinType {
    LeftJoin,
    InnerJoin,
}

/// Join path exposed to filters under a short name, e.g.
/// `ipInterfaces` as `ipInterface`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Alias {
    pub path: &'static str,
    pub alias: &'static str,
    pub join: JoinType,
}

/// Per-entity starting point for assembly
#[derive(Debug, Clone, Copy)]
pub struct EntityDefaults {
    pub order: &'static [(&'static str, OrderDirection)],
    pub aliases: &'static [Alias],
}

impl EntityDefaults {
    pub fn sort_keys(&self) -> Vec<SortKey> {
        self.order
            .iter()
            .map(|(field, direction)| SortKey {
                field: field.to_string(),
                direction: *direction,
            })
            .collect()
    }
}

/// Caller-validated search parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Raw filter expression, empty for match-all
    pub query: String,
    pub limit: u32,
    pub offset: u32,
    /// Empty keeps the entity's default ordering
    pub order_by: String,
    pub direction: OrderDirection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuerySpec {
    /// `None` matches every row
    pub restriction: Option<Restriction>,
    /// First key is the primary sort
    pub order: Vec<SortKey>,
    pub limit: u32,
    pub offset: u32,
    pub aliases: Vec<Alias>,
}

impl QuerySpec {
    pub fn alias(&self, name: &str) -> Option<&Alias> {
        self.aliases.iter().find(|a| a.alias == name)
    }
}
