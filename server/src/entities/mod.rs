//! Searchable entity kinds
//!
//! Each kind carries a static [`EntityProfile`]: the fields whose literals
//! need typed coercion and the default ordering/aliases used when a search
//! does not override them. Profiles are immutable and shared by every
//! request.

pub mod alarm;
pub mod event;
pub mod node;
pub mod notification;
pub mod outage;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::query::{CoercionTable, EntityDefaults};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Alarm,
    Event,
    Node,
    Notification,
    Outage,
}

/// Static per-entity configuration
#[derive(Debug)]
pub struct EntityProfile {
    /// Plural name used in URLs, e.g. `alarms`
    pub name: &'static str,
    pub coercion: CoercionTable,
    pub defaults: EntityDefaults,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        Self::Alarm,
        Self::Event,
        Self::Node,
        Self::Notification,
        Self::Outage,
    ];

    pub fn profile(self) -> &'static EntityProfile {
        match self {
            Self::Alarm => &alarm::PROFILE,
            Self::Event => &event::PROFILE,
            Self::Node => &node::PROFILE,
            Self::Notification => &notification::PROFILE,
            Self::Outage => &outage::PROFILE,
        }
    }

    pub fn name(self) -> &'static str {
        self.profile().name
    }

    /// Singular label for messages
    pub fn label(self) -> &'static str {
        match self {
            Self::Alarm => "Alarm",
            Self::Event => "Event",
            Self::Node => "Node",
            Self::Notification => "Notification",
            Self::Outage => "Outage",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
