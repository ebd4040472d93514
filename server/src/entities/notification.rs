//! Notification search profile

use super::EntityProfile;
use crate::query::{CoercionRule, EntityDefaults, OrderDirection};

pub static PROFILE: EntityProfile = EntityProfile {
    name: "notifications",
    coercion: &[
        ("pageTime", CoercionRule::Timestamp),
        ("respondTime", CoercionRule::Timestamp),
        ("id", CoercionRule::Integer),
    ],
    defaults: EntityDefaults {
        order: &[("notifyId", OrderDirection::Desc)],
        aliases: &[],
    },
};
