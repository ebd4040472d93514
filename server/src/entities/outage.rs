//! Outage search profile

use super::EntityProfile;
use crate::query::{CoercionRule, EntityDefaults, OrderDirection};

pub static PROFILE: EntityProfile = EntityProfile {
    name: "outages",
    coercion: &[
        ("ifLostService", CoercionRule::Timestamp),
        ("ifRegainedService", CoercionRule::Timestamp),
        ("suppressTime", CoercionRule::Timestamp),
        ("id", CoercionRule::Integer),
    ],
    defaults: EntityDefaults {
        order: &[("id", OrderDirection::Desc)],
        aliases: &[],
    },
};
