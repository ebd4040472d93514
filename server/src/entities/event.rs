//! Event search profile

use super::EntityProfile;
use crate::query::{CoercionRule, EntityDefaults, LookupTarget, OrderDirection};

pub static PROFILE: EntityProfile = EntityProfile {
    name: "events",
    coercion: &[
        ("eventCreateTime", CoercionRule::Timestamp),
        ("eventTime", CoercionRule::Timestamp),
        ("eventAckTime", CoercionRule::Timestamp),
        ("eventId", CoercionRule::Integer),
        ("eventSeverity", CoercionRule::Integer),
        ("nodeId", CoercionRule::Lookup(LookupTarget::Node)),
    ],
    defaults: EntityDefaults {
        order: &[("eventTime", OrderDirection::Asc)],
        aliases: &[],
    },
};
