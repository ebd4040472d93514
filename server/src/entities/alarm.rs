//! Alarm search profile

use super::EntityProfile;
use crate::query::{CoercionRule, EntityDefaults, OrderDirection, OrdinalDomain};

pub static PROFILE: EntityProfile = EntityProfile {
    name: "alarms",
    coercion: &[
        ("firstEventTime", CoercionRule::Timestamp),
        ("lastEventTime", CoercionRule::Timestamp),
        ("firstAutomationTime", CoercionRule::Timestamp),
        ("suppressedUntil", CoercionRule::Timestamp),
        ("suppressedTime", CoercionRule::Timestamp),
        ("alarmAckTime", CoercionRule::Timestamp),
        ("id", CoercionRule::Integer),
        ("ifIndex", CoercionRule::Integer),
        ("counter", CoercionRule::Integer),
        ("severity", CoercionRule::Ordinal(OrdinalDomain::Severity)),
    ],
    defaults: EntityDefaults {
        order: &[
            ("lastEventTime", OrderDirection::Desc),
            ("id", OrderDirection::Desc),
        ],
        aliases: &[],
    },
};
