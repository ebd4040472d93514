//! Node search profile
//!
//! Filters may reach into interfaces and categories through the
//! `snmpInterface`, `ipInterface` and `category` aliases, e.g.
//! `ipInterface.ipAddress==10.0.0.1`.

use super::EntityProfile;
use crate::query::{Alias, CoercionRule, EntityDefaults, JoinType, LookupTarget, OrderDirection};

pub static PROFILE: EntityProfile = EntityProfile {
    name: "nodes",
    coercion: &[
        ("createTime", CoercionRule::Timestamp),
        ("lastCapsdPoll", CoercionRule::Timestamp),
        ("id", CoercionRule::Integer),
        ("categories", CoercionRule::Lookup(LookupTarget::Category)),
    ],
    defaults: EntityDefaults {
        order: &[("label", OrderDirection::Asc)],
        aliases: &[
            Alias {
                path: "snmpInterfaces",
                alias: "snmpInterface",
                join: JoinType::LeftJoin,
            },
            Alias {
                path: "ipInterfaces",
                alias: "ipInterface",
                join: JoinType::LeftJoin,
            },
            Alias {
                path: "categories",
                alias: "category",
                join: JoinType::LeftJoin,
            },
        ],
    },
};
