//! Filter field to column mapping
//!
//! Every searchable entity exposes a fixed set of filter/sort field names.
//! Each maps to a column of the entity's table (queried as `p`) or, for
//! association fields, to a column of a child table reached through an
//! alias such as `ipInterface.ipAddress`.

use crate::entities::EntityKind;

/// Storage type of a filterable field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Timestamp,
    /// Many-to-many membership through a link table
    Membership {
        link: &'static str,
        owner: &'static str,
        member: &'static str,
    },
}

impl ColumnKind {
    pub fn describe(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Timestamp => "timestamp",
            Self::Membership { .. } => "membership",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldColumn {
    pub name: &'static str,
    pub column: &'static str,
    pub kind: ColumnKind,
}

const fn text(name: &'static str, column: &'static str) -> FieldColumn {
    FieldColumn {
        name,
        column,
        kind: ColumnKind::Text,
    }
}

const fn int(name: &'static str, column: &'static str) -> FieldColumn {
    FieldColumn {
        name,
        column,
        kind: ColumnKind::Integer,
    }
}

const fn ts(name: &'static str, column: &'static str) -> FieldColumn {
    FieldColumn {
        name,
        column,
        kind: ColumnKind::Timestamp,
    }
}

/// Child rows reachable from the parent through a join path
#[derive(Debug)]
pub struct Association {
    /// Join path named by [`crate::query::Alias::path`]
    pub path: &'static str,
    /// FROM clause; child columns are qualified with `c`
    pub from: &'static str,
    /// Column in `from` that references the parent key
    pub parent_ref: &'static str,
    pub fields: &'static [FieldColumn],
}

impl Association {
    pub fn field(&self, name: &str) -> Option<&FieldColumn> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug)]
pub struct TableSchema {
    pub table: &'static str,
    pub key_column: &'static str,
    pub fields: &'static [FieldColumn],
    pub associations: &'static [Association],
}

impl TableSchema {
    pub fn field(&self, name: &str) -> Option<&FieldColumn> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn association(&self, path: &str) -> Option<&Association> {
        self.associations.iter().find(|a| a.path == path)
    }

    /// Fields returned in records: one per column, membership excluded
    pub fn output_fields(&self) -> impl Iterator<Item = &FieldColumn> {
        self.fields.iter().enumerate().filter_map(|(i, f)| {
            let first = !self.fields[..i].iter().any(|g| g.column == f.column);
            let stored = !matches!(f.kind, ColumnKind::Membership { .. });
            (first && stored).then_some(f)
        })
    }
}

pub fn schema(kind: EntityKind) -> &'static TableSchema {
    match kind {
        EntityKind::Alarm => &ALARMS,
        EntityKind::Event => &EVENTS,
        EntityKind::Node => &NODES,
        EntityKind::Notification => &NOTIFICATIONS,
        EntityKind::Outage => &OUTAGES,
    }
}

pub static NODES: TableSchema = TableSchema {
    table: "nodes",
    key_column: "id",
    fields: &[
        int("id", "id"),
        text("label", "label"),
        text("type", "node_type"),
        text("sysName", "sys_name"),
        text("sysDescription", "sys_description"),
        text("sysLocation", "sys_location"),
        text("sysContact", "sys_contact"),
        text("foreignSource", "foreign_source"),
        text("foreignId", "foreign_id"),
        text("location", "location"),
        ts("createTime", "create_time"),
        ts("lastCapsdPoll", "last_capsd_poll"),
        FieldColumn {
            name: "categories",
            column: "category_node",
            kind: ColumnKind::Membership {
                link: "category_node",
                owner: "node_id",
                member: "category_id",
            },
        },
    ],
    associations: &[
        Association {
            path: "snmpInterfaces",
            from: "snmp_interfaces c",
            parent_ref: "c.node_id",
            fields: &[
                int("ifIndex", "if_index"),
                text("ifName", "if_name"),
                text("ifDescr", "if_descr"),
                text("physAddr", "phys_addr"),
            ],
        },
        Association {
            path: "ipInterfaces",
            from: "ip_interfaces c",
            parent_ref: "c.node_id",
            fields: &[
                text("ipAddress", "ip_address"),
                text("ipHostName", "ip_hostname"),
                text("isManaged", "is_managed"),
                text("snmpPrimary", "snmp_primary"),
                ts("lastCapsdPoll", "last_capsd_poll"),
            ],
        },
        Association {
            path: "categories",
            from: "category_node l JOIN categories c ON c.id = l.category_id",
            parent_ref: "l.node_id",
            fields: &[text("name", "name"), text("description", "description")],
        },
    ],
};

pub static ALARMS: TableSchema = TableSchema {
    table: "alarms",
    key_column: "id",
    fields: &[
        int("id", "id"),
        text("uei", "uei"),
        int("nodeId", "node_id"),
        text("ipAddr", "ip_addr"),
        int("ifIndex", "if_index"),
        text("reductionKey", "reduction_key"),
        int("alarmType", "alarm_type"),
        int("counter", "counter"),
        int("severity", "severity"),
        text("description", "description"),
        text("logMsg", "log_msg"),
        ts("firstEventTime", "first_event_time"),
        ts("lastEventTime", "last_event_time"),
        ts("firstAutomationTime", "first_automation_time"),
        ts("suppressedUntil", "suppressed_until"),
        ts("suppressedTime", "suppressed_time"),
        ts("alarmAckTime", "alarm_ack_time"),
        text("alarmAckUser", "alarm_ack_user"),
    ],
    associations: &[],
};

pub static EVENTS: TableSchema = TableSchema {
    table: "events",
    key_column: "event_id",
    fields: &[
        int("eventId", "event_id"),
        int("id", "event_id"),
        text("eventUei", "event_uei"),
        int("nodeId", "node_id"),
        ts("eventTime", "event_time"),
        ts("eventCreateTime", "event_create_time"),
        text("eventHost", "event_host"),
        text("eventSource", "event_source"),
        text("ipAddr", "ip_addr"),
        int("eventSeverity", "event_severity"),
        text("eventLogMsg", "event_log_msg"),
        text("eventDescr", "event_descr"),
        text("eventAckUser", "event_ack_user"),
        ts("eventAckTime", "event_ack_time"),
    ],
    associations: &[],
};

pub static NOTIFICATIONS: TableSchema = TableSchema {
    table: "notifications",
    key_column: "notify_id",
    fields: &[
        int("notifyId", "notify_id"),
        int("id", "notify_id"),
        text("textMsg", "text_msg"),
        text("subject", "subject"),
        text("numericMsg", "numeric_msg"),
        ts("pageTime", "page_time"),
        ts("respondTime", "respond_time"),
        text("answeredBy", "answered_by"),
        int("nodeId", "node_id"),
        int("eventId", "event_id"),
        text("eventUei", "event_uei"),
        text("ipAddress", "ip_address"),
        text("queueId", "queue_id"),
    ],
    associations: &[],
};

pub static OUTAGES: TableSchema = TableSchema {
    table: "outages",
    key_column: "id",
    fields: &[
        int("id", "id"),
        int("nodeId", "node_id"),
        text("ipAddr", "ip_addr"),
        text("serviceName", "service_name"),
        ts("ifLostService", "if_lost_service"),
        ts("ifRegainedService", "if_regained_service"),
        ts("suppressTime", "suppress_time"),
        text("suppressedBy", "suppressed_by"),
    ],
    associations: &[],
};
