//! DuckDB schema definitions
//!
//! Inventory tables (nodes with their interfaces, services and categories) plus the
//! fault tables searched through the API. Timestamps are zone-less.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- Infrastructure: Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at BIGINT NOT NULL,
    description VARCHAR
);

-- ═══════════════════════════════════════════════════════════════════════════════
-- INVENTORY
-- ═══════════════════════════════════════════════════════════════════════════════
CREATE TABLE IF NOT EXISTS nodes (
    id                  BIGINT PRIMARY KEY,
    label               VARCHAR NOT NULL,
    node_type           VARCHAR,            -- A = active, D = deleted
    sys_name            VARCHAR,
    sys_description     VARCHAR,
    sys_location        VARCHAR,
    sys_contact         VARCHAR,
    foreign_source      VARCHAR,            -- Provisioning requisition
    foreign_id          VARCHAR,
    location            VARCHAR,            -- Monitoring location
    create_time         TIMESTAMP,
    last_capsd_poll     TIMESTAMP
);

CREATE TABLE IF NOT EXISTS categories (
    id                  BIGINT PRIMARY KEY,
    name                VARCHAR NOT NULL UNIQUE,
    description         VARCHAR
);

CREATE TABLE IF NOT EXISTS category_node (
    category_id         BIGINT NOT NULL,
    node_id             BIGINT NOT NULL,
    PRIMARY KEY (category_id, node_id)
);

CREATE TABLE IF NOT EXISTS ip_interfaces (
    id                  BIGINT PRIMARY KEY,
    node_id             BIGINT NOT NULL,
    ip_address          VARCHAR NOT NULL,
    ip_hostname         VARCHAR,
    is_managed          VARCHAR,            -- M = managed, U = unmanaged
    snmp_primary        VARCHAR,            -- P = primary, S = secondary, N = none
    last_capsd_poll     TIMESTAMP
);

CREATE TABLE IF NOT EXISTS monitored_services (
    id                  BIGINT PRIMARY KEY,
    ip_interface_id     BIGINT NOT NULL,
    service_name        VARCHAR NOT NULL,   -- ICMP, HTTP, SSH, ...
    status              VARCHAR,            -- A = active, F = forced unmanaged
    last_good           TIMESTAMP,
    last_fail           TIMESTAMP
);

CREATE TABLE IF NOT EXISTS snmp_interfaces (
    id                  BIGINT PRIMARY KEY,
    node_id             BIGINT NOT NULL,
    if_index            BIGINT,
    if_name             VARCHAR,
    if_descr            VARCHAR,
    phys_addr           VARCHAR
);

-- ═══════════════════════════════════════════════════════════════════════════════
-- FAULTS
-- ═══════════════════════════════════════════════════════════════════════════════
CREATE TABLE IF NOT EXISTS alarms (
    id                      BIGINT PRIMARY KEY,
    uei                     VARCHAR NOT NULL,
    node_id                 BIGINT,
    ip_addr                 VARCHAR,
    if_index                BIGINT,
    reduction_key           VARCHAR,
    alarm_type              BIGINT,         -- 1 = problem, 2 = resolution
    counter                 BIGINT NOT NULL DEFAULT 1,
    severity                INTEGER NOT NULL,
    description             VARCHAR,
    log_msg                 VARCHAR,
    first_event_time        TIMESTAMP,
    last_event_time         TIMESTAMP,
    first_automation_time   TIMESTAMP,
    suppressed_until        TIMESTAMP,
    suppressed_time         TIMESTAMP,
    alarm_ack_time          TIMESTAMP,
    alarm_ack_user          VARCHAR
);

CREATE TABLE IF NOT EXISTS events (
    event_id            BIGINT PRIMARY KEY,
    event_uei           VARCHAR NOT NULL,
    node_id             BIGINT,
    event_time          TIMESTAMP NOT NULL,
    event_create_time   TIMESTAMP NOT NULL,
    event_host          VARCHAR,
    event_source        VARCHAR,
    ip_addr             VARCHAR,
    event_severity      INTEGER,
    event_log_msg       VARCHAR,
    event_descr         VARCHAR,
    event_ack_user      VARCHAR,
    event_ack_time      TIMESTAMP
);

CREATE TABLE IF NOT EXISTS notifications (
    notify_id           BIGINT PRIMARY KEY,
    text_msg            VARCHAR,
    subject             VARCHAR,
    numeric_msg         VARCHAR,
    page_time           TIMESTAMP,
    respond_time        TIMESTAMP,
    answered_by         VARCHAR,
    node_id             BIGINT,
    event_id            BIGINT,
    event_uei           VARCHAR,
    ip_address          VARCHAR,
    queue_id            VARCHAR
);

CREATE TABLE IF NOT EXISTS outages (
    id                  BIGINT PRIMARY KEY,
    node_id             BIGINT,
    ip_addr             VARCHAR,
    service_name        VARCHAR,
    if_lost_service     TIMESTAMP NOT NULL,
    if_regained_service TIMESTAMP,
    suppress_time       TIMESTAMP,
    suppressed_by       VARCHAR
);

CREATE INDEX IF NOT EXISTS idx_ip_interfaces_node ON ip_interfaces(node_id);
CREATE INDEX IF NOT EXISTS idx_monitored_services_interface ON monitored_services(ip_interface_id);
CREATE INDEX IF NOT EXISTS idx_snmp_interfaces_node ON snmp_interfaces(node_id);
CREATE INDEX IF NOT EXISTS idx_category_node_node ON category_node(node_id);
CREATE INDEX IF NOT EXISTS idx_alarms_last_event ON alarms(last_event_time DESC);
CREATE INDEX IF NOT EXISTS idx_events_time ON events(event_time);
CREATE INDEX IF NOT EXISTS idx_events_node ON events(node_id);
CREATE INDEX IF NOT EXISTS idx_outages_node ON outages(node_id);
"#;
