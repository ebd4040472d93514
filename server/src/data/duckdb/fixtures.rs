//! Sample inventory and fault data
//!
//! Loaded by `nmsquery system seed` and by data-layer tests.
//!
//! | node | label    | type | categories          | interfaces        | services          |
//! |------|----------|------|---------------------|-------------------|-------------------|
//! | 1    | web01    | A    | Servers, Production | 2 ip, 1 snmp      | ICMP, HTTP, SSH   |
//! | 2    | core-rtr | A    | Routers, Production | 1 ip, 2 snmp      | SNMP, ICMP        |
//! | 3    | db01     | D    | Servers             | 1 ip              | none              |
//! | 4    | lab-sw   | D    | none                | none              | none              |

use duckdb::Connection;

use super::error::DuckdbError;
use super::in_transaction;

const FIXTURES: &str = r#"
INSERT INTO categories (id, name, description) VALUES
    (1, 'Servers', 'Server hosts'),
    (2, 'Routers', 'Core routing'),
    (3, 'Production', NULL),
    (4, 'Development', NULL);

INSERT INTO nodes (id, label, node_type, sys_name, sys_description, sys_location, sys_contact,
                   foreign_source, foreign_id, location, create_time, last_capsd_poll) VALUES
    (1, 'web01', 'A', 'web01.example.org', 'Linux web01', 'Rack 1', 'ops@example.org',
        'Servers', 'web01', 'Default', '2013-05-01 08:00:00', '2013-12-01 10:00:00'),
    (2, 'core-rtr', 'A', 'core-rtr', 'Cisco IOS', 'Core', 'netops@example.org',
        'Network', 'rtr-1', 'Default', '2013-06-20 12:30:00', '2013-12-20 09:00:00'),
    (3, 'db01', 'D', 'db01.example.org', 'Linux db01', 'Rack 2', NULL,
        'Servers', 'db01', 'Default', '2013-07-02 15:45:00', '2014-01-15 22:10:00'),
    (4, 'lab-sw', 'D', NULL, NULL, NULL, NULL,
        NULL, NULL, 'Lab', '2012-11-11 11:11:11', NULL);

INSERT INTO category_node (category_id, node_id) VALUES
    (1, 1), (3, 1),
    (2, 2), (3, 2),
    (1, 3);

INSERT INTO ip_interfaces (id, node_id, ip_address, ip_hostname, is_managed, snmp_primary, last_capsd_poll) VALUES
    (1, 1, '10.0.0.10', 'web01.example.org', 'M', 'P', '2013-12-01 10:00:00'),
    (2, 1, '192.168.1.10', 'web01-mgmt', 'M', 'S', '2013-12-01 10:00:00'),
    (3, 2, '10.0.0.1', 'core-rtr', 'M', 'P', '2013-12-20 09:00:00'),
    (4, 3, '10.0.0.20', NULL, 'U', 'N', NULL);

INSERT INTO monitored_services (id, ip_interface_id, service_name, status, last_good, last_fail) VALUES
    (1, 1, 'ICMP', 'A', '2013-12-01 10:00:00', NULL),
    (2, 1, 'HTTP', 'A', '2013-12-01 10:00:00', '2013-11-30 23:15:00'),
    (3, 2, 'SSH', 'A', '2013-12-01 09:55:00', NULL),
    (4, 3, 'SNMP', 'A', '2013-12-20 09:00:00', NULL),
    (5, 3, 'ICMP', 'F', NULL, '2014-01-02 03:00:00');

INSERT INTO snmp_interfaces (id, node_id, if_index, if_name, if_descr, phys_addr) VALUES
    (1, 1, 1, 'eth0', 'Intel eth0', '00:11:22:33:44:55'),
    (2, 2, 1, 'Gi0/0', 'GigabitEthernet0/0', '00:aa:bb:cc:dd:01'),
    (3, 2, 2, 'Gi0/1', 'GigabitEthernet0/1', '00:aa:bb:cc:dd:02');

INSERT INTO alarms (id, uei, node_id, ip_addr, if_index, reduction_key, alarm_type, counter, severity,
                    description, log_msg, first_event_time, last_event_time, first_automation_time,
                    suppressed_until, suppressed_time, alarm_ack_time, alarm_ack_user) VALUES
    (1, 'uei.opennms.org/nodes/nodeDown', 1, '10.0.0.10', NULL, 'nodeDown::1', 1, 3, 6,
        'Node down', 'Node web01 is down', '2013-12-01 10:00:00', '2013-12-01 10:05:00', NULL,
        NULL, NULL, NULL, NULL),
    (2, 'uei.opennms.org/nodes/interfaceDown', 2, '10.0.0.1', 1, 'interfaceDown::2:1', 1, 1, 7,
        'Interface down', 'Gi0/0 on core-rtr is down', '2014-01-02 03:00:00', '2014-01-02 03:00:00', NULL,
        NULL, NULL, '2014-01-02 04:00:00', 'admin'),
    (3, 'uei.opennms.org/nodes/nodeUp', 1, '10.0.0.10', NULL, 'nodeUp::1', 2, 1, 2,
        'Node up', 'Node web01 is up', '2013-12-01 11:00:00', '2013-12-01 11:00:00', NULL,
        NULL, NULL, NULL, NULL),
    (4, 'uei.opennms.org/threshold/highThresholdExceeded', 3, '10.0.0.20', NULL, 'threshold::3:cpu', 1, 5, 4,
        'High threshold exceeded', 'CPU above 90% on db01', '2013-11-10 00:00:00', '2013-12-15 08:30:00',
        '2013-11-10 00:05:00', '2013-12-16 00:00:00', '2013-12-15 09:00:00', NULL, NULL);

INSERT INTO events (event_id, event_uei, node_id, event_time, event_create_time, event_host, event_source,
                    ip_addr, event_severity, event_log_msg, event_descr, event_ack_user, event_ack_time) VALUES
    (1, 'uei.opennms.org/nodes/nodeDown', 1, '2013-12-01 10:00:00', '2013-12-01 10:00:01', 'nms01', 'poller',
        '10.0.0.10', 6, 'Node web01 is down', 'All interfaces down', NULL, NULL),
    (2, 'uei.opennms.org/nodes/nodeUp', 1, '2013-12-01 11:00:00', '2013-12-01 11:00:01', 'nms01', 'poller',
        '10.0.0.10', 2, 'Node web01 is up', NULL, NULL, NULL),
    (3, 'uei.opennms.org/nodes/interfaceDown', 2, '2014-01-02 03:00:00', '2014-01-02 03:00:01', 'nms01', 'poller',
        '10.0.0.1', 7, 'Gi0/0 on core-rtr is down', NULL, 'admin', '2014-01-02 04:00:00'),
    (4, 'uei.opennms.org/threshold/highThresholdExceeded', 3, '2013-12-15 08:30:00', '2013-12-15 08:30:02', 'nms01', 'collectd',
        '10.0.0.20', 4, 'CPU above 90% on db01', NULL, NULL, NULL),
    (5, 'uei.opennms.org/internal/discoveryConfigChange', NULL, '2013-10-01 00:00:00', '2013-10-01 00:00:00', 'nms01', 'webui',
        NULL, 3, 'Discovery configuration changed', NULL, NULL, NULL);

INSERT INTO notifications (notify_id, text_msg, subject, numeric_msg, page_time, respond_time, answered_by,
                           node_id, event_id, event_uei, ip_address, queue_id) VALUES
    (1, 'Node web01 is down', 'Notice #1: web01 down', '111', '2013-12-01 10:01:00', '2013-12-01 10:20:00', 'admin',
        1, 1, 'uei.opennms.org/nodes/nodeDown', '10.0.0.10', 'default'),
    (2, 'Interface down on core-rtr', 'Notice #2: core-rtr Gi0/0 down', NULL, '2014-01-02 03:01:00', NULL, NULL,
        2, 3, 'uei.opennms.org/nodes/interfaceDown', '10.0.0.1', 'default'),
    (3, 'Threshold exceeded on db01', 'Notice #3: db01 CPU', NULL, '2013-12-15 08:31:00', '2013-12-15 09:00:00', 'oncall',
        3, 4, 'uei.opennms.org/threshold/highThresholdExceeded', '10.0.0.20', 'default');

INSERT INTO outages (id, node_id, ip_addr, service_name, if_lost_service, if_regained_service,
                     suppress_time, suppressed_by) VALUES
    (1, 1, '10.0.0.10', 'ICMP', '2013-12-01 10:00:00', '2013-12-01 11:00:00', NULL, NULL),
    (2, 2, '10.0.0.1', 'SNMP', '2014-01-02 03:00:00', NULL, NULL, NULL),
    (3, 3, '10.0.0.20', 'HTTP', '2013-12-15 08:30:00', '2013-12-15 08:45:00', '2013-12-15 08:35:00', 'admin');
"#;

/// Load the sample data set. Returns `false` when nodes already exist.
pub fn seed(conn: &Connection) -> Result<bool, DuckdbError> {
    let existing: i64 = conn.query_row("SELECT COUNT(*) FROM nodes", [], |row| row.get(0))?;
    if existing > 0 {
        tracing::debug!(nodes = existing, "Skipping fixtures, data already present");
        return Ok(false);
    }

    in_transaction(conn, |conn| {
        conn.execute_batch(FIXTURES)?;
        Ok(())
    })?;
    tracing::debug!("Loaded sample fixtures");
    Ok(true)
}
