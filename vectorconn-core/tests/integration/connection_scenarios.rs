//! Integration tests for the connection registry lifecycle
//!
//! These tests walk through add / connect / disconnect / remove sequences
//! against a scripted server and check listings and stored addresses after
//! each step.

use vectorconn_core::{ConnectionConfig, ConnectionError, DEFAULT_ALIAS};

use crate::fixtures::{
    create_test_registry, expected, listing, server_config, NOT_EXIST, SERVER_HOST, SERVER_PORT,
    TEST_ALIAS,
};

// ============================================================================
// add_connection
// ============================================================================

#[test]
fn test_add_more() {
    let (registry, _) = create_test_registry();

    registry
        .add_connection([
            ("alias1", ConnectionConfig::new("localhost", "1")),
            ("alias2", ConnectionConfig::new("192.168.1.1", "123")),
        ])
        .unwrap();

    assert!(registry.get_connection(DEFAULT_ALIAS).is_none());
    assert_eq!(
        listing(&registry),
        expected(&[("default", false), ("alias1", false), ("alias2", false)])
    );
    assert_eq!(
        registry.get_connection_addr(DEFAULT_ALIAS),
        ConnectionConfig::new("localhost", "19530")
    );
    assert_eq!(
        registry.get_connection_addr("alias1"),
        ConnectionConfig::new("localhost", "1")
    );
    assert_eq!(
        registry.get_connection_addr("alias2"),
        ConnectionConfig::new("192.168.1.1", "123")
    );
}

#[test]
fn test_add_single_more() {
    let (registry, _) = create_test_registry();

    registry
        .add_connection([("alias1", ConnectionConfig::new("localhost", "1"))])
        .unwrap();
    registry
        .add_connection([("alias2", ConnectionConfig::new("192.168.1.1", "123"))])
        .unwrap();

    assert_eq!(
        listing(&registry),
        expected(&[("default", false), ("alias1", false), ("alias2", false)])
    );
}

#[test]
fn test_add_unvalidated_shapes() {
    let (registry, _) = create_test_registry();

    registry
        .add_connection([
            ("alias1", ConnectionConfig::from([("host", "localhost"), ("port", "1")])),
            ("alias2", ConnectionConfig::from([("port", "-1"), ("host", "hostlocal")])),
            ("testing", ConnectionConfig::from([("", "")])),
        ])
        .unwrap();

    assert_eq!(
        listing(&registry),
        expected(&[
            ("default", false),
            ("alias1", false),
            ("alias2", false),
            ("testing", false),
        ])
    );
    assert_eq!(
        registry.get_connection_addr("alias2"),
        ConnectionConfig::new("hostlocal", "-1")
    );
    assert_eq!(
        registry.get_connection_addr("testing"),
        ConnectionConfig::from([("", "")])
    );
}

#[test]
fn test_add_default_twice_with_swapped_keys() {
    let (registry, _) = create_test_registry();

    registry
        .add_connection([(
            DEFAULT_ALIAS,
            ConnectionConfig::from([("host", "localhost"), ("port", "19530")]),
        )])
        .unwrap();
    registry
        .add_connection([(
            DEFAULT_ALIAS,
            ConnectionConfig::from([("port", "19530"), ("host", "localhost")]),
        )])
        .unwrap();

    assert_eq!(listing(&registry), expected(&[("default", false)]));
    assert_eq!(
        registry.get_connection_addr(DEFAULT_ALIAS),
        ConnectionConfig::new("localhost", "19530")
    );
}

#[test]
fn test_add_cover_default() {
    let (registry, _) = create_test_registry();
    assert_eq!(
        registry.get_connection_addr(DEFAULT_ALIAS),
        ConnectionConfig::new("localhost", "19530")
    );

    registry
        .add_connection([(DEFAULT_ALIAS, ConnectionConfig::new("192.168.1.1", "12345"))])
        .unwrap();

    assert_eq!(listing(&registry), expected(&[("default", false)]));
    assert_eq!(
        registry.get_connection_addr(DEFAULT_ALIAS),
        ConnectionConfig::new("192.168.1.1", "12345")
    );
}

#[test]
fn test_get_addr_not_exist() {
    let (registry, _) = create_test_registry();
    assert!(registry.get_connection_addr(NOT_EXIST).is_empty());
}

#[test]
fn test_add_after_connect() {
    let (registry, _) = create_test_registry();
    registry.connect(TEST_ALIAS, server_config()).unwrap();

    let err = registry
        .add_connection([(TEST_ALIAS, ConnectionConfig::new("localhost", "1"))])
        .unwrap_err();
    assert!(err.to_string().contains(
        "alias of 'test_alias_name' already creating connections, \
         but the configure is not the same as passed in."
    ));
    assert_eq!(registry.get_connection_addr(TEST_ALIAS), server_config());

    // Same parameters are accepted silently.
    registry
        .add_connection([(TEST_ALIAS, server_config())])
        .unwrap();
    assert!(registry.get_connection(TEST_ALIAS).is_some());
}

#[test]
fn test_add_after_default_connect() {
    let (registry, _) = create_test_registry();
    registry.connect(DEFAULT_ALIAS, server_config()).unwrap();

    let err = registry
        .add_connection([(DEFAULT_ALIAS, ConnectionConfig::new("localhost", "1"))])
        .unwrap_err();
    assert!(matches!(err, ConnectionError::ConfigConflict { ref alias, .. } if alias == "default"));

    registry
        .add_connection([(TEST_ALIAS, server_config())])
        .unwrap();
    assert_eq!(
        listing(&registry),
        expected(&[("default", true), (TEST_ALIAS, false)])
    );
}

#[test]
fn test_add_after_disconnect() {
    let (registry, _) = create_test_registry();
    registry.connect(TEST_ALIAS, server_config()).unwrap();
    registry.disconnect(TEST_ALIAS);

    assert_eq!(registry.get_connection_addr(TEST_ALIAS), server_config());

    registry
        .add_connection([(TEST_ALIAS, ConnectionConfig::new("localhost", "1"))])
        .unwrap();
    assert_eq!(
        registry.get_connection_addr(TEST_ALIAS),
        ConnectionConfig::new("localhost", "1")
    );
}

#[test]
fn test_add_after_remove() {
    let (registry, _) = create_test_registry();
    registry.connect(TEST_ALIAS, server_config()).unwrap();
    registry.remove_connection(TEST_ALIAS);

    assert!(registry.get_connection_addr(TEST_ALIAS).is_empty());

    registry
        .add_connection([(TEST_ALIAS, ConnectionConfig::new("localhost", "1"))])
        .unwrap();
    assert_eq!(
        registry.get_connection_addr(TEST_ALIAS),
        ConnectionConfig::new("localhost", "1")
    );
}

// ============================================================================
// connect
// ============================================================================

#[test]
fn test_connect_alias_not_exist() {
    let (registry, connector) = create_test_registry();

    let err = registry
        .connect(NOT_EXIST, ConnectionConfig::empty())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "You need to pass in the configuration of the connection named 'not_exist'"
    );

    assert_eq!(listing(&registry), expected(&[("default", false)]));
    assert_eq!(
        registry.get_connection_addr(DEFAULT_ALIAS),
        ConnectionConfig::new("localhost", "19530")
    );
    assert_eq!(connector.attempts(), 0);
}

#[test]
fn test_connect_default_alias_invalid() {
    let (registry, _) = create_test_registry();
    registry
        .add_connection([(DEFAULT_ALIAS, ConnectionConfig::new("host", SERVER_PORT))])
        .unwrap();

    let err = registry
        .connect(DEFAULT_ALIAS, ConnectionConfig::empty())
        .unwrap_err();
    assert!(err.is_connection_failure());
    assert_eq!(
        err.to_string(),
        "Fail connecting to server on host:19530. Timeout"
    );

    assert_eq!(listing(&registry), expected(&[("default", false)]));
    assert_eq!(
        registry.get_connection_addr(DEFAULT_ALIAS),
        ConnectionConfig::new("host", SERVER_PORT)
    );
}

#[test]
fn test_connect_default_alias_effective() {
    let (registry, _) = create_test_registry();
    registry
        .add_connection([(DEFAULT_ALIAS, server_config())])
        .unwrap();

    registry
        .connect(DEFAULT_ALIAS, ConnectionConfig::empty())
        .unwrap();

    assert_eq!(listing(&registry), expected(&[("default", true)]));
    assert_eq!(registry.get_connection_addr(DEFAULT_ALIAS), server_config());
}

#[test]
fn test_connect_repeat() {
    let (registry, connector) = create_test_registry();
    registry
        .add_connection([(DEFAULT_ALIAS, server_config())])
        .unwrap();

    registry
        .connect(DEFAULT_ALIAS, ConnectionConfig::empty())
        .unwrap();
    let first = registry.get_connection(DEFAULT_ALIAS).unwrap();

    registry.connect(DEFAULT_ALIAS, server_config()).unwrap();
    let second = registry.get_connection(DEFAULT_ALIAS).unwrap();

    assert_eq!(first, second);
    assert_eq!(connector.attempts(), 1);

    let err = registry
        .connect(DEFAULT_ALIAS, ConnectionConfig::new("host", SERVER_PORT))
        .unwrap_err();
    assert!(err.to_string().contains(
        "The connection named default already creating, \
         but passed parameters don't match the configured parameters,"
    ));
    assert_eq!(registry.get_connection(DEFAULT_ALIAS), Some(first));
}

#[test]
fn test_connect_params() {
    for alias in [DEFAULT_ALIAS, "test_alias_nme"] {
        let (registry, _) = create_test_registry();

        let handle = registry.connect(alias, server_config()).unwrap();
        assert_eq!(handle.peer(), format!("{SERVER_HOST}:{SERVER_PORT}"));
        assert_eq!(registry.get_connection(alias), Some(handle));

        let want = if alias == DEFAULT_ALIAS {
            expected(&[(alias, true)])
        } else {
            expected(&[("default", false), (alias, true)])
        };
        assert_eq!(listing(&registry), want);
        assert_eq!(registry.get_connection_addr(alias), server_config());
    }
}

#[test]
fn test_connect_wrong_params() {
    for alias in [DEFAULT_ALIAS, "test_alias_nme"] {
        let (registry, connector) = create_test_registry();

        let overrides = ConnectionConfig::empty()
            .with("ip", SERVER_HOST)
            .with("port", SERVER_PORT);
        let result = registry.connect(alias, overrides);

        if alias == DEFAULT_ALIAS {
            // The stored default host fills the gap, so the attempt is made.
            assert!(result.unwrap_err().is_connection_failure());
            assert_eq!(connector.attempts(), 1);
        } else {
            let err = result.unwrap_err();
            assert!(err
                .to_string()
                .starts_with("Param is not complete. Please invoke as follow:"));
            assert!(registry.get_connection_addr(alias).is_empty());
            assert_eq!(connector.attempts(), 0);
        }
        assert_eq!(registry.connected_count(), 0);
    }
}

#[test]
fn test_connect_uses_configured_timeout() {
    let (registry, connector) = create_test_registry();
    let registry = registry.with_connect_timeout(std::time::Duration::from_millis(250));

    registry.connect(TEST_ALIAS, server_config()).unwrap();
    assert_eq!(
        connector.seen_timeouts(),
        vec![std::time::Duration::from_millis(250)]
    );
}

#[test]
fn test_failed_connect_records_attempted_config() {
    let (registry, _) = create_test_registry();

    let err = registry
        .connect("x", ConnectionConfig::new("h", "1"))
        .unwrap_err();
    assert!(err.is_connection_failure());
    assert!(registry.get_connection("x").is_none());
    assert_eq!(
        registry.get_connection_addr("x"),
        ConnectionConfig::new("h", "1")
    );
    assert_eq!(
        listing(&registry),
        expected(&[("default", false), ("x", false)])
    );
}

// ============================================================================
// disconnect / remove_connection
// ============================================================================

#[test]
fn test_disconnect_not_exist() {
    for alias in [DEFAULT_ALIAS, NOT_EXIST] {
        let (registry, _) = create_test_registry();

        assert_eq!(listing(&registry), expected(&[("default", false)]));
        registry.disconnect(alias);
        assert_eq!(listing(&registry), expected(&[("default", false)]));
        assert_eq!(
            registry.get_connection_addr(DEFAULT_ALIAS),
            ConnectionConfig::new("localhost", "19530")
        );
    }
}

#[test]
fn test_disconnect_after_default_connect() {
    let (registry, _) = create_test_registry();
    registry
        .add_connection([(DEFAULT_ALIAS, server_config())])
        .unwrap();
    registry
        .connect(DEFAULT_ALIAS, ConnectionConfig::empty())
        .unwrap();
    assert!(registry.get_connection(DEFAULT_ALIAS).is_some());

    registry.disconnect(DEFAULT_ALIAS);
    assert!(registry.get_connection(DEFAULT_ALIAS).is_none());

    registry.disconnect(DEFAULT_ALIAS);
    assert_eq!(listing(&registry), expected(&[("default", false)]));
    assert_eq!(registry.get_connection_addr(DEFAULT_ALIAS), server_config());
}

#[test]
fn test_disconnect_after_connect() {
    let (registry, _) = create_test_registry();
    registry
        .add_connection([(TEST_ALIAS, server_config())])
        .unwrap();
    registry.connect(TEST_ALIAS, server_config()).unwrap();

    assert_eq!(
        listing(&registry),
        expected(&[("default", false), (TEST_ALIAS, true)])
    );

    registry.disconnect(TEST_ALIAS);

    assert_eq!(
        listing(&registry),
        expected(&[("default", false), (TEST_ALIAS, false)])
    );
    assert_eq!(registry.get_connection_addr(TEST_ALIAS), server_config());
}

#[test]
fn test_remove_connection_not_exist() {
    let (registry, _) = create_test_registry();
    registry.remove_connection(NOT_EXIST);
    assert_eq!(listing(&registry), expected(&[("default", false)]));
}

#[test]
fn test_remove_default_alias() {
    let (registry, _) = create_test_registry();
    registry.remove_connection(DEFAULT_ALIAS);
    assert!(registry.list_connections().is_empty());
    assert!(registry.get_connection_addr(DEFAULT_ALIAS).is_empty());
}

#[test]
fn test_remove_after_connect() {
    for alias in [DEFAULT_ALIAS, TEST_ALIAS] {
        let (registry, _) = create_test_registry();
        let handle = registry.connect(alias, server_config()).unwrap();

        registry.remove_connection(alias);

        assert!(!handle.is_open());
        assert!(registry.get_connection(alias).is_none());
        assert!(registry.get_connection_addr(alias).is_empty());
        let want = if alias == DEFAULT_ALIAS {
            expected(&[])
        } else {
            expected(&[("default", false)])
        };
        assert_eq!(listing(&registry), want);
    }
}

#[test]
fn test_remove_after_disconnect() {
    for alias in [DEFAULT_ALIAS, TEST_ALIAS] {
        let (registry, _) = create_test_registry();
        registry.connect(alias, server_config()).unwrap();
        registry.disconnect(alias);

        registry.remove_connection(alias);
        registry.remove_connection(alias);

        let want = if alias == DEFAULT_ALIAS {
            expected(&[])
        } else {
            expected(&[("default", false)])
        };
        assert_eq!(listing(&registry), want);
    }
}

#[test]
fn test_reconnect_after_remove() {
    let (registry, _) = create_test_registry();
    registry.connect(DEFAULT_ALIAS, server_config()).unwrap();
    registry.remove_connection(DEFAULT_ALIAS);

    assert!(registry
        .connect(DEFAULT_ALIAS, ConnectionConfig::empty())
        .unwrap_err()
        .is_missing_config());

    let handle = registry.connect(DEFAULT_ALIAS, server_config()).unwrap();
    assert!(handle.is_open());
}

#[test]
fn test_reset_between_sessions() {
    let (registry, _) = create_test_registry();
    registry.connect(TEST_ALIAS, server_config()).unwrap();
    registry.remove_connection(DEFAULT_ALIAS);

    registry.reset();

    assert_eq!(listing(&registry), expected(&[("default", false)]));
    assert_eq!(
        registry.get_connection_addr(DEFAULT_ALIAS),
        ConnectionConfig::new("localhost", "19530")
    );
}
