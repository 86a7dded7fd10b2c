//! Sink Configuration Integration Tests
//!
//! Deserialization, plan compilation and statement assembly, end to end
//! without a live server.

mod config_tests {
    use mysql_bulk_sink::prelude::*;

    /// Helper to create a minimal valid config
    fn minimal_config() -> serde_json::Value {
        serde_json::json!({
            "database": "logs",
            "table": "access",
            "column_names": "created_at,host,path,code"
        })
    }

    #[test]
    fn test_deserialize_minimal_config() {
        let config: std::result::Result<MysqlBulkConfig, _> =
            serde_json::from_value(minimal_config());
        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.table, "access");
        assert_eq!(config.database, "logs");
        assert!(config.host.is_none());
        assert!(!config.on_duplicate_key_update);
    }

    #[test]
    fn test_deserialize_full_config() {
        let json = serde_json::json!({
            "host": "db.example.com",
            "port": 3307,
            "database": "logs",
            "username": "writer",
            "password": "secret",
            "default_file": "/etc/mysql/my.cnf",
            "default_group": "bulk",
            "sslca": "/etc/ssl/ca.pem",
            "sslverify": true,
            "table": "access",
            "column_names": "created_at,host,path,code,payload",
            "key_names": "${time},host,path,code,payload",
            "json_key_names": "payload",
            "on_duplicate_key_update": true,
            "on_duplicate_update_keys": "code,payload"
        });

        let config: MysqlBulkConfig = serde_json::from_value(json).unwrap();

        assert_eq!(config.host, Some("db.example.com".to_string()));
        assert_eq!(config.port, Some(3307));
        assert_eq!(config.default_group, Some("bulk".to_string()));
        assert_eq!(config.sslverify, Some(true));
        assert!(config.on_duplicate_key_update);

        let settings = config.connection_settings();
        assert_eq!(settings.host.as_deref(), Some("db.example.com"));
        assert_eq!(settings.password.as_deref(), Some("secret"));
    }

    #[test]
    fn test_missing_required_fields_fail_deserialization() {
        let json = serde_json::json!({
            "database": "logs",
            "table": "access"
        });
        let config: std::result::Result<MysqlBulkConfig, _> = serde_json::from_value(json);
        assert!(config.is_err());
    }

    #[test]
    fn test_serialized_config_redacts_password() {
        let json = serde_json::json!({
            "database": "logs",
            "table": "access",
            "column_names": "id",
            "password": "hunter2"
        });
        let config: MysqlBulkConfig = serde_json::from_value(json).unwrap();

        let dumped = serde_json::to_string(&config).unwrap();
        assert!(!dumped.contains("hunter2"));
        assert!(dumped.contains("***REDACTED***"));
    }

    #[test]
    fn test_compile_surfaces_configuration_errors_before_connecting() {
        let json = serde_json::json!({
            "database": "",
            "table": "access",
            "column_names": "id"
        });
        let config: MysqlBulkConfig = serde_json::from_value(json).unwrap();

        let err = config.compile().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert!(err.is_startup_fatal());
    }
}

mod pipeline_tests {
    use chrono::TimeZone;
    use chrono::Utc;
    use mysql_bulk_sink::prelude::*;

    /// Column specs as the schema load would produce them, without a server.
    fn specs(plan: &InsertPlan, lengths: &[Option<usize>]) -> Vec<ColumnSpec> {
        plan.columns
            .iter()
            .zip(lengths)
            .map(|(name, max_length)| ColumnSpec {
                name: name.clone(),
                max_length: *max_length,
            })
            .collect()
    }

    #[test]
    fn test_config_to_statement_pipeline() {
        let config: MysqlBulkConfig = serde_json::from_value(serde_json::json!({
            "database": "logs",
            "table": "access",
            "column_names": "created_at,host,message",
            "key_names": "${time},host,message"
        }))
        .unwrap();
        let plan = config.compile().unwrap();
        let binder =
            RowBinder::new(&plan.keys, &specs(&plan, &[None, Some(32), Some(5)])).unwrap();

        let ts = Utc.timestamp_opt(1_000_000_000, 0).unwrap();
        let chunk = Chunk::new("nginx.access")
            .with_event(
                ts,
                serde_json::json!({"host": "web-1", "message": "GET /index"}),
            )
            .with_event(ts, serde_json::json!({"host": "web-2"}));

        let tuples: Vec<_> = chunk.events.iter().map(|e| binder.bind(e)).collect();
        let stmt = build_bulk_insert(
            &plan.table,
            &plan.columns,
            tuples,
            plan.duplicate_clause.as_deref(),
        );

        assert_eq!(
            stmt.sql,
            "INSERT INTO `access` (`created_at`,`host`,`message`) VALUES (?,?,?),(?,?,?)"
        );
        assert_eq!(
            stmt.params,
            vec![
                "2001-09-09 01:46:40".into(),
                "web-1".into(),
                "GET /".into(),
                "2001-09-09 01:46:40".into(),
                "web-2".into(),
                mysql_async::Value::NULL,
            ]
        );
    }

    #[test]
    fn test_upsert_pipeline_appends_precomputed_clause() {
        let config: MysqlBulkConfig = serde_json::from_value(serde_json::json!({
            "database": "logs",
            "table": "users",
            "column_names": "id,name",
            "on_duplicate_key_update": true,
            "on_duplicate_update_keys": "name"
        }))
        .unwrap();
        let plan = config.compile().unwrap();
        let binder = RowBinder::new(&plan.keys, &specs(&plan, &[None, None])).unwrap();

        let ts = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let chunk = Chunk::new("users").with_event(
            ts,
            serde_json::json!({"id": 1, "name": "Ann"}),
        );
        let tuples: Vec<_> = chunk.events.iter().map(|e| binder.bind(e)).collect();

        let stmt = build_bulk_insert(
            &plan.table,
            &plan.columns,
            tuples,
            plan.duplicate_clause.as_deref(),
        );
        assert_eq!(
            stmt.sql,
            "INSERT INTO `users` (`id`,`name`) VALUES (?,?) ON DUPLICATE KEY UPDATE `name` = VALUES(`name`)"
        );
    }

    #[test]
    fn test_json_encoded_column_flows_through_pipeline() {
        let config: MysqlBulkConfig = serde_json::from_value(serde_json::json!({
            "database": "logs",
            "table": "events",
            "column_names": "meta",
            "key_names": "meta",
            "json_key_names": "meta"
        }))
        .unwrap();
        let plan = config.compile().unwrap();
        let binder = RowBinder::new(&plan.keys, &specs(&plan, &[None])).unwrap();

        let ts = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let present = LogEvent::new(ts, serde_json::json!({"meta": {"k": "v"}}));
        let absent = LogEvent::new(ts, serde_json::json!({}));

        assert_eq!(binder.bind(&present), vec!["{\"k\":\"v\"}".into()]);
        // An absent key on a JSON-encoded column binds the text "null".
        assert_eq!(binder.bind(&absent), vec!["null".into()]);
    }
}
