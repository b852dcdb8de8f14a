use sql_safety_gateway::error::{
    AppError, GatewayError, config_error, file_read_error, snapshot_error
};

#[test]
fn test_kinds() {
    let cases = [
        (GatewayError::parse("bad"), "ParseError"),
        (
            GatewayError::MultipleStatements {
                count: 3
            },
            "MultipleStatementsError"
        ),
        (
            GatewayError::NotSelect {
                kind: "INSERT".to_string()
            },
            "NotSelectError"
        ),
        (
            GatewayError::ForbiddenRelation {
                name:    "secret".to_string(),
                allowed: vec!["a".to_string()]
            },
            "ForbiddenRelationError"
        ),
        (
            GatewayError::UnsupportedBackend {
                value: "oracle".to_string()
            },
            "UnsupportedBackendError"
        ),
        (GatewayError::execution("boom"), "ExecutionError")
    ];
    for (err, kind) in cases {
        assert_eq!(err.kind(), kind);
    }
}

#[test]
fn test_parse_error_with_position() {
    let err = GatewayError::parse("Expected: an expression, found: FROM at Line: 1, Column: 8");
    assert_eq!(
        err.to_string(),
        "Query parse error at line 1, column 8: Expected: an expression, found: FROM at Line: 1, Column: 8"
    );
}

#[test]
fn test_parse_error_legacy_position_format() {
    let err = GatewayError::parse("Missing semicolon at Line: 3, Column 25");
    assert!(err.to_string().starts_with("Query parse error at line 3, column 25:"));
}

#[test]
fn test_parse_error_without_position() {
    let err = GatewayError::parse("Unexpected token");
    assert_eq!(err.to_string(), "Query parse error: Unexpected token");
}

#[test]
fn test_forbidden_relation_message_lists_allowed() {
    let err = GatewayError::ForbiddenRelation {
        name:    "secret_table".to_string(),
        allowed: vec!["safe_users_v".to_string(), "orders".to_string()]
    };
    assert_eq!(
        err.to_string(),
        "relation 'secret_table' is not whitelisted (allowed: safe_users_v, orders)"
    );
}

#[test]
fn test_execution_message_scrubs_credentials() {
    let err = GatewayError::execution(
        "could not connect: host=10.0.0.5 user=admin password=hunter2 sslmode=require"
    );
    let message = err.to_string();
    assert!(!message.contains("hunter2"));
    assert!(!message.contains("10.0.0.5"));
    assert!(!message.contains("admin"));
    assert!(message.contains("[redacted]"));
}

#[test]
fn test_execution_message_keeps_first_line_only() {
    let err = GatewayError::execution("relation does not exist\nDETAIL: stack trace\n  at foo");
    assert_eq!(err.to_string(), "query execution failed: relation does not exist");
}

#[test]
fn test_execution_message_truncated() {
    let err = GatewayError::execution("x".repeat(5000));
    let GatewayError::Execution {
        message
    } = err
    else {
        panic!("expected execution error");
    };
    assert_eq!(message.len(), 200);
}

#[test]
fn test_execution_message_never_empty() {
    let err = GatewayError::execution("\n\n");
    assert_eq!(err.to_string(), "query execution failed: backend reported an error");
}

#[test]
fn test_error_body_serialization() {
    let err = GatewayError::MultipleStatements {
        count: 2
    };
    let value = serde_json::to_value(err.to_body()).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "error": {
                "kind": "MultipleStatementsError",
                "message": "expected exactly one statement, found 2"
            }
        })
    );
}

#[test]
fn test_into_app_error() {
    let rejected: AppError = GatewayError::NotSelect {
        kind: "DROP".to_string()
    }
    .into();
    let _msg = rejected.to_string();

    let failed: AppError = GatewayError::execution("timeout").into();
    let _msg = failed.to_string();
}

#[test]
fn test_helper_constructors() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let _msg = file_read_error("/path/to/rows.json", io_error).to_string();
    let _msg = config_error("row_cap must be a positive integer").to_string();
    let _msg = snapshot_error("plan.json", "expected value at line 1").to_string();
}
