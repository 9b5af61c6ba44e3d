//! Shared fixtures for the integration tests: an in-memory sqlite schema
//! mirroring the migrations, seed helpers and bearer-token minting.

#![allow(dead_code)]

use alert_tracker::api::build_router;
use alert_tracker::auth::Claims;
use alert_tracker::config::{AppConfig, AuthConfig, ReportConfig};
use alert_tracker::entity::{customer, endpoint, rule, source, user_profile};
use alert_tracker::AppResources;
use axum_test::TestServer;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, DbBackend, Statement,
};
use std::sync::Arc;

pub const TEST_SECRET: &str = "test-secret-test-secret-test-secret!";

/// Create a test database with the alert tracking tables.
pub async fn create_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.expect("connect");

    let ddl = [
        r#"CREATE TABLE customer (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            company_name TEXT NOT NULL UNIQUE,
            industry TEXT NOT NULL,
            contact_email TEXT NOT NULL
        );"#,
        r#"CREATE TABLE endpoint (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            customer_id INTEGER NOT NULL REFERENCES customer(id),
            host TEXT NOT NULL,
            ip TEXT NOT NULL,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1
        );"#,
        r#"CREATE TABLE user_profile (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            customer_id INTEGER NULL REFERENCES customer(id),
            is_analyst INTEGER NOT NULL DEFAULT 0
        );"#,
        r#"CREATE TABLE source (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL
        );"#,
        r#"CREATE TABLE rule (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL
        );"#,
        r#"CREATE TABLE mitigation_strategy (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            description TEXT NOT NULL
        );"#,
        r#"CREATE TABLE alert (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            created_at TEXT NOT NULL,
            endpoint_id INTEGER NOT NULL REFERENCES endpoint(id),
            source_id INTEGER NOT NULL REFERENCES source(id),
            customer_id INTEGER NOT NULL REFERENCES customer(id),
            validator_id INTEGER NULL REFERENCES user_profile(id),
            validated_at TEXT NULL,
            status TEXT NOT NULL DEFAULT 'open',
            closure_code TEXT NOT NULL DEFAULT 'NA',
            mitigation_strategy_id INTEGER NULL REFERENCES mitigation_strategy(id),
            mitigation TEXT NOT NULL DEFAULT 'NA',
            resolved_at TEXT NULL,
            resolver_id INTEGER NULL REFERENCES user_profile(id),
            severity TEXT NOT NULL DEFAULT 'low'
        );"#,
        r#"CREATE TABLE alert_rule (
            alert_id INTEGER NOT NULL REFERENCES alert(id),
            rule_id INTEGER NOT NULL REFERENCES rule(id),
            PRIMARY KEY (alert_id, rule_id)
        );"#,
    ];
    for statement in ddl {
        db.execute(Statement::from_string(DbBackend::Sqlite, statement))
            .await
            .expect("create table");
    }

    db
}

pub fn create_test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".into(),
        listen_addr: "127.0.0.1:0".into(),
        auth: AuthConfig {
            token_secret: TEST_SECRET.into(),
        },
        report: ReportConfig::default(),
    }
}

pub async fn test_resources() -> AppResources {
    AppResources {
        db: Arc::new(create_test_db().await),
        config: Arc::new(create_test_config()),
    }
}

pub fn test_server(resources: AppResources) -> TestServer {
    TestServer::new(build_router(resources)).expect("test server")
}

/// Mint a bearer token the way the identity provider would.
pub fn token(analyst: bool, customer_id: Option<i32>, mfa_verified: bool) -> String {
    Claims {
        exp: usize::MAX,
        user_id: 1,
        mfa_verified,
        analyst,
        customer_id,
    }
    .encode(TEST_SECRET.as_bytes())
    .expect("encode token")
}

pub async fn seed_customer(db: &DatabaseConnection, company_name: &str) -> customer::Model {
    customer::ActiveModel {
        company_name: Set(company_name.to_string()),
        industry: Set("Manufacturing".into()),
        contact_email: Set(format!("security@{}.example", company_name.to_lowercase())),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed customer")
}

pub async fn seed_endpoint(
    db: &DatabaseConnection,
    customer_id: i32,
    name: &str,
    is_active: bool,
) -> endpoint::Model {
    endpoint::ActiveModel {
        customer_id: Set(customer_id),
        host: Set(format!("{name}.internal")),
        ip: Set("10.0.0.1".into()),
        name: Set(name.to_string()),
        kind: Set("server".into()),
        is_active: Set(is_active),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed endpoint")
}

pub async fn seed_source(db: &DatabaseConnection, name: &str) -> source::Model {
    source::ActiveModel {
        name: Set(name.to_string()),
        description: Set(format!("{name} telemetry")),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed source")
}

pub async fn seed_rule(db: &DatabaseConnection, name: &str) -> rule::Model {
    rule::ActiveModel {
        name: Set(name.to_string()),
        description: Set(format!("detects {name}")),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed rule")
}

pub async fn seed_user(
    db: &DatabaseConnection,
    username: &str,
    customer_id: Option<i32>,
    is_analyst: bool,
) -> user_profile::Model {
    user_profile::ActiveModel {
        username: Set(username.to_string()),
        customer_id: Set(customer_id),
        is_analyst: Set(is_analyst),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed user")
}

/// Seed a user profile with an explicit id so tests can stamp specific
/// validator/resolver ids without tripping the foreign keys.
pub async fn seed_user_with_id(
    db: &DatabaseConnection,
    id: i32,
    username: &str,
    customer_id: Option<i32>,
    is_analyst: bool,
) -> user_profile::Model {
    user_profile::ActiveModel {
        id: Set(id),
        username: Set(username.to_string()),
        customer_id: Set(customer_id),
        is_analyst: Set(is_analyst),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed user")
}
