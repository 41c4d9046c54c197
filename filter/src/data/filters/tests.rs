//! Execution tests: compiled predicates run against real databases
//!
//! SQLite runs in memory. PostgreSQL runs only when `TABULA_TEST_POSTGRES_URL`
//! points at a server; the fixture lives in a temporary table.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::Row;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use super::*;
use crate::core::constants::ENV_TEST_POSTGRES_URL;
use crate::data::sql::Dialect;

struct Fixture {
    id: &'static str,
    done: Option<bool>,
    flags: Option<&'static str>,
    score: Option<f64>,
    scores: Option<&'static str>,
    due: Option<&'static str>,
    dues: Option<&'static str>,
    name: Option<&'static str>,
    tags: Option<&'static str>,
    owner: Option<&'static str>,
    links: Option<&'static str>,
}

const ALL: &[&str] = &["r1", "r2", "r3", "r4", "r5"];

fn fixtures() -> Vec<Fixture> {
    vec![
        Fixture {
            id: "r1",
            done: Some(true),
            flags: Some("[true, false]"),
            score: Some(7.0),
            scores: Some("[5, 9]"),
            due: Some("2024-03-15T09:00:00.000Z"),
            dues: Some(r#"["2024-03-10T08:00:00.000Z"]"#),
            name: Some("alpha"),
            tags: Some(r#"["red", "blue"]"#),
            owner: Some(r#"{"id": "usr1", "title": "Ada"}"#),
            links: Some(r#"[{"id": "rec1", "title": "Invoice 1"}]"#),
        },
        Fixture {
            id: "r2",
            done: Some(false),
            flags: Some("[false]"),
            score: Some(3.0),
            scores: Some("[1]"),
            due: Some("2024-03-12T10:00:00.000Z"),
            dues: Some(r#"["2024-03-15T01:00:00.000Z"]"#),
            name: Some("Ärger"),
            tags: Some(r#"["green"]"#),
            owner: Some(r#"{"id": "usr2", "title": "Bo"}"#),
            links: Some("[]"),
        },
        Fixture {
            id: "r3",
            done: None,
            flags: None,
            score: None,
            scores: None,
            due: None,
            dues: None,
            name: None,
            tags: None,
            owner: None,
            links: None,
        },
        Fixture {
            id: "r4",
            done: Some(true),
            flags: Some("[]"),
            score: Some(5.0),
            scores: Some("[2, 6]"),
            due: Some("2024-04-01T00:00:00.000Z"),
            dues: Some("[]"),
            name: Some("Alphabet Gamma"),
            tags: Some(r#"["blue", "red"]"#),
            owner: Some(r#"{"id": "usr1", "title": "Ada"}"#),
            links: Some(
                r#"[{"id": "rec2", "title": "invoice 2"}, {"id": "rec3", "title": "Receipt"}]"#,
            ),
        },
        Fixture {
            id: "r5",
            done: Some(false),
            flags: Some("[true]"),
            score: Some(10.0),
            scores: Some("[]"),
            due: Some("2024-03-15T23:30:00.000Z"),
            dues: Some(r#"["2024-03-20T00:00:00.000Z"]"#),
            name: Some("50_% off"),
            tags: Some(r#"["red"]"#),
            owner: Some(r#"{"id": 7, "title": "Cy"}"#),
            links: Some(r#"[{"id": 9, "title": "Note"}]"#),
        },
    ]
}

fn literal(value: Option<&str>) -> String {
    value.map_or_else(|| "NULL".to_string(), |s| format!("'{}'", s.replace('\'', "''")))
}

fn insert_sql(row: &Fixture, dialect: Dialect) -> String {
    let done = match (row.done, dialect) {
        (None, _) => "NULL".to_string(),
        (Some(b), Dialect::Postgres) => if b { "TRUE" } else { "FALSE" }.to_string(),
        (Some(b), Dialect::Sqlite) => if b { "1" } else { "0" }.to_string(),
    };
    let score = row.score.map_or_else(|| "NULL".to_string(), |n| n.to_string());
    format!(
        "INSERT INTO records (id, done, flags, score, scores, due_at, dues, name, tags, owner, links) \
         VALUES ('{}', {}, {}, {}, {}, {}, {}, {}, {}, {}, {})",
        row.id,
        done,
        literal(row.flags),
        score,
        literal(row.scores),
        literal(row.due),
        literal(row.dues),
        literal(row.name),
        literal(row.tags),
        literal(row.owner),
        literal(row.links),
    )
}

fn columns() -> HashMap<String, ColumnMeta> {
    index_columns([
        ColumnMeta::new("done", "done", SemanticType::Boolean),
        ColumnMeta::new("flags", "flags", SemanticType::Boolean).multi(),
        ColumnMeta::new("score", "score", SemanticType::Number),
        ColumnMeta::new("scores", "scores", SemanticType::Number).multi(),
        ColumnMeta::new("due", "due_at", SemanticType::Datetime),
        ColumnMeta::new("dues", "dues", SemanticType::Datetime).multi(),
        ColumnMeta::new("name", "name", SemanticType::Text),
        ColumnMeta::new("tags", "tags", SemanticType::Text).multi(),
        ColumnMeta::new("owner", "owner", SemanticType::Structured).actor_reference(),
        ColumnMeta::new("links", "links", SemanticType::Structured).multi(),
    ])
}

fn ctx() -> CompileContext {
    let now = DateTime::parse_from_rfc3339("2024-03-15T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc);
    CompileContext::new()
        .with_reference_time(now)
        .with_actor("usr2")
}

fn cases() -> Vec<(&'static str, FilterNode, Vec<&'static str>)> {
    vec![
        (
            "boolean equals true",
            FilterNode::condition("done", "equals", json!(true)),
            vec!["r1", "r4"],
        ),
        (
            "boolean equals false includes null",
            FilterNode::condition("done", "equals", json!(false)),
            vec!["r2", "r3", "r5"],
        ),
        (
            "boolean array any true",
            FilterNode::condition("flags", "equals", json!(true)),
            vec!["r1", "r5"],
        ),
        (
            "boolean array none true",
            FilterNode::condition("flags", "notEquals", json!(true)),
            vec!["r2", "r3", "r4"],
        ),
        (
            "number at least",
            FilterNode::condition("score", "greaterOrEqual", json!(5)),
            vec!["r1", "r4", "r5"],
        ),
        (
            "number symbol",
            FilterNode::symbol("score", ">=", json!("5")),
            vec!["r1", "r4", "r5"],
        ),
        (
            "number not equals includes null",
            FilterNode::condition("score", "notEquals", json!(5)),
            vec!["r1", "r2", "r3", "r5"],
        ),
        (
            "number array any element",
            FilterNode::condition("scores", "greaterOrEqual", json!(5)),
            vec!["r1", "r4"],
        ),
        (
            "number array none equal includes null",
            FilterNode::condition("scores", "notEquals", json!(6)),
            vec!["r1", "r2", "r3", "r5"],
        ),
        (
            "number array any element below",
            FilterNode::condition("scores", "lessThan", json!(2)),
            vec!["r2"],
        ),
        (
            "number array empty",
            FilterNode::condition("scores", "isEmpty", serde_json::Value::Null),
            vec!["r3", "r5"],
        ),
        (
            "datetime today",
            FilterNode::condition("due", "equals", json!({ "mode": "today" })),
            vec!["r1", "r5"],
        ),
        (
            "datetime within past week",
            FilterNode::condition("due", "within", json!({ "mode": "pastWeek" })),
            vec!["r1", "r2", "r5"],
        ),
        (
            "datetime before exact date",
            FilterNode::condition(
                "due",
                "before",
                json!({ "mode": "exactDate", "exactDate": "2024-03-13" }),
            ),
            vec!["r2"],
        ),
        (
            "datetime on or after date shorthand",
            FilterNode::condition("due", "onOrAfter", json!("2024-03-15")),
            vec!["r1", "r4", "r5"],
        ),
        (
            "datetime not today includes null",
            FilterNode::condition("due", "notEquals", json!({ "mode": "today" })),
            vec!["r2", "r3", "r4"],
        ),
        (
            "datetime array within next days",
            FilterNode::condition(
                "dues",
                "within",
                json!({ "mode": "nextNumberOfDays", "numberOfDays": 5 }),
            ),
            vec!["r2", "r5"],
        ),
        (
            "datetime array after exact date",
            FilterNode::condition("dues", "after", json!("2024-03-15")),
            vec!["r5"],
        ),
        (
            "datetime array before exact date",
            FilterNode::condition("dues", "before", json!("2024-03-15")),
            vec!["r1"],
        ),
        (
            "datetime array on or before exact date",
            FilterNode::condition("dues", "onOrBefore", json!("2024-03-15")),
            vec!["r1", "r2"],
        ),
        (
            "datetime array none today includes null",
            FilterNode::condition("dues", "notEquals", json!({ "mode": "today" })),
            vec!["r1", "r3", "r4", "r5"],
        ),
        (
            "datetime array not empty",
            FilterNode::condition("dues", "isNotEmpty", serde_json::Value::Null),
            vec!["r1", "r2", "r5"],
        ),
        (
            "text contains is case-insensitive",
            FilterNode::condition("name", "contains", json!("ALPHA")),
            vec!["r1", "r4"],
        ),
        (
            "text contains escapes wildcards",
            FilterNode::condition("name", "contains", json!("_%")),
            vec!["r5"],
        ),
        (
            "text not contains includes null",
            FilterNode::condition("name", "notContains", json!("alpha")),
            vec!["r2", "r3", "r5"],
        ),
        (
            "text equals is exact",
            FilterNode::condition("name", "equals", json!("alpha")),
            vec!["r1"],
        ),
        (
            "text any of",
            FilterNode::condition("name", "anyOf", json!(["alpha", "50_% off"])),
            vec!["r1", "r5"],
        ),
        (
            "text none of includes null",
            FilterNode::condition("name", "noneOf", json!(["alpha"])),
            vec!["r2", "r3", "r4", "r5"],
        ),
        (
            "text empty",
            FilterNode::condition("name", "isEmpty", serde_json::Value::Null),
            vec!["r3"],
        ),
        (
            "text array any of",
            FilterNode::condition("tags", "anyOf", json!(["green"])),
            vec!["r2"],
        ),
        (
            "text array none of includes null",
            FilterNode::condition("tags", "noneOf", json!(["red"])),
            vec!["r2", "r3"],
        ),
        (
            "text array all of",
            FilterNode::condition("tags", "allOf", json!(["red", "blue"])),
            vec!["r1", "r4"],
        ),
        (
            "text array exactly ignores order",
            FilterNode::condition("tags", "exactly", json!(["blue", "red"])),
            vec!["r1", "r4"],
        ),
        (
            "text array empty",
            FilterNode::condition("tags", "isEmpty", serde_json::Value::Null),
            vec!["r3"],
        ),
        (
            "structured actor placeholder",
            FilterNode::condition("owner", "equals", json!("me")),
            vec!["r2"],
        ),
        (
            "structured any of",
            FilterNode::condition("owner", "anyOf", json!(["usr1"])),
            vec!["r1", "r4"],
        ),
        (
            "structured numeric id equals",
            FilterNode::condition("owner", "equals", json!(7)),
            vec!["r5"],
        ),
        (
            "structured numeric id any of text",
            FilterNode::condition("owner", "anyOf", json!(["7", "usr2"])),
            vec!["r2", "r5"],
        ),
        (
            "structured empty",
            FilterNode::condition("owner", "isEmpty", serde_json::Value::Null),
            vec!["r3"],
        ),
        (
            "structured array title contains",
            FilterNode::condition("links", "contains", json!("invoice")),
            vec!["r1", "r4"],
        ),
        (
            "structured array id any of",
            FilterNode::condition("links", "anyOf", json!(["rec3"])),
            vec!["r4"],
        ),
        (
            "structured array none equal includes null",
            FilterNode::condition("links", "notEquals", json!("rec1")),
            vec!["r2", "r3", "r4", "r5"],
        ),
        (
            "structured array none of includes null",
            FilterNode::condition("links", "noneOf", json!(["rec2"])),
            vec!["r1", "r2", "r3", "r5"],
        ),
        (
            "structured array all of",
            FilterNode::condition("links", "allOf", json!(["rec2", "rec3"])),
            vec!["r4"],
        ),
        (
            "structured array exactly",
            FilterNode::condition("links", "exactly", json!(["rec3", "rec2"])),
            vec!["r4"],
        ),
        (
            "structured array numeric id",
            FilterNode::condition("links", "anyOf", json!([9])),
            vec!["r5"],
        ),
        (
            "boolean not empty",
            FilterNode::condition("done", "isNotEmpty", serde_json::Value::Null),
            vec!["r1", "r4"],
        ),
        (
            "boolean not equals true includes null",
            FilterNode::condition("done", "notEquals", json!(true)),
            vec!["r2", "r3", "r5"],
        ),
        (
            "nested groups",
            FilterNode::and(vec![
                FilterNode::condition("score", "greaterOrEqual", json!(5)),
                FilterNode::or(vec![
                    FilterNode::condition("tags", "anyOf", json!(["green"])),
                    FilterNode::condition("name", "contains", json!("alpha")),
                ]),
            ]),
            vec!["r1", "r4"],
        ),
        (
            "vacuous conditions are ignored",
            FilterNode::and(vec![
                FilterNode::condition("score", "equals", serde_json::Value::Null),
                FilterNode::condition("tags", "anyOf", json!([])),
            ]),
            ALL.to_vec(),
        ),
    ]
}

async fn sqlite_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::query(
        "CREATE TABLE records (
            id TEXT PRIMARY KEY,
            done INTEGER,
            flags TEXT,
            score REAL,
            scores TEXT,
            due_at TEXT,
            dues TEXT,
            name TEXT,
            tags TEXT,
            owner TEXT,
            links TEXT
        )",
    )
    .execute(&pool)
    .await
    .unwrap();
    for row in fixtures() {
        sqlx::query(&insert_sql(&row, Dialect::Sqlite))
            .execute(&pool)
            .await
            .unwrap();
    }
    pool
}

async fn postgres_pool(url: &str) -> PgPool {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(url)
        .await
        .unwrap();
    sqlx::query(
        "CREATE TEMPORARY TABLE records (
            id TEXT PRIMARY KEY,
            done BOOLEAN,
            flags JSONB,
            score DOUBLE PRECISION,
            scores JSONB,
            due_at TIMESTAMPTZ,
            dues JSONB,
            name TEXT,
            tags JSONB,
            owner JSONB,
            links JSONB
        )",
    )
    .execute(&pool)
    .await
    .unwrap();
    for row in fixtures() {
        sqlx::query(&insert_sql(&row, Dialect::Postgres))
            .execute(&pool)
            .await
            .unwrap();
    }
    pool
}

fn build(compiler: &FilterCompiler, tree: &FilterNode) -> crate::data::sql::BuiltQuery {
    let mut query = compiler.query("SELECT id FROM records");
    compiler.compile(&mut query, tree, &columns(), &ctx()).unwrap();
    query.build()
}

async fn sqlite_ids(pool: &SqlitePool, tree: &FilterNode) -> Vec<String> {
    let built = build(&FilterCompiler::new(Dialect::Sqlite), tree);
    let rows = built.sqlite_query().fetch_all(pool).await.unwrap();
    let mut ids: Vec<String> = rows.iter().map(|row| row.get("id")).collect();
    ids.sort();
    ids
}

async fn postgres_ids(pool: &PgPool, tree: &FilterNode) -> Vec<String> {
    let built = build(&FilterCompiler::new(Dialect::Postgres), tree);
    let rows = built.postgres_query().fetch_all(pool).await.unwrap();
    let mut ids: Vec<String> = rows.iter().map(|row| row.get("id")).collect();
    ids.sort();
    ids
}

#[tokio::test]
async fn test_sqlite_execution() {
    let pool = sqlite_pool().await;
    for (label, tree, expected) in cases() {
        let ids = sqlite_ids(&pool, &tree).await;
        assert_eq!(ids, expected, "{}", label);
    }
}

#[tokio::test]
async fn test_sqlite_with_base_predicate() {
    let pool = sqlite_pool().await;
    let compiler = FilterCompiler::new(Dialect::Sqlite);
    let mut query = compiler.query("SELECT id FROM records");
    let score = query.bind(4.0);
    query.push_predicate(format!("score > {}", score));

    let tree = FilterNode::condition("tags", "anyOf", json!(["red"]));
    compiler.compile(&mut query, &tree, &columns(), &ctx()).unwrap();

    let rows = query.build().sqlite_query().fetch_all(&pool).await.unwrap();
    let mut ids: Vec<String> = rows.iter().map(|row| row.get("id")).collect();
    ids.sort();
    assert_eq!(ids, vec!["r1", "r4", "r5"]);
}

fn complement_pairs() -> Vec<(&'static str, &'static str, &'static str, serde_json::Value)> {
    vec![
        ("done", "equals", "notEquals", json!(true)),
        ("flags", "equals", "notEquals", json!(true)),
        ("score", "equals", "notEquals", json!(5)),
        ("scores", "equals", "notEquals", json!(6)),
        ("due", "equals", "notEquals", json!({ "mode": "today" })),
        ("dues", "equals", "notEquals", json!({ "mode": "today" })),
        ("name", "contains", "notContains", json!("a")),
        ("name", "anyOf", "noneOf", json!(["alpha", "beta"])),
        ("tags", "equals", "notEquals", json!("red")),
        ("tags", "anyOf", "noneOf", json!(["red"])),
        ("owner", "equals", "notEquals", json!(7)),
        ("owner", "anyOf", "noneOf", json!(["usr1"])),
        ("links", "contains", "notContains", json!("invoice")),
        ("links", "anyOf", "noneOf", json!(["rec2"])),
    ]
}

fn assert_partition(label: &str, mut matched: Vec<String>, complement: Vec<String>) {
    assert!(
        matched.iter().all(|id| !complement.contains(id)),
        "{} overlaps",
        label
    );
    matched.extend(complement);
    matched.sort();
    assert_eq!(matched, ALL, "{}", label);
}

#[tokio::test]
async fn test_sqlite_not_family_complements() {
    let pool = sqlite_pool().await;
    for (column, positive, negative, value) in complement_pairs() {
        let matched = sqlite_ids(
            &pool,
            &FilterNode::condition(column, positive, value.clone()),
        )
        .await;
        let complement = sqlite_ids(&pool, &FilterNode::condition(column, negative, value)).await;
        assert_partition(
            &format!("{} {} / {}", column, positive, negative),
            matched,
            complement,
        );
    }
}

#[tokio::test]
async fn test_sqlite_like_folds_ascii_only() {
    let pool = sqlite_pool().await;
    let contains = |text: &str| FilterNode::condition("name", "contains", json!(text));
    assert_eq!(sqlite_ids(&pool, &contains("ALPHABET")).await, vec!["r4"]);
    assert_eq!(sqlite_ids(&pool, &contains("Ärger")).await, vec!["r2"]);
    assert!(sqlite_ids(&pool, &contains("ärger")).await.is_empty());
}

#[tokio::test]
async fn test_postgres_execution() {
    let Ok(url) = std::env::var(ENV_TEST_POSTGRES_URL) else {
        return;
    };
    let pool = postgres_pool(&url).await;
    for (label, tree, expected) in cases() {
        let ids = postgres_ids(&pool, &tree).await;
        assert_eq!(ids, expected, "{}", label);
    }
}

#[tokio::test]
async fn test_postgres_not_family_complements() {
    let Ok(url) = std::env::var(ENV_TEST_POSTGRES_URL) else {
        return;
    };
    let pool = postgres_pool(&url).await;
    for (column, positive, negative, value) in complement_pairs() {
        let matched = postgres_ids(
            &pool,
            &FilterNode::condition(column, positive, value.clone()),
        )
        .await;
        let complement = postgres_ids(&pool, &FilterNode::condition(column, negative, value)).await;
        assert_partition(
            &format!("{} {} / {}", column, positive, negative),
            matched,
            complement,
        );
    }
}
