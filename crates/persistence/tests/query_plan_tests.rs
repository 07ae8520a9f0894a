//! Query plan integration tests.
//!
//! Parse a query string, build a plan and run it on the in-memory table.

mod common;

use serde_json::{Value, json};

use taskdesk_persistence::config::PlanConfig;
use taskdesk_persistence::core::PlanExecutor;
use taskdesk_persistence::search::{FilterParser, QueryPlanBuilder, parse_filters};
use taskdesk_persistence::types::{DEFAULT_PAGE_SIZE, FilterValue, PageWindow, Predicate};

use common::{task_schema, task_table};

fn plan_for(query: &str) -> taskdesk_persistence::types::QueryPlan {
    let schema = task_schema();
    let filters = FilterParser::with_schema(&schema).parse(query).unwrap();
    QueryPlanBuilder::for_schema("task", &schema)
        .from_filters(filters)
        .build()
}

fn ids(rows: &[Value]) -> Vec<i64> {
    rows.iter().filter_map(|row| row["id"].as_i64()).collect()
}

// ============================================================================
// Pagination
// ============================================================================

#[test]
fn test_page_two_uses_default_page_size() {
    let plan = plan_for("page=2");
    assert_eq!(
        plan.window(),
        Some(PageWindow::new(DEFAULT_PAGE_SIZE, DEFAULT_PAGE_SIZE))
    );
}

#[test]
fn test_page_wins_over_offset() {
    let plan = plan_for("page=2&offset=999");
    assert_eq!(plan.window().unwrap().offset, DEFAULT_PAGE_SIZE);
}

#[test]
fn test_page_with_explicit_limit() {
    let plan = plan_for("page=3&limit=5");
    assert_eq!(plan.window(), Some(PageWindow::new(10, 5)));
}

#[test]
fn test_configured_page_size_and_cap() {
    let schema = task_schema();
    let config = PlanConfig {
        default_page_size: 10,
        max_page_size: Some(50),
    };
    let filters = parse_filters("page=2", Some(&schema)).unwrap();
    let plan = QueryPlanBuilder::for_schema("task", &schema)
        .with_config(config)
        .from_filters(filters)
        .build();
    assert_eq!(plan.window(), Some(PageWindow::new(10, 10)));

    let filters = parse_filters("limit=500", Some(&schema)).unwrap();
    let plan = QueryPlanBuilder::for_schema("task", &schema)
        .with_config(config)
        .from_filters(filters)
        .build();
    assert_eq!(plan.window().unwrap().limit, 50);
}

// ============================================================================
// Predicates
// ============================================================================

#[test]
fn test_in_values_merge_into_one_predicate() {
    let plan = plan_for("age_in=18,19,20");
    assert_eq!(
        plan.predicates(),
        [Predicate::is_in("age", [18_i64, 19, 20])]
    );
}

#[test]
fn test_undeclared_fields_never_reach_the_plan() {
    let plan = plan_for("owner_eq=bob&age_eq=20");
    assert_eq!(plan.predicates(), [Predicate::eq("age", 20_i64)]);
}

#[test]
fn test_build_is_repeatable() {
    let schema = task_schema();
    let builder = QueryPlanBuilder::for_schema("task", &schema)
        .from_filters(parse_filters("age_gt=18&orderby=title", Some(&schema)).unwrap());
    let first = builder.build();
    let second = builder.build();
    assert_eq!(first, second);
    assert_eq!(second.predicates().len(), 1);
}

#[test]
fn test_plan_round_trips_through_json() {
    let plan = plan_for("title_startswith=Q&age_nin=1,2&valid_until_isnull=false&orderby=-age");
    let json = serde_json::to_string(&plan).unwrap();
    let back: taskdesk_persistence::types::QueryPlan = serde_json::from_str(&json).unwrap();
    assert_eq!(back, plan);
}

// ============================================================================
// Execution
// ============================================================================

#[tokio::test]
async fn test_select_executes_against_rows() {
    let plan = plan_for("title_startswith=Quarterly&orderby=-age");
    let outcome = task_table().execute(&plan).await.unwrap();
    assert_eq!(ids(outcome.rows().unwrap()), [3, 1]);
}

#[tokio::test]
async fn test_datetime_filter_compares_instants() {
    let plan = plan_for("valid_until_lt=2023-04-02T00:00:00+00:00");
    let outcome = task_table().execute(&plan).await.unwrap();
    assert_eq!(ids(outcome.rows().unwrap()), [3]);
}

#[tokio::test]
async fn test_isnull_and_negated_text() {
    let plan = plan_for("valid_until_isnull=true&title_ncontains=notes");
    let outcome = task_table().execute(&plan).await.unwrap();
    assert_eq!(ids(outcome.rows().unwrap()), [4]);
}

#[tokio::test]
async fn test_update_plan() {
    let schema = task_schema();
    let table = task_table();
    let plan = QueryPlanBuilder::for_schema("task", &schema)
        .update()
        .set("done", true)
        .from_filters(parse_filters("age_lt=30", Some(&schema)).unwrap())
        .build();
    assert!(plan.window().is_none());

    let outcome = table.execute(&plan).await.unwrap();
    assert_eq!(outcome.affected(), Some(2));
    let done: Vec<Value> = table.rows().into_iter().map(|r| r["done"].clone()).collect();
    assert_eq!(done, [json!(false), json!(true), json!(false), json!(true)]);
}

#[tokio::test]
async fn test_delete_plan() {
    let schema = task_schema();
    let table = task_table();
    let plan = QueryPlanBuilder::for_schema("task", &schema)
        .delete()
        .from_filters(parse_filters("group_id_eq=acme", Some(&schema)).unwrap())
        .build();

    let outcome = table.execute(&plan).await.unwrap();
    assert_eq!(outcome.affected(), Some(2));
    assert_eq!(ids(&table.rows()), [3, 4]);
}

#[test]
fn test_filter_values_in_plan_are_typed() {
    let plan = plan_for("score_gte=4.5");
    match &plan.predicates()[0] {
        Predicate::Compare { value, .. } => assert_eq!(value, &FilterValue::Float(4.5)),
        other => panic!("unexpected predicate {}", other),
    }
}
