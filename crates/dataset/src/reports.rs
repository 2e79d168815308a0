//! Canned report catalogue.
//!
//! Each report is one staged pipeline over the entity store, returning a
//! [`Report`] with a title, column headers and the materialized result
//! relation. Parameters (dates, prefixes, thresholds) are arguments so
//! the same shapes run against any fixture.

use std::collections::HashSet;

use chrono::Datelike;
use tabula_core::{DataType, Value};
use tabula_query::ast::predicate::PredicateClone;
use tabula_query::ast::{ColumnRef, CombinedPredicate, SortKey, ValuePredicate};
use tabula_query::executor::{AggregateSpec, Relation};
use tabula_query::QueryError;
use tracing::debug;

use crate::store::{columns, EntityKind, EntityStore};

/// A finished report: title, column headers and result rows.
pub struct Report {
    pub title: String,
    pub columns: Vec<&'static str>,
    pub relation: Relation,
}

fn col(table: &str, column: &str, index: usize) -> ColumnRef {
    ColumnRef::new(table, column, index)
}

/// Products of a named category under a price cap, cheapest first.
pub fn category_products_under(
    store: &EntityStore,
    category: &str,
    price_cap: f64,
) -> Result<Report, QueryError> {
    // Products ⋈ Categories; category name lands at index 5
    let relation = store
        .query(EntityKind::Product)
        .join(
            store.query(EntityKind::Category),
            columns::product::CATEGORY_ID,
            columns::category::ID,
        )?
        .filter(CombinedPredicate::and(vec![
            Box::new(ValuePredicate::eq_ignore_case(
                col("Categories", "Name", 5),
                category,
            )),
            Box::new(ValuePredicate::lt(
                col("Products", "Price", columns::product::PRICE),
                Value::Float64(price_cap),
            )),
        ]))
        .order_by(vec![
            SortKey::asc(columns::product::PRICE),
            SortKey::asc(columns::product::NAME),
        ])?
        .select(vec![
            columns::product::ID,
            columns::product::NAME,
            columns::product::PRICE,
        ])?
        .into_relation();

    Ok(Report {
        title: format!("{} products under {}", category, price_cap),
        columns: vec!["ProductId", "Name", "Price"],
        relation,
    })
}

/// Active employees who joined strictly after the given date.
pub fn active_employees_joined_after(
    store: &EntityStore,
    since_ms: i64,
) -> Result<Report, QueryError> {
    let relation = store
        .query(EntityKind::Employee)
        .filter(CombinedPredicate::and(vec![
            Box::new(ValuePredicate::eq(
                col("Employees", "IsActive", columns::employee::IS_ACTIVE),
                Value::Boolean(true),
            )),
            Box::new(ValuePredicate::gt(
                col("Employees", "JoinDate", columns::employee::JOIN_DATE),
                Value::DateTime(since_ms),
            )),
        ]))
        .order_by(vec![SortKey::asc(columns::employee::JOIN_DATE)])?
        .select(vec![
            columns::employee::ID,
            columns::employee::FULL_NAME,
            columns::employee::JOIN_DATE,
        ])?
        .into_relation();

    Ok(Report {
        title: "Active employees by join date".into(),
        columns: vec!["EmployeeId", "FullName", "JoinDate"],
        relation,
    })
}

/// Per-department head count, average and highest salary. Departments
/// with no employees are retained with count 0 and no-value aggregates.
pub fn department_salary_rollup(store: &EntityStore) -> Result<Report, QueryError> {
    // Departments LEFT ⋈ Employees; employee columns shift by 2
    let employee_id = 2 + columns::employee::ID;
    let salary = 2 + columns::employee::SALARY;

    let relation = store
        .query(EntityKind::Department)
        .left_join(
            store.query(EntityKind::Employee),
            columns::department::ID,
            columns::employee::DEPARTMENT_ID,
        )?
        .group_by(
            vec![columns::department::ID, columns::department::NAME],
            vec![
                // Non-null EmployeeId: an unmatched padded row counts 0
                AggregateSpec::count_column(employee_id),
                AggregateSpec::avg(salary),
                AggregateSpec::max(salary),
            ],
        )?
        .order_by(vec![SortKey::asc(1)])?
        .select(vec![1, 2, 3, 4])?
        .into_relation();

    Ok(Report {
        title: "Department salary roll-up".into(),
        columns: vec!["Department", "Employees", "AvgSalary", "MaxSalary"],
        relation,
    })
}

/// Customers from a country, matched case-insensitively.
pub fn customers_from(store: &EntityStore, country: &str) -> Result<Report, QueryError> {
    let relation = store
        .query(EntityKind::Customer)
        .filter(ValuePredicate::eq_ignore_case(
            col("Customers", "Country", columns::customer::COUNTRY),
            country,
        ))
        .order_by(vec![SortKey::asc(columns::customer::NAME)])?
        .into_relation();

    Ok(Report {
        title: format!("Customers from {}", country),
        columns: vec!["CustomerId", "Name", "Country"],
        relation,
    })
}

/// Products whose name starts with a prefix, case-insensitively.
pub fn products_with_prefix(store: &EntityStore, prefix: &str) -> Result<Report, QueryError> {
    let relation = store
        .query(EntityKind::Product)
        .filter(ValuePredicate::starts_with(
            col("Products", "Name", columns::product::NAME),
            prefix,
        ))
        .order_by(vec![SortKey::asc(columns::product::NAME)])?
        .select(vec![
            columns::product::ID,
            columns::product::NAME,
            columns::product::PRICE,
        ])?
        .into_relation();

    Ok(Report {
        title: format!("Products starting with '{}'", prefix),
        columns: vec!["ProductId", "Name", "Price"],
        relation,
    })
}

/// Order count and date range per status, busiest statuses first.
pub fn order_status_summary(store: &EntityStore) -> Result<Report, QueryError> {
    let relation = store
        .query(EntityKind::Order)
        .group_by(
            vec![columns::order::STATUS],
            vec![
                AggregateSpec::count(),
                AggregateSpec::min(columns::order::ORDER_DATE),
                AggregateSpec::max(columns::order::ORDER_DATE),
            ],
        )?
        .order_by(vec![SortKey::desc(1), SortKey::asc(0)])?
        .into_relation();

    Ok(Report {
        title: "Orders per status".into(),
        columns: vec!["Status", "TotalOrders", "EarliestOrder", "LatestOrder"],
        relation,
    })
}

/// Customers with at least two orders since the given date, most
/// recently active first.
pub fn repeat_customers_since(
    store: &EntityStore,
    since_ms: i64,
) -> Result<Report, QueryError> {
    let relation = store
        .query(EntityKind::Order)
        .filter(ValuePredicate::ge(
            col("Orders", "OrderDate", columns::order::ORDER_DATE),
            Value::DateTime(since_ms),
        ))
        .group_by(
            vec![columns::order::CUSTOMER_ID],
            vec![
                AggregateSpec::count(),
                AggregateSpec::min(columns::order::ORDER_DATE),
                AggregateSpec::max(columns::order::ORDER_DATE),
            ],
        )?
        .having(ValuePredicate::ge(
            col("Orders", "TotalOrders", 1),
            Value::Int64(2),
        ))
        .order_by(vec![SortKey::desc(3), SortKey::asc(0)])?
        .into_relation();

    Ok(Report {
        title: "Repeat customers".into(),
        columns: vec!["CustomerId", "TotalOrders", "FirstOrder", "LastOrder"],
        relation,
    })
}

/// Active/inactive salary profile per join year. Only years with at
/// least one employee on each side survive; the conditional averages and
/// maxima read their own sub-view of the year's employees.
pub fn employee_activity_by_join_year(store: &EntityStore) -> Result<Report, QueryError> {
    let active = || -> Box<dyn PredicateClone> {
        Box::new(ValuePredicate::eq(
            col("Employees", "IsActive", 1),
            Value::Boolean(true),
        ))
    };
    let inactive = || -> Box<dyn PredicateClone> {
        Box::new(ValuePredicate::eq(
            col("Employees", "IsActive", 1),
            Value::Boolean(false),
        ))
    };

    let relation = store
        .query(EntityKind::Employee)
        // Derive (JoinYear, IsActive, Salary)
        .map(
            vec![DataType::Int32, DataType::Boolean, DataType::Float64],
            |entry| {
                let year = entry
                    .get_field(columns::employee::JOIN_DATE)
                    .and_then(|v| v.as_datetime())
                    .and_then(chrono::DateTime::from_timestamp_millis)
                    .map(|dt| Value::Int32(dt.year()))
                    .unwrap_or(Value::Null);
                vec![
                    year,
                    entry
                        .get_field(columns::employee::IS_ACTIVE)
                        .cloned()
                        .unwrap_or(Value::Null),
                    entry
                        .get_field(columns::employee::SALARY)
                        .cloned()
                        .unwrap_or(Value::Null),
                ]
            },
        )
        .group_by(
            vec![0],
            vec![
                AggregateSpec::count_if(active()),
                AggregateSpec::count_if(inactive()),
                AggregateSpec::avg_if(2, active()),
                AggregateSpec::max_if(2, inactive()),
            ],
        )?
        .having(CombinedPredicate::and(vec![
            Box::new(ValuePredicate::ge(
                col("Employees", "ActiveCount", 1),
                Value::Int64(1),
            )),
            Box::new(ValuePredicate::ge(
                col("Employees", "InactiveCount", 2),
                Value::Int64(1),
            )),
        ]))
        .order_by(vec![SortKey::asc(0)])?
        .into_relation();

    Ok(Report {
        title: "Salary profile per join year".into(),
        columns: vec![
            "Year",
            "ActiveCount",
            "InactiveCount",
            "AvgSalaryActive",
            "MaxSalaryInactive",
        ],
        relation,
    })
}

/// The N most expensive products of every category.
pub fn top_products_per_category(store: &EntityStore, n: usize) -> Result<Report, QueryError> {
    let relation = store
        .query(EntityKind::Product)
        .top_n_per_group(
            vec![columns::product::CATEGORY_ID],
            vec![
                SortKey::desc(columns::product::PRICE),
                SortKey::asc(columns::product::NAME),
            ],
            n,
        )?
        .order_by(vec![
            SortKey::asc(columns::product::CATEGORY_ID),
            SortKey::desc(columns::product::PRICE),
            SortKey::asc(columns::product::NAME),
        ])?
        .select(vec![
            columns::product::CATEGORY_ID,
            columns::product::ID,
            columns::product::NAME,
            columns::product::PRICE,
        ])?
        .into_relation();

    Ok(Report {
        title: format!("Top {} products per category", n),
        columns: vec!["CategoryId", "ProductId", "Name", "Price"],
        relation,
    })
}

/// Every customer's most recent order.
pub fn latest_order_per_customer(store: &EntityStore) -> Result<Report, QueryError> {
    let relation = store
        .query(EntityKind::Order)
        .top_n_per_group(
            vec![columns::order::CUSTOMER_ID],
            vec![SortKey::desc(columns::order::ORDER_DATE)],
            1,
        )?
        .order_by(vec![SortKey::asc(columns::order::CUSTOMER_ID)])?
        .select(vec![
            columns::order::CUSTOMER_ID,
            columns::order::ID,
            columns::order::ORDER_DATE,
            columns::order::STATUS,
        ])?
        .into_relation();

    Ok(Report {
        title: "Latest order per customer".into(),
        columns: vec!["CustomerId", "OrderId", "OrderDate", "Status"],
        relation,
    })
}

/// The single highest-paid employee of every department. Ties resolve
/// to the latest join date, then the lowest employee id.
pub fn top_earner_per_department(store: &EntityStore) -> Result<Report, QueryError> {
    let relation = store
        .query(EntityKind::Employee)
        .top_n_per_group(
            vec![columns::employee::DEPARTMENT_ID],
            vec![
                SortKey::desc(columns::employee::SALARY),
                SortKey::desc(columns::employee::JOIN_DATE),
                SortKey::asc(columns::employee::ID),
            ],
            1,
        )?
        .order_by(vec![
            SortKey::asc(columns::employee::DEPARTMENT_ID),
            SortKey::desc(columns::employee::SALARY),
        ])?
        .select(vec![
            columns::employee::DEPARTMENT_ID,
            columns::employee::ID,
            columns::employee::FULL_NAME,
            columns::employee::SALARY,
            columns::employee::JOIN_DATE,
        ])?
        .into_relation();

    Ok(Report {
        title: "Top earner per department".into(),
        columns: vec!["DepartmentId", "EmployeeId", "FullName", "Salary", "JoinDate"],
        relation,
    })
}

/// The most recent order of every busy status: statuses with at least
/// `min_orders` orders since the given date. Ties resolve to the higher
/// order id.
pub fn recent_order_per_busy_status(
    store: &EntityStore,
    since_ms: i64,
    min_orders: i64,
) -> Result<Report, QueryError> {
    let since = ValuePredicate::ge(
        col("Orders", "OrderDate", columns::order::ORDER_DATE),
        Value::DateTime(since_ms),
    );

    // First pass: which statuses are busy enough
    let busy = store
        .query(EntityKind::Order)
        .filter(since.clone())
        .group_by(vec![columns::order::STATUS], vec![AggregateSpec::count()])?
        .having(ValuePredicate::ge(
            col("Orders", "TotalOrders", 1),
            Value::Int64(min_orders),
        ))
        .into_relation();

    let busy_statuses: HashSet<String> = busy
        .iter()
        .filter_map(|e| e.get_field(0).and_then(|v| v.as_str()).map(String::from))
        .collect();
    debug!(statuses = busy_statuses.len(), "busy statuses resolved");

    // Second pass: latest order within each surviving status
    let relation = store
        .query(EntityKind::Order)
        .filter(since)
        .filter_with(|entry| {
            entry
                .get_field(columns::order::STATUS)
                .and_then(|v| v.as_str())
                .map(|s| busy_statuses.contains(s))
                .unwrap_or(false)
        })
        .top_n_per_group(
            vec![columns::order::STATUS],
            vec![
                SortKey::desc(columns::order::ORDER_DATE),
                SortKey::desc(columns::order::ID),
            ],
            1,
        )?
        .order_by(vec![SortKey::asc(columns::order::STATUS)])?
        .select(vec![
            columns::order::STATUS,
            columns::order::ID,
            columns::order::CUSTOMER_ID,
            columns::order::ORDER_DATE,
        ])?
        .into_relation();

    Ok(Report {
        title: "Most recent order per busy status".into(),
        columns: vec!["Status", "OrderId", "CustomerId", "OrderDate"],
        relation,
    })
}
