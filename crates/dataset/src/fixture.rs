//! JSON fixture loader.
//!
//! Decodes a fixture document (PascalCase members, one array per entity),
//! validates keys and references, derives `Order.TotalBill` from the
//! order's items, and produces an immutable [`EntityStore`]. All failures
//! happen here, at load time; the store never errors afterwards.

use std::collections::{BTreeMap, HashSet};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tabula_core::{Row, Value};
use tracing::debug;

use crate::store::{EntityKind, EntityStore};

/// Errors raised while loading a fixture.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("Malformed fixture JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid date text in {entity}: {text}")]
    InvalidDate { entity: &'static str, text: String },
    #[error("Duplicate key in {table}: {key}")]
    DuplicateKey { table: &'static str, key: String },
    #[error("{table}.{column} references missing key {key}")]
    DanglingReference {
        table: &'static str,
        column: &'static str,
        key: String,
    },
    #[error("Schema error: {0}")]
    Schema(#[from] tabula_core::Error),
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RootRecord {
    #[serde(default)]
    departments: Vec<DepartmentRecord>,
    #[serde(default)]
    employees: Vec<EmployeeRecord>,
    #[serde(default)]
    categories: Vec<CategoryRecord>,
    #[serde(default)]
    products: Vec<ProductRecord>,
    #[serde(default)]
    customers: Vec<CustomerRecord>,
    #[serde(default)]
    orders: Vec<OrderRecord>,
    #[serde(default)]
    order_items: Vec<OrderItemRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DepartmentRecord {
    department_id: i32,
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EmployeeRecord {
    employee_id: i32,
    full_name: String,
    department_id: i32,
    manager_id: Option<i32>,
    join_date: String,
    is_active: bool,
    salary: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CategoryRecord {
    category_id: i32,
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ProductRecord {
    product_id: i32,
    name: String,
    category_id: i32,
    price: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct CustomerRecord {
    customer_id: i32,
    name: String,
    country: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OrderRecord {
    order_id: i32,
    customer_id: i32,
    order_date: String,
    status: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OrderItemRecord {
    order_id: i32,
    product_id: i32,
    quantity: i32,
    unit_price: f64,
}

/// Parses date text as `YYYY-MM-DD[THH:MM[:SS]]`, returning epoch
/// milliseconds. Omitted time components default to zero.
fn parse_date(entity: &'static str, text: &str) -> Result<i64, FixtureError> {
    let parsed = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M"))
        .or_else(|_| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d").map(|d| {
                // Midnight; NaiveDate always has a valid midnight
                d.and_hms_opt(0, 0, 0).unwrap_or_default()
            })
        })
        .map_err(|_| FixtureError::InvalidDate {
            entity,
            text: text.to_string(),
        })?;
    Ok(parsed.and_utc().timestamp_millis())
}

fn check_unique(
    seen: &mut HashSet<i32>,
    table: &'static str,
    key: i32,
) -> Result<(), FixtureError> {
    if !seen.insert(key) {
        return Err(FixtureError::DuplicateKey {
            table,
            key: key.to_string(),
        });
    }
    Ok(())
}

fn check_reference(
    keys: &HashSet<i32>,
    table: &'static str,
    column: &'static str,
    key: i32,
) -> Result<(), FixtureError> {
    if !keys.contains(&key) {
        return Err(FixtureError::DanglingReference {
            table,
            column,
            key: key.to_string(),
        });
    }
    Ok(())
}

/// Loads a fixture document into a fresh entity store.
pub fn load_str(json: &str) -> Result<EntityStore, FixtureError> {
    let root: RootRecord = serde_json::from_str(json)?;
    let mut store = EntityStore::new()?;

    let mut department_ids = HashSet::new();
    for record in &root.departments {
        check_unique(&mut department_ids, "Departments", record.department_id)?;
        store.push(
            EntityKind::Department,
            Row::create(vec![
                Value::Int32(record.department_id),
                Value::String(record.name.clone()),
            ]),
        );
    }

    let employee_ids: HashSet<i32> = root.employees.iter().map(|e| e.employee_id).collect();
    let mut seen_employees = HashSet::new();
    for record in &root.employees {
        check_unique(&mut seen_employees, "Employees", record.employee_id)?;
        check_reference(
            &department_ids,
            "Employees",
            "DepartmentId",
            record.department_id,
        )?;
        if let Some(manager_id) = record.manager_id {
            check_reference(&employee_ids, "Employees", "ManagerId", manager_id)?;
        }
        let join_date = parse_date("Employees", &record.join_date)?;
        store.push(
            EntityKind::Employee,
            Row::create(vec![
                Value::Int32(record.employee_id),
                Value::String(record.full_name.clone()),
                Value::Int32(record.department_id),
                record.manager_id.into(),
                Value::DateTime(join_date),
                Value::Boolean(record.is_active),
                Value::Float64(record.salary),
            ]),
        );
    }

    let mut category_ids = HashSet::new();
    for record in &root.categories {
        check_unique(&mut category_ids, "Categories", record.category_id)?;
        store.push(
            EntityKind::Category,
            Row::create(vec![
                Value::Int32(record.category_id),
                Value::String(record.name.clone()),
            ]),
        );
    }

    let mut product_ids = HashSet::new();
    for record in &root.products {
        check_unique(&mut product_ids, "Products", record.product_id)?;
        check_reference(&category_ids, "Products", "CategoryId", record.category_id)?;
        store.push(
            EntityKind::Product,
            Row::create(vec![
                Value::Int32(record.product_id),
                Value::String(record.name.clone()),
                Value::Int32(record.category_id),
                Value::Float64(record.price),
            ]),
        );
    }

    let mut customer_ids = HashSet::new();
    for record in &root.customers {
        check_unique(&mut customer_ids, "Customers", record.customer_id)?;
        store.push(
            EntityKind::Customer,
            Row::create(vec![
                Value::Int32(record.customer_id),
                Value::String(record.name.clone()),
                Value::String(record.country.clone()),
            ]),
        );
    }

    let order_ids: HashSet<i32> = root.orders.iter().map(|o| o.order_id).collect();
    let mut seen_items = HashSet::new();
    let mut order_totals: BTreeMap<i32, f64> = BTreeMap::new();
    for record in &root.order_items {
        check_reference(&order_ids, "OrderItems", "OrderId", record.order_id)?;
        check_reference(&product_ids, "OrderItems", "ProductId", record.product_id)?;
        if !seen_items.insert((record.order_id, record.product_id)) {
            return Err(FixtureError::DuplicateKey {
                table: "OrderItems",
                key: format!("({}, {})", record.order_id, record.product_id),
            });
        }
        *order_totals.entry(record.order_id).or_insert(0.0) +=
            record.unit_price * record.quantity as f64;
    }

    let mut seen_orders = HashSet::new();
    for record in &root.orders {
        check_unique(&mut seen_orders, "Orders", record.order_id)?;
        check_reference(&customer_ids, "Orders", "CustomerId", record.customer_id)?;
        let order_date = parse_date("Orders", &record.order_date)?;
        let total_bill = order_totals.get(&record.order_id).copied().unwrap_or(0.0);
        store.push(
            EntityKind::Order,
            Row::create(vec![
                Value::Int32(record.order_id),
                Value::Int32(record.customer_id),
                Value::DateTime(order_date),
                Value::String(record.status.clone()),
                Value::Float64(total_bill),
            ]),
        );
    }

    for record in &root.order_items {
        store.push(
            EntityKind::OrderItem,
            Row::create(vec![
                Value::Int32(record.order_id),
                Value::Int32(record.product_id),
                Value::Int32(record.quantity),
                Value::Float64(record.unit_price),
            ]),
        );
    }

    debug!(
        departments = store.len(EntityKind::Department),
        employees = store.len(EntityKind::Employee),
        categories = store.len(EntityKind::Category),
        products = store.len(EntityKind::Product),
        customers = store.len(EntityKind::Customer),
        orders = store.len(EntityKind::Order),
        order_items = store.len(EntityKind::OrderItem),
        "fixture loaded"
    );

    Ok(store)
}
