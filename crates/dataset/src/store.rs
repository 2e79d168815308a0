//! Entity store: the seven entity schemas and their loaded rows.
//!
//! The store is built once by the fixture loader and immutable afterwards.
//! Queries take a snapshot [`Relation`] per entity; point lookups go
//! through `by_key` / `by_composite_key` and return `None` for normal
//! absence.

use std::rc::Rc;

use tabula_core::schema::{Table, TableBuilder};
use tabula_core::{DataType, Result, Row, Value};
use tabula_query::executor::Relation;
use tabula_query::Query;

/// The seven entity kinds of the dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Department,
    Employee,
    Category,
    Product,
    Customer,
    Order,
    OrderItem,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Department,
        EntityKind::Employee,
        EntityKind::Category,
        EntityKind::Product,
        EntityKind::Customer,
        EntityKind::Order,
        EntityKind::OrderItem,
    ];

    fn index(self) -> usize {
        match self {
            EntityKind::Department => 0,
            EntityKind::Employee => 1,
            EntityKind::Category => 2,
            EntityKind::Product => 3,
            EntityKind::Customer => 4,
            EntityKind::Order => 5,
            EntityKind::OrderItem => 6,
        }
    }
}

/// Column index constants, one module per entity.
pub mod columns {
    pub mod department {
        pub const ID: usize = 0;
        pub const NAME: usize = 1;
    }

    pub mod employee {
        pub const ID: usize = 0;
        pub const FULL_NAME: usize = 1;
        pub const DEPARTMENT_ID: usize = 2;
        pub const MANAGER_ID: usize = 3;
        pub const JOIN_DATE: usize = 4;
        pub const IS_ACTIVE: usize = 5;
        pub const SALARY: usize = 6;
    }

    pub mod category {
        pub const ID: usize = 0;
        pub const NAME: usize = 1;
    }

    pub mod product {
        pub const ID: usize = 0;
        pub const NAME: usize = 1;
        pub const CATEGORY_ID: usize = 2;
        pub const PRICE: usize = 3;
    }

    pub mod customer {
        pub const ID: usize = 0;
        pub const NAME: usize = 1;
        pub const COUNTRY: usize = 2;
    }

    pub mod order {
        pub const ID: usize = 0;
        pub const CUSTOMER_ID: usize = 1;
        pub const ORDER_DATE: usize = 2;
        pub const STATUS: usize = 3;
        pub const TOTAL_BILL: usize = 4;
    }

    pub mod order_item {
        pub const ORDER_ID: usize = 0;
        pub const PRODUCT_ID: usize = 1;
        pub const QUANTITY: usize = 2;
        pub const UNIT_PRICE: usize = 3;
    }
}

/// One entity collection: schema plus loaded rows.
#[derive(Debug)]
struct EntityTable {
    schema: Table,
    rows: Vec<Rc<Row>>,
}

/// Immutable store of all seven entity collections.
#[derive(Debug)]
pub struct EntityStore {
    tables: Vec<EntityTable>,
}

impl EntityStore {
    /// Creates an empty store with all schemas built.
    pub fn new() -> Result<Self> {
        let tables = build_schemas()?
            .into_iter()
            .map(|schema| EntityTable {
                schema,
                rows: Vec::new(),
            })
            .collect();
        Ok(Self { tables })
    }

    /// Appends a row to an entity collection. Only the fixture loader
    /// writes; it validates keys and references before calling this.
    pub(crate) fn push(&mut self, kind: EntityKind, row: Row) {
        self.tables[kind.index()].rows.push(Rc::new(row));
    }

    /// Returns the schema of an entity kind.
    pub fn schema(&self, kind: EntityKind) -> &Table {
        &self.tables[kind.index()].schema
    }

    /// Returns the number of loaded rows for an entity kind.
    pub fn len(&self, kind: EntityKind) -> usize {
        self.tables[kind.index()].rows.len()
    }

    /// Returns true if the entity collection holds no rows.
    pub fn is_empty(&self, kind: EntityKind) -> bool {
        self.tables[kind.index()].rows.is_empty()
    }

    /// Snapshot of an entity collection as a relation.
    pub fn relation(&self, kind: EntityKind) -> Relation {
        let table = &self.tables[kind.index()];
        let mut relation = Relation::from_rows(
            table.rows.clone(),
            vec![table.schema.name().to_string()],
        );
        // An empty collection still has the schema's width
        relation.column_count = table.schema.columns().len();
        relation
    }

    /// Starts a staged query over an entity collection, with column types
    /// taken from the schema.
    pub fn query(&self, kind: EntityKind) -> Query {
        let types: Vec<DataType> = self
            .schema(kind)
            .columns()
            .iter()
            .map(|c| c.data_type())
            .collect();
        Query::new(self.relation(kind), types)
    }

    /// Primary-key lookup. `None` is normal absence, never an error.
    pub fn by_key(&self, kind: EntityKind, key: &Value) -> Option<Rc<Row>> {
        let table = &self.tables[kind.index()];
        let pk = *table.schema.primary_key_indices().first()?;
        table
            .rows
            .iter()
            .find(|row| row.get(pk) == Some(key))
            .cloned()
    }

    /// Composite-primary-key lookup (OrderItem).
    pub fn by_composite_key(&self, kind: EntityKind, key: &[Value]) -> Option<Rc<Row>> {
        let table = &self.tables[kind.index()];
        let pk_indices = table.schema.primary_key_indices();
        if pk_indices.len() != key.len() {
            return None;
        }
        table
            .rows
            .iter()
            .find(|row| {
                pk_indices
                    .iter()
                    .zip(key)
                    .all(|(&idx, k)| row.get(idx) == Some(k))
            })
            .cloned()
    }
}

fn build_schemas() -> Result<Vec<Table>> {
    let departments = TableBuilder::new("Departments")?
        .add_column("DepartmentId", DataType::Int32)?
        .add_column("Name", DataType::String)?
        .primary_key(&["DepartmentId"])?
        .build()?;

    let employees = TableBuilder::new("Employees")?
        .add_column("EmployeeId", DataType::Int32)?
        .add_column("FullName", DataType::String)?
        .add_column("DepartmentId", DataType::Int32)?
        .add_nullable_column("ManagerId", DataType::Int32)?
        .add_column("JoinDate", DataType::DateTime)?
        .add_column("IsActive", DataType::Boolean)?
        .add_column("Salary", DataType::Float64)?
        .primary_key(&["EmployeeId"])?
        .foreign_key("DepartmentId", "Departments", "DepartmentId")?
        .foreign_key("ManagerId", "Employees", "EmployeeId")?
        .build()?;

    let categories = TableBuilder::new("Categories")?
        .add_column("CategoryId", DataType::Int32)?
        .add_column("Name", DataType::String)?
        .primary_key(&["CategoryId"])?
        .build()?;

    let products = TableBuilder::new("Products")?
        .add_column("ProductId", DataType::Int32)?
        .add_column("Name", DataType::String)?
        .add_column("CategoryId", DataType::Int32)?
        .add_column("Price", DataType::Float64)?
        .primary_key(&["ProductId"])?
        .foreign_key("CategoryId", "Categories", "CategoryId")?
        .build()?;

    let customers = TableBuilder::new("Customers")?
        .add_column("CustomerId", DataType::Int32)?
        .add_column("Name", DataType::String)?
        .add_column("Country", DataType::String)?
        .primary_key(&["CustomerId"])?
        .build()?;

    let orders = TableBuilder::new("Orders")?
        .add_column("OrderId", DataType::Int32)?
        .add_column("CustomerId", DataType::Int32)?
        .add_column("OrderDate", DataType::DateTime)?
        .add_column("Status", DataType::String)?
        .add_column("TotalBill", DataType::Float64)?
        .primary_key(&["OrderId"])?
        .foreign_key("CustomerId", "Customers", "CustomerId")?
        .build()?;

    let order_items = TableBuilder::new("OrderItems")?
        .add_column("OrderId", DataType::Int32)?
        .add_column("ProductId", DataType::Int32)?
        .add_column("Quantity", DataType::Int32)?
        .add_column("UnitPrice", DataType::Float64)?
        .primary_key(&["OrderId", "ProductId"])?
        .foreign_key("OrderId", "Orders", "OrderId")?
        .foreign_key("ProductId", "Products", "ProductId")?
        .build()?;

    Ok(vec![
        departments,
        employees,
        categories,
        products,
        customers,
        orders,
        order_items,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schemas_build() {
        let store = EntityStore::new().unwrap();
        assert_eq!(store.schema(EntityKind::Employee).columns().len(), 7);
        assert_eq!(
            store
                .schema(EntityKind::OrderItem)
                .primary_key_indices(),
            vec![0, 1]
        );
        assert!(store
            .schema(EntityKind::Employee)
            .get_column("ManagerId")
            .unwrap()
            .is_nullable());
    }

    #[test]
    fn test_by_key_lookup() {
        let mut store = EntityStore::new().unwrap();
        store.push(
            EntityKind::Department,
            Row::create(vec![Value::Int32(1), Value::String("Engineering".into())]),
        );

        let found = store.by_key(EntityKind::Department, &Value::Int32(1));
        assert!(found.is_some());
        assert_eq!(
            found.unwrap().get(columns::department::NAME),
            Some(&Value::String("Engineering".into()))
        );
        assert!(store
            .by_key(EntityKind::Department, &Value::Int32(99))
            .is_none());
    }

    #[test]
    fn test_by_composite_key_lookup() {
        let mut store = EntityStore::new().unwrap();
        store.push(
            EntityKind::OrderItem,
            Row::create(vec![
                Value::Int32(101),
                Value::Int32(1),
                Value::Int32(2),
                Value::Float64(500.0),
            ]),
        );

        let found = store.by_composite_key(
            EntityKind::OrderItem,
            &[Value::Int32(101), Value::Int32(1)],
        );
        assert!(found.is_some());
        assert!(store
            .by_composite_key(EntityKind::OrderItem, &[Value::Int32(101), Value::Int32(9)])
            .is_none());
        // Wrong key arity misses rather than erroring
        assert!(store
            .by_composite_key(EntityKind::OrderItem, &[Value::Int32(101)])
            .is_none());
    }

    #[test]
    fn test_relation_keeps_schema_width_when_empty() {
        let store = EntityStore::new().unwrap();
        let relation = store.relation(EntityKind::Order);
        assert!(relation.is_empty());
        assert_eq!(relation.column_count, 5);
    }

    #[test]
    fn test_query_types_follow_schema() {
        let store = EntityStore::new().unwrap();
        let q = store.query(EntityKind::Product);
        assert_eq!(
            q.types(),
            &[
                DataType::Int32,
                DataType::String,
                DataType::Int32,
                DataType::Float64
            ]
        );
    }
}
