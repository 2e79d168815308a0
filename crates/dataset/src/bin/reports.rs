//! Runs the full report catalogue against the bundled sample fixture and
//! prints each result as a text table.

use std::error::Error;

use tabula_dataset::render::render_table;
use tabula_dataset::{load_str, reports};
use tracing_subscriber::EnvFilter;

const SAMPLE: &str = include_str!("../../data/sample.json");

fn date_ms(year: i32, month: u32, day: u32) -> i64 {
    chrono::NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or(0)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let store = load_str(SAMPLE)?;

    let catalogue = vec![
        reports::category_products_under(&store, "Electronics", 6000.0)?,
        reports::active_employees_joined_after(&store, date_ms(2022, 12, 31))?,
        reports::department_salary_rollup(&store)?,
        reports::customers_from(&store, "india")?,
        reports::products_with_prefix(&store, "M")?,
        reports::order_status_summary(&store)?,
        reports::repeat_customers_since(&store, date_ms(2025, 1, 1))?,
        reports::employee_activity_by_join_year(&store)?,
        reports::top_products_per_category(&store, 2)?,
        reports::latest_order_per_customer(&store)?,
        reports::top_earner_per_department(&store)?,
        reports::recent_order_per_busy_status(&store, date_ms(2025, 1, 1), 2)?,
    ];

    for report in &catalogue {
        println!("{}", render_table(report));
    }

    Ok(())
}
