use std::sync::Arc;

use dispatch_server::{Config, DispatchManager, Storage, TracingSink};
use rust_decimal::Decimal;
use shared::models::{Area, Customer, Employee, EmployeeRole, RateCard, Warehouse};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    dispatch_server::logger::init_logger_with_file(
        std::env::var("LOG_LEVEL").ok().as_deref(),
        std::env::var("LOG_DIR").ok().as_deref(),
    );

    tracing::info!("Dispatch server starting...");

    let config = Config::from_env();
    std::fs::create_dir_all(&config.work_dir)?;
    let storage = Storage::open(config.db_path())?;

    let directory = Arc::new(demo_directory());
    let manager = Arc::new(DispatchManager::new(
        storage,
        directory,
        config.gateway.clone(),
        Arc::new(TracingSink),
    ));

    // Mirror committed history entries into the log until a push channel
    // to clients exists
    let mut events = manager.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => tracing::info!(event = %json, "engine event"),
                Err(err) => tracing::warn!(error = %err, "unserializable engine event"),
            }
        }
    });

    tracing::info!(
        environment = %config.environment,
        db = %config.db_path().display(),
        "dispatch server ready"
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    Ok(())
}

/// Seed reference data until the upstream admin service feeds the
/// directory.
fn demo_directory() -> dispatch_server::Directory {
    let dir = dispatch_server::Directory::new();
    dir.insert_area(Area { id: 1, name: "Ha Noi".into() });
    dir.insert_area(Area { id: 2, name: "Ho Chi Minh".into() });
    dir.insert_warehouse(Warehouse { id: 10, area_id: 1, name: "HN Hub".into() });
    dir.insert_warehouse(Warehouse { id: 20, area_id: 2, name: "HCM Hub".into() });
    dir.insert_employee(Employee {
        id: 100,
        user_id: "disp-hn".into(),
        name: "HN Dispatcher".into(),
        role: EmployeeRole::Dispatcher,
        area_id: 1,
    });
    dir.insert_employee(Employee {
        id: 200,
        user_id: "disp-hcm".into(),
        name: "HCM Dispatcher".into(),
        role: EmployeeRole::Dispatcher,
        area_id: 2,
    });
    dir.insert_employee(Employee {
        id: 101,
        user_id: "ship-hn".into(),
        name: "HN Shipper".into(),
        role: EmployeeRole::Shipper,
        area_id: 1,
    });
    dir.insert_employee(Employee {
        id: 201,
        user_id: "ship-hcm".into(),
        name: "HCM Shipper".into(),
        role: EmployeeRole::Shipper,
        area_id: 2,
    });
    dir.insert_customer(Customer {
        id: 1,
        user_id: "cust-1".into(),
        name: "Demo Customer".into(),
    });
    dir.insert_rate_card(RateCard {
        area_id: 1,
        base_price: Decimal::from(10),
        price_per_km: Decimal::from(1),
        price_per_kg: Decimal::from(2),
    });
    dir.insert_rate_card(RateCard {
        area_id: 2,
        base_price: Decimal::from(20),
        price_per_km: Decimal::from(3),
        price_per_kg: Decimal::from(4),
    });
    dir
}
