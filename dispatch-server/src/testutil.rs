//! Shared test fixtures: a seeded directory, actors for every role and
//! order builders used across the action and manager tests.

use rust_decimal::Decimal;
use shared::models::{Actor, Area, Customer, Employee, EmployeeRole, RateCard, Role, Warehouse};
use shared::order::{Order, OrderStatus, Payer, PaymentMethod, PaymentStatus};

use crate::directory::Directory;
use crate::orders::CommandMetadata;

pub const AREA_HN: u64 = 1;
pub const AREA_HCM: u64 = 2;
pub const WAREHOUSE_HN: u64 = 10;
pub const WAREHOUSE_HCM: u64 = 20;
pub const DISPATCHER_HN: u64 = 100;
pub const DISPATCHER_HCM: u64 = 200;
pub const SHIPPER_HN: u64 = 101;
pub const SHIPPER_HCM: u64 = 201;
pub const CUSTOMER: u64 = 1;

/// 2025-08-30 00:00:00 UTC
pub const NOW: i64 = 1_756_512_000_000;

pub fn directory() -> Directory {
    let dir = Directory::new();
    dir.insert_area(Area { id: AREA_HN, name: "Ha Noi".into() });
    dir.insert_area(Area { id: AREA_HCM, name: "Ho Chi Minh".into() });
    dir.insert_warehouse(Warehouse { id: WAREHOUSE_HN, area_id: AREA_HN, name: "HN Hub".into() });
    dir.insert_warehouse(Warehouse { id: WAREHOUSE_HCM, area_id: AREA_HCM, name: "HCM Hub".into() });
    dir.insert_employee(Employee {
        id: DISPATCHER_HN,
        user_id: "disp-hn".into(),
        name: "HN Dispatcher".into(),
        role: EmployeeRole::Dispatcher,
        area_id: AREA_HN,
    });
    dir.insert_employee(Employee {
        id: DISPATCHER_HCM,
        user_id: "disp-hcm".into(),
        name: "HCM Dispatcher".into(),
        role: EmployeeRole::Dispatcher,
        area_id: AREA_HCM,
    });
    dir.insert_employee(Employee {
        id: SHIPPER_HN,
        user_id: "ship-hn".into(),
        name: "HN Shipper".into(),
        role: EmployeeRole::Shipper,
        area_id: AREA_HN,
    });
    dir.insert_employee(Employee {
        id: SHIPPER_HCM,
        user_id: "ship-hcm".into(),
        name: "HCM Shipper".into(),
        role: EmployeeRole::Shipper,
        area_id: AREA_HCM,
    });
    dir.insert_customer(Customer {
        id: CUSTOMER,
        user_id: "cust-1".into(),
        name: "Customer One".into(),
    });
    dir.insert_rate_card(RateCard {
        area_id: AREA_HN,
        base_price: Decimal::from(10),
        price_per_km: Decimal::from(1),
        price_per_kg: Decimal::from(2),
    });
    dir.insert_rate_card(RateCard {
        area_id: AREA_HCM,
        base_price: Decimal::from(20),
        price_per_km: Decimal::from(3),
        price_per_kg: Decimal::from(4),
    });
    dir
}

pub fn customer() -> Actor {
    Actor {
        user_id: "cust-1".into(),
        display_name: "Customer One".into(),
        role: Role::Customer,
        employee_id: None,
        area_id: None,
        customer_id: Some(CUSTOMER),
    }
}

pub fn dispatcher_hn() -> Actor {
    Actor {
        user_id: "disp-hn".into(),
        display_name: "HN Dispatcher".into(),
        role: Role::Dispatcher,
        employee_id: Some(DISPATCHER_HN),
        area_id: Some(AREA_HN),
        customer_id: None,
    }
}

pub fn dispatcher_hcm() -> Actor {
    Actor {
        user_id: "disp-hcm".into(),
        display_name: "HCM Dispatcher".into(),
        role: Role::Dispatcher,
        employee_id: Some(DISPATCHER_HCM),
        area_id: Some(AREA_HCM),
        customer_id: None,
    }
}

pub fn shipper_hn() -> Actor {
    Actor {
        user_id: "ship-hn".into(),
        display_name: "HN Shipper".into(),
        role: Role::Shipper,
        employee_id: Some(SHIPPER_HN),
        area_id: Some(AREA_HN),
        customer_id: None,
    }
}

pub fn shipper_hcm() -> Actor {
    Actor {
        user_id: "ship-hcm".into(),
        display_name: "HCM Shipper".into(),
        role: Role::Shipper,
        employee_id: Some(SHIPPER_HCM),
        area_id: Some(AREA_HCM),
        customer_id: None,
    }
}

pub fn admin() -> Actor {
    Actor {
        user_id: "admin".into(),
        display_name: "Admin".into(),
        role: Role::Admin,
        employee_id: None,
        area_id: None,
        customer_id: None,
    }
}

pub fn metadata(actor: Actor) -> CommandMetadata {
    CommandMetadata {
        actor,
        timestamp: NOW,
    }
}

/// Inter-area COD order (HN → HCM) owned by the fixture customer
pub fn sample_order(id: u64, status: OrderStatus) -> Order {
    Order {
        id,
        tracking_code: format!("MVD30082025{id:04}"),
        customer_id: CUSTOMER,
        dispatcher_id: Some(DISPATCHER_HN),
        shipper_id: Some(SHIPPER_HN),
        pickup_area_id: AREA_HN,
        delivery_area_id: AREA_HCM,
        pickup_warehouse_id: Some(WAREHOUSE_HN),
        delivery_warehouse_id: None,
        pickup_address: "12 Trang Thi".into(),
        delivery_address: "34 Le Loi".into(),
        receiver_name: "Receiver".into(),
        receiver_phone: "0900000000".into(),
        distance_km: Decimal::from(10),
        weight_kg: Decimal::from(2),
        total_price: Decimal::from(82),
        payer: Payer::Sender,
        payment_method: PaymentMethod::Cod,
        payment_status: PaymentStatus::Unpaid,
        payment_transaction_id: None,
        shipment_batch_id: None,
        status,
        created_at: NOW,
    }
}
