//! Reference-data models and the acting principal
//!
//! These records are consumed by the state machines (scoping checks,
//! notification fan-out, rate lookup) but are not owned by them; their
//! CRUD lives outside this system.

use serde::{Deserialize, Serialize};
use rust_decimal::Decimal;

/// Service area (a region with its own warehouses and rate card)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Area {
    pub id: u64,
    pub name: String,
}

/// Warehouse within an area
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: u64,
    pub area_id: u64,
    pub name: String,
}

/// Employee role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmployeeRole {
    Dispatcher,
    Shipper,
}

/// Employee (dispatcher or shipper), tied to a home area
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: u64,
    /// Account id of the backing user (wallet and notification key)
    pub user_id: String,
    pub name: String,
    pub role: EmployeeRole,
    pub area_id: u64,
}

/// Customer (order owner)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: u64,
    pub user_id: String,
    pub name: String,
}

/// Per-area shipping rates. The order price sums the rates of both
/// endpoint areas (see the pricing module).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateCard {
    pub area_id: u64,
    pub base_price: Decimal,
    pub price_per_km: Decimal,
    pub price_per_kg: Decimal,
}

/// Actor role as seen by the state machines
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Dispatcher,
    Shipper,
    Customer,
}

/// The authenticated principal behind a command.
///
/// Identity and role assignment are resolved upstream; the engine only
/// validates that the claimed scope permits the requested transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: String,
    pub display_name: String,
    pub role: Role,
    /// Employee id when role is Dispatcher or Shipper
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<u64>,
    /// Home area for employees
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area_id: Option<u64>,
    /// Customer id when role is Customer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<u64>,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_dispatcher(&self) -> bool {
        self.role == Role::Dispatcher
    }

    pub fn is_shipper(&self) -> bool {
        self.role == Role::Shipper
    }

    pub fn is_customer(&self) -> bool {
        self.role == Role::Customer
    }
}

/// Notification to deliver to a user (fire-and-forget sink payload)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub user_id: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<u64>,
}
