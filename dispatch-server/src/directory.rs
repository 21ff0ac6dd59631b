//! In-memory reference-data directory
//!
//! Areas, warehouses, employees, customers and rate cards are owned by an
//! upstream system; the engine only reads them. They are loaded at startup
//! and served from concurrent maps so command actions can resolve scoping
//! and notification targets without touching the database transaction.

use dashmap::DashMap;
use shared::models::{Area, Customer, Employee, EmployeeRole, RateCard, Warehouse};

#[derive(Default)]
pub struct Directory {
    areas: DashMap<u64, Area>,
    warehouses: DashMap<u64, Warehouse>,
    employees: DashMap<u64, Employee>,
    customers: DashMap<u64, Customer>,
    rate_cards: DashMap<u64, RateCard>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    // ========== Loading ==========

    pub fn insert_area(&self, area: Area) {
        self.areas.insert(area.id, area);
    }

    pub fn insert_warehouse(&self, warehouse: Warehouse) {
        self.warehouses.insert(warehouse.id, warehouse);
    }

    pub fn insert_employee(&self, employee: Employee) {
        self.employees.insert(employee.id, employee);
    }

    pub fn insert_customer(&self, customer: Customer) {
        self.customers.insert(customer.id, customer);
    }

    /// Keyed by area; one card per area
    pub fn insert_rate_card(&self, card: RateCard) {
        self.rate_cards.insert(card.area_id, card);
    }

    // ========== Lookups ==========

    pub fn area(&self, id: u64) -> Option<Area> {
        self.areas.get(&id).map(|a| a.clone())
    }

    pub fn warehouse(&self, id: u64) -> Option<Warehouse> {
        self.warehouses.get(&id).map(|w| w.clone())
    }

    pub fn employee(&self, id: u64) -> Option<Employee> {
        self.employees.get(&id).map(|e| e.clone())
    }

    pub fn customer(&self, id: u64) -> Option<Customer> {
        self.customers.get(&id).map(|c| c.clone())
    }

    pub fn rate_card(&self, area_id: u64) -> Option<RateCard> {
        self.rate_cards.get(&area_id).map(|r| r.clone())
    }

    /// Resolve a shipper employee, rejecting other roles
    pub fn shipper(&self, employee_id: u64) -> Option<Employee> {
        self.employee(employee_id)
            .filter(|e| e.role == EmployeeRole::Shipper)
    }

    /// Any warehouse located in the given area
    pub fn warehouse_in_area(&self, area_id: u64) -> Option<Warehouse> {
        self.warehouses
            .iter()
            .find(|w| w.area_id == area_id)
            .map(|w| w.clone())
    }

    /// All dispatchers whose home area matches (notification fan-out)
    pub fn dispatchers_in_area(&self, area_id: u64) -> Vec<Employee> {
        let mut out: Vec<Employee> = self
            .employees
            .iter()
            .filter(|e| e.role == EmployeeRole::Dispatcher && e.area_id == area_id)
            .map(|e| e.clone())
            .collect();
        out.sort_by_key(|e| e.id);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn directory() -> Directory {
        let dir = Directory::new();
        dir.insert_area(Area { id: 1, name: "North".into() });
        dir.insert_area(Area { id: 2, name: "South".into() });
        dir.insert_warehouse(Warehouse { id: 10, area_id: 1, name: "North Hub".into() });
        dir.insert_warehouse(Warehouse { id: 20, area_id: 2, name: "South Hub".into() });
        dir.insert_employee(Employee {
            id: 100,
            user_id: "disp-north".into(),
            name: "North Dispatcher".into(),
            role: EmployeeRole::Dispatcher,
            area_id: 1,
        });
        dir.insert_employee(Employee {
            id: 101,
            user_id: "ship-north".into(),
            name: "North Shipper".into(),
            role: EmployeeRole::Shipper,
            area_id: 1,
        });
        dir.insert_rate_card(RateCard {
            area_id: 1,
            base_price: Decimal::from(10),
            price_per_km: Decimal::from(1),
            price_per_kg: Decimal::from(2),
        });
        dir
    }

    #[test]
    fn shipper_lookup_rejects_dispatchers() {
        let dir = directory();
        assert!(dir.shipper(101).is_some());
        assert!(dir.shipper(100).is_none());
    }

    #[test]
    fn dispatchers_scoped_by_area() {
        let dir = directory();
        let north = dir.dispatchers_in_area(1);
        assert_eq!(north.len(), 1);
        assert_eq!(north[0].user_id, "disp-north");
        assert!(dir.dispatchers_in_area(2).is_empty());
    }

    #[test]
    fn warehouse_in_area() {
        let dir = directory();
        assert_eq!(dir.warehouse_in_area(2).map(|w| w.id), Some(20));
        assert!(dir.warehouse_in_area(3).is_none());
    }
}
