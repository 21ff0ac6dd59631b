//! Authorization predicates
//!
//! Every role/area scoping rule lives here so command actions share one
//! vocabulary. Admins bypass area scoping but not role-specific rules
//! (an admin is never "the assigned shipper").

use shared::models::Actor;
use shared::order::Order;

use crate::orders::OrderError;

/// Dispatcher home area, or Forbidden. Admins have no home area and must
/// go through [`ensure_dispatcher_in_area`] style checks instead.
pub fn dispatcher_area(actor: &Actor) -> Result<u64, OrderError> {
    if !actor.is_dispatcher() {
        return Err(OrderError::Forbidden(
            "only a dispatcher may perform this operation".into(),
        ));
    }
    actor.area_id.ok_or_else(|| {
        OrderError::Forbidden("dispatcher account has no home area configured".into())
    })
}

pub fn ensure_admin(actor: &Actor) -> Result<(), OrderError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(OrderError::Forbidden(
            "only an administrator may perform this operation".into(),
        ))
    }
}

pub fn ensure_dispatcher_or_admin(actor: &Actor) -> Result<(), OrderError> {
    if actor.is_admin() || actor.is_dispatcher() {
        Ok(())
    } else {
        Err(OrderError::Forbidden(
            "only a dispatcher or administrator may perform this operation".into(),
        ))
    }
}

/// Dispatcher scoped to the given area; admins pass
pub fn ensure_dispatcher_in_area(actor: &Actor, area_id: u64) -> Result<(), OrderError> {
    if actor.is_admin() {
        return Ok(());
    }
    if dispatcher_area(actor)? == area_id {
        Ok(())
    } else {
        Err(OrderError::Forbidden(format!(
            "dispatcher is not scoped to area {area_id}"
        )))
    }
}

/// The customer who owns the order
pub fn ensure_order_owner(actor: &Actor, order: &Order) -> Result<(), OrderError> {
    if actor.is_customer() && actor.customer_id == Some(order.customer_id) {
        Ok(())
    } else {
        Err(OrderError::Forbidden(
            "only the order's owner may perform this operation".into(),
        ))
    }
}

/// The shipper currently assigned to the order
pub fn ensure_assigned_shipper(actor: &Actor, order: &Order) -> Result<(), OrderError> {
    if !actor.is_shipper() {
        return Err(OrderError::Forbidden(
            "only a shipper may perform this operation".into(),
        ));
    }
    if actor.employee_id.is_some() && actor.employee_id == order.shipper_id {
        Ok(())
    } else {
        Err(OrderError::Forbidden(format!(
            "order {} is not assigned to this shipper",
            order.id
        )))
    }
}

/// Scope for status updates: the assigned shipper, a dispatcher touching
/// either endpoint of the route (or the assigned dispatcher), or an admin
pub fn ensure_update_scope(actor: &Actor, order: &Order) -> Result<(), OrderError> {
    if actor.is_admin() {
        return Ok(());
    }
    if actor.is_shipper() {
        return ensure_assigned_shipper(actor, order);
    }
    if actor.is_dispatcher() {
        let area = dispatcher_area(actor)?;
        let assigned = actor.employee_id.is_some() && actor.employee_id == order.dispatcher_id;
        if assigned || area == order.pickup_area_id || area == order.delivery_area_id {
            return Ok(());
        }
        return Err(OrderError::Forbidden(format!(
            "order {} is outside this dispatcher's area",
            order.id
        )));
    }
    Err(OrderError::Forbidden(
        "role may not update order status".into(),
    ))
}
