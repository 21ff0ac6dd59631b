//! Pure transition rules for the order state machine
//!
//! [`plan_transition`] decides whether a requested status change is legal
//! for the given order snapshot and actor, and returns the effects the
//! caller must apply. It never touches storage, so every rule is
//! unit-testable in isolation. Area and assignment scoping is the auth
//! module's job; this module only rules on status, role and payment
//! preconditions.

use shared::models::{Actor, Role};
use shared::order::{Order, OrderStatus, Payer, PaymentMethod, PaymentStatus};

use super::context::OrderError;

/// Effects of an accepted status change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionEffects {
    pub new_status: OrderStatus,
    /// The in-transit leg ended; the next leg needs a fresh assignment
    pub clear_shipper: bool,
    /// Post a full-price REFUND to the customer's wallet
    pub refund_customer: bool,
}

impl TransitionEffects {
    fn to(new_status: OrderStatus) -> Self {
        Self {
            new_status,
            clear_shipper: false,
            refund_customer: false,
        }
    }
}

/// Which leg an Assign command is currently legal for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignPhase {
    Pickup,
    Delivery,
    Return,
}

/// Resolve the assignment phase from the order's current status.
///
/// `PickupSuccess` qualifies for the delivery phase only on intra-area
/// orders (the same-area shortcut that skips inter-area transport).
pub fn assign_phase(order: &Order) -> Result<AssignPhase, OrderError> {
    match order.status {
        OrderStatus::Pending | OrderStatus::PickupFailed => Ok(AssignPhase::Pickup),
        OrderStatus::ArrivedDeliveryHub | OrderStatus::DeliveryFailed => Ok(AssignPhase::Delivery),
        OrderStatus::PickupSuccess if order.is_intra_area() => Ok(AssignPhase::Delivery),
        OrderStatus::ArrivedPickupTerminal => Ok(AssignPhase::Return),
        status => Err(OrderError::IllegalTransition(format!(
            "no shipper assignment is possible while the order is {status}"
        ))),
    }
}

/// Rule on a requested status change.
///
/// Checks, in order: terminal state, double submission, batch membership,
/// the role-scoped reachability table, and payment gates.
pub fn plan_transition(
    order: &Order,
    requested: OrderStatus,
    actor: &Actor,
) -> Result<TransitionEffects, OrderError> {
    if order.status.is_terminal() {
        return Err(OrderError::IllegalTransition(format!(
            "order {} is {} and can no longer change",
            order.id, order.status
        )));
    }
    if requested == order.status {
        return Err(OrderError::IllegalTransition(format!(
            "order {} is already {}",
            order.id, requested
        )));
    }
    if let Some(batch_id) = order.shipment_batch_id {
        return Err(OrderError::IllegalTransition(format!(
            "order {} is travelling in batch {batch_id}; its status is driven by the batch",
            order.id
        )));
    }

    match actor.role {
        Role::Shipper => plan_shipper(order, requested),
        Role::Dispatcher | Role::Admin => plan_dispatcher(order, requested),
        Role::Customer => Err(OrderError::Forbidden(
            "customers may only cancel their own pending orders".into(),
        )),
    }
}

fn plan_shipper(order: &Order, requested: OrderStatus) -> Result<TransitionEffects, OrderError> {
    use OrderStatus::*;

    match (order.status, requested) {
        (AssignedPickupShipper, Picking) => Ok(TransitionEffects::to(Picking)),
        (Picking, PickupFailed) => Ok(TransitionEffects::to(PickupFailed)),
        (Picking, PickupSuccess) => {
            if order.payer == Payer::Sender
                && order.payment_method == PaymentMethod::Cod
                && order.payment_status != PaymentStatus::Paid
            {
                return Err(OrderError::IllegalTransition(
                    "must confirm COD collection first".into(),
                ));
            }
            Ok(TransitionEffects::to(PickupSuccess))
        }
        (AssignedDeliveryShipper, Delivering) => Ok(TransitionEffects::to(Delivering)),
        (Delivering, DeliveryFailed) => Ok(TransitionEffects::to(DeliveryFailed)),
        (Delivering, Delivered) => {
            if order.payer == Payer::Receiver && order.payment_status != PaymentStatus::Paid {
                return Err(OrderError::IllegalTransition(
                    "receiver has not paid; collect payment before completing delivery".into(),
                ));
            }
            Ok(TransitionEffects::to(Delivered))
        }
        (Returning, ArrivedPickupTerminal) => Ok(TransitionEffects::to(ArrivedPickupTerminal)),
        (AssignedReturnShipper, ReturningToSender) => Ok(TransitionEffects::to(ReturningToSender)),
        (ReturningToSender, Returned) => Ok(TransitionEffects {
            new_status: Returned,
            clear_shipper: false,
            refund_customer: order.payment_status == PaymentStatus::Paid
                && order.payer == Payer::Sender,
        }),
        (ReturningToSender, ReturnFailed) => Ok(TransitionEffects::to(ReturnFailed)),
        (current, requested) => Err(OrderError::IllegalTransition(format!(
            "a shipper cannot move an order from {current} to {requested}"
        ))),
    }
}

fn plan_dispatcher(order: &Order, requested: OrderStatus) -> Result<TransitionEffects, OrderError> {
    use OrderStatus::*;

    match (order.status, requested) {
        (PickupSuccess, InterAreaTransporting) => {
            if order.is_intra_area() {
                return Err(OrderError::IllegalTransition(
                    "intra-area orders have no inter-area transport leg".into(),
                ));
            }
            Ok(TransitionEffects::to(InterAreaTransporting))
        }
        (InterAreaTransporting, ArrivedDeliveryHub) => Ok(TransitionEffects {
            new_status: ArrivedDeliveryHub,
            clear_shipper: true,
            refund_customer: false,
        }),
        // Exception handling: a dispatcher may cancel any live order or
        // divert it into the return flow
        (_, Cancelled) => Ok(TransitionEffects::to(Cancelled)),
        (_, Returning) => Ok(TransitionEffects::to(Returning)),
        (_, ReadyToReturn) => Ok(TransitionEffects::to(ReadyToReturn)),
        (current, requested) => Err(OrderError::IllegalTransition(format!(
            "a dispatcher cannot move an order from {current} to {requested}"
        ))),
    }
}
