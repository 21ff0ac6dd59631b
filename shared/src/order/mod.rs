//! Order domain types

mod record;
mod status;

pub use record::{Order, OrderChanges, OrderLog};
pub use status::{OrderStatus, Payer, PaymentMethod, PaymentStatus};
