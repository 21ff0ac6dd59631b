//! Shipping price calculation
//!
//! The fee covers both legs, so both endpoint areas contribute: the two
//! base prices plus the combined per-km and per-kg rates applied to the
//! declared distance and weight.

use rust_decimal::Decimal;
use shared::models::RateCard;

pub fn price_for(
    pickup: &RateCard,
    delivery: &RateCard,
    distance_km: Decimal,
    weight_kg: Decimal,
) -> Decimal {
    pickup.base_price
        + delivery.base_price
        + distance_km * (pickup.price_per_km + delivery.price_per_km)
        + weight_kg * (pickup.price_per_kg + delivery.price_per_kg)
}
