//! Fallback itinerary synthesis
//!
//! Invoked when the model call, the parser, or the normalizer fails. Builds a
//! minimal valid itinerary from trip parameters the caller already validated,
//! so this path cannot fail.

use crate::models::{BudgetBreakdown, Itinerary, TripRequest};
use crate::normalize::{default_title, placeholder_day};
use crate::sanitize::sanitize;

/// Produce a minimal valid itinerary from local trip parameters only.
#[must_use]
pub fn synthesize(trip: &TripRequest) -> Itinerary {
    let mut budget_breakdown = BudgetBreakdown::new();
    budget_breakdown.insert("total", sanitize(&format!("Rs. {}", trip.budget)));

    let days = (1..=trip.days())
        .map(|index| placeholder_day(trip, index))
        .collect();

    Itinerary {
        title: default_title(trip),
        budget_breakdown,
        days,
    }
}
