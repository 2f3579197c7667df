//! Schema normalization for parsed model payloads
//!
//! Takes the generic key-value tree the parser produced and repairs it into a
//! schema-conformant [`Itinerary`]: the day count is reconciled against the
//! requested trip length, day indices are forced contiguous, and every text
//! field is sanitized before acceptance. Normalization is all-or-nothing; the
//! only failure is a payload without a usable "days" array.

use serde_json::{Map, Value};

use crate::models::{Itinerary, ItineraryDay, BudgetBreakdown, TripRequest};
use crate::sanitize::sanitize;
use crate::{Result, VoyageMindError};

/// The six per-day text fields, in the order the prompt advertises them and
/// the renderer emits them.
pub const DAY_TEXT_FIELDS: [&str; 6] = [
    "activities",
    "accommodation",
    "meals",
    "transportation",
    "highlights",
    "tips",
];

/// Recognized budget categories; emitted first, in this order, when present.
pub const BUDGET_CATEGORIES: [&str; 6] = [
    "accommodation",
    "transportation",
    "food",
    "activities",
    "miscellaneous",
    "total",
];

/// Validate and repair a parsed payload into an itinerary for this trip.
pub fn normalize(payload: Map<String, Value>, trip: &TripRequest) -> Result<Itinerary> {
    let raw_days = payload
        .get("days")
        .ok_or_else(|| VoyageMindError::schema("response missing 'days' field"))?
        .as_array()
        .ok_or_else(|| VoyageMindError::schema("'days' is not an array"))?;

    let requested = trip.days() as usize;
    // When the model got the count wrong, supplied dates can no longer be
    // trusted on any entry; recompute them all from the start date.
    let recompute_dates = raw_days.len() != requested;

    let mut days = Vec::with_capacity(requested);
    for position in 0..requested {
        let index = position as u32 + 1;
        let day = match raw_days.get(position) {
            Some(value) => normalized_day(value, index, trip, recompute_dates),
            None => placeholder_day(trip, index),
        };
        days.push(day);
    }

    let title = payload
        .get("title")
        .and_then(Value::as_str)
        .map(sanitize)
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| default_title(trip));

    Ok(Itinerary {
        title,
        budget_breakdown: normalized_budget(&payload),
        days,
    })
}

/// Default itinerary title built from trip parameters alone.
#[must_use]
pub fn default_title(trip: &TripRequest) -> String {
    sanitize(&format!("{}-Day {} Trip", trip.days(), trip.destination))
}

/// A minimal valid day built purely from trip parameters. Shared between the
/// normalizer's shortfall fill and the fallback synthesizer.
#[must_use]
pub fn placeholder_day(trip: &TripRequest, index: u32) -> ItineraryDay {
    ItineraryDay {
        day: index,
        date: sanitize(&trip.date_for_day(index)),
        activities: sanitize(&format!("Day {index}: Explore {}", trip.destination)),
        accommodation: sanitize(&format!("Accommodation for {} travelers", trip.travelers)),
        meals: trip.food_preference.as_str().to_string(),
        transportation: trip.transport_mode.as_str().to_string(),
        highlights: sanitize(&format!("Discovering {}", trip.destination)),
        tips: "Ask locals for recommendations".to_string(),
    }
}

/// Normalize one model-supplied day entry. The day index is forced to the
/// 1-based position regardless of what the model wrote. A non-object entry is
/// unusable and degrades to a placeholder.
fn normalized_day(value: &Value, index: u32, trip: &TripRequest, recompute_date: bool) -> ItineraryDay {
    let Some(entry) = value.as_object() else {
        return placeholder_day(trip, index);
    };

    let date = if recompute_date {
        sanitize(&trip.date_for_day(index))
    } else {
        let supplied = sanitize(&text_field(entry, "date"));
        if supplied.trim().is_empty() {
            sanitize(&trip.date_for_day(index))
        } else {
            supplied
        }
    };

    ItineraryDay {
        day: index,
        date,
        activities: sanitize(&text_field(entry, "activities")),
        accommodation: sanitize(&text_field(entry, "accommodation")),
        meals: sanitize(&text_field(entry, "meals")),
        transportation: sanitize(&text_field(entry, "transportation")),
        highlights: sanitize(&text_field(entry, "highlights")),
        tips: sanitize(&text_field(entry, "tips")),
    }
}

/// Budget breakdown with recognized categories first, then any extra
/// categories in payload order. Amount values are sanitized text.
fn normalized_budget(payload: &Map<String, Value>) -> BudgetBreakdown {
    let mut breakdown = BudgetBreakdown::new();
    let Some(raw) = payload.get("budget_breakdown").and_then(Value::as_object) else {
        return breakdown;
    };

    for category in BUDGET_CATEGORIES {
        if let Some(amount) = raw.get(category).and_then(scalar_text) {
            breakdown.insert(category, sanitize(&amount));
        }
    }

    for (category, value) in raw {
        if BUDGET_CATEGORIES.contains(&category.as_str()) {
            continue;
        }
        if let Some(amount) = scalar_text(value) {
            breakdown.insert(sanitize(category), sanitize(&amount));
        }
    }

    breakdown
}

/// Extract a named text field, tolerating numeric values.
fn text_field(entry: &Map<String, Value>, name: &str) -> String {
    entry.get(name).and_then(scalar_text).unwrap_or_default()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FoodPreference, TransportMode};
    use chrono::NaiveDate;
    use serde_json::json;

    fn sample_trip(days: u32) -> TripRequest {
        let start = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        TripRequest::new(
            "Paris",
            "45000",
            2,
            start,
            start + chrono::Days::new(u64::from(days - 1)),
            vec!["History & Culture".to_string()],
            TransportMode::Flight,
            FoodPreference::Vegetarian,
        )
        .unwrap()
    }

    fn day_entry(day: i64, activities: &str) -> Value {
        json!({
            "day": day,
            "date": "some date",
            "activities": activities,
            "accommodation": "Hotel near the river",
            "meals": "Breakfast included",
            "transportation": "Metro",
            "highlights": "Old town",
            "tips": "Carry water"
        })
    }

    fn payload_with_days(days: Vec<Value>) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("title".to_string(), json!("Paris Getaway"));
        payload.insert("days".to_string(), Value::Array(days));
        payload
    }

    #[test]
    fn test_missing_days_is_schema_error() {
        let trip = sample_trip(3);
        let err = normalize(Map::new(), &trip).unwrap_err();
        assert!(matches!(err, VoyageMindError::Schema { .. }));
    }

    #[test]
    fn test_non_array_days_is_schema_error() {
        let trip = sample_trip(3);
        let mut payload = Map::new();
        payload.insert("days".to_string(), json!("tomorrow"));
        let err = normalize(payload, &trip).unwrap_err();
        assert!(matches!(err, VoyageMindError::Schema { .. }));
    }

    #[test]
    fn test_exact_count_forces_indices_keeps_content() {
        let trip = sample_trip(3);
        // Model mis-numbered the days; indices must still come out contiguous.
        let payload = payload_with_days(vec![
            day_entry(7, "Louvre"),
            day_entry(7, "Versailles"),
            day_entry(1, "Montmartre"),
        ]);

        let itinerary = normalize(payload, &trip).unwrap();
        let indices: Vec<u32> = itinerary.days.iter().map(|d| d.day).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert_eq!(itinerary.days[0].activities, "Louvre");
        assert_eq!(itinerary.days[2].activities, "Montmartre");
        // Exact count: model-supplied dates survive
        assert_eq!(itinerary.days[0].date, "some date");
        assert_eq!(itinerary.title, "Paris Getaway");
    }

    #[test]
    fn test_shortfall_fills_placeholders() {
        let trip = sample_trip(3);
        let payload = payload_with_days(vec![day_entry(1, "Louvre")]);

        let itinerary = normalize(payload, &trip).unwrap();
        assert_eq!(itinerary.days.len(), 3);
        // Day 1 keeps model content but gets a recomputed date
        assert_eq!(itinerary.days[0].activities, "Louvre");
        assert_eq!(itinerary.days[0].date, "Monday, 02 March 2026");
        // Days 2 and 3 are synthesized from trip parameters
        assert!(itinerary.days[1].activities.contains("Paris"));
        assert!(itinerary.days[2].activities.contains("Paris"));
        assert!(itinerary.days[1].accommodation.contains('2'));
        assert_eq!(itinerary.days[2].date, "Wednesday, 04 March 2026");
    }

    #[test]
    fn test_surplus_truncates_and_recomputes_dates() {
        let trip = sample_trip(2);
        let payload = payload_with_days(vec![
            day_entry(1, "Louvre"),
            day_entry(2, "Versailles"),
            day_entry(3, "Montmartre"),
            day_entry(4, "Orsay"),
        ]);

        let itinerary = normalize(payload, &trip).unwrap();
        assert_eq!(itinerary.days.len(), 2);
        assert_eq!(itinerary.days[0].activities, "Louvre");
        assert_eq!(itinerary.days[1].activities, "Versailles");
        // Kept entries get dates re-derived from the trip, not the model
        assert_eq!(itinerary.days[0].date, "Monday, 02 March 2026");
        assert_eq!(itinerary.days[1].date, "Tuesday, 03 March 2026");
    }

    #[test]
    fn test_fields_are_sanitized() {
        let trip = sample_trip(1);
        let mut payload = payload_with_days(vec![json!({
            "day": 1,
            "date": "Monday, 02 March 2026",
            "activities": "₹500 for activities •",
            "accommodation": "Café stay",
            "meals": "Crêpes",
            "transportation": "Metro ✈",
            "highlights": "Seine",
            "tips": "Mind the métro"
        })]);
        payload.insert(
            "budget_breakdown".to_string(),
            json!({"total": "₹45000", "food": "₹6000"}),
        );
        payload.insert("title".to_string(), json!("Paris ✈ Trip"));

        let itinerary = normalize(payload, &trip).unwrap();
        assert_eq!(itinerary.days[0].activities, "Rs.500 for activities -");
        assert_eq!(itinerary.days[0].accommodation, "Caf stay");
        assert_eq!(itinerary.title, "Paris  Trip");
        assert_eq!(itinerary.budget_breakdown.get("total"), Some("Rs.45000"));
        for day in &itinerary.days {
            for text in [
                &day.date,
                &day.activities,
                &day.accommodation,
                &day.meals,
                &day.transportation,
                &day.highlights,
                &day.tips,
            ] {
                assert!(text.chars().all(|c| (c as u32) < 128));
            }
        }
    }

    #[test]
    fn test_budget_category_ordering() {
        let trip = sample_trip(1);
        let mut payload = payload_with_days(vec![day_entry(1, "Louvre")]);
        // Payload order deliberately scrambled, plus an unrecognized category
        payload.insert(
            "budget_breakdown".to_string(),
            json!({
                "total": "Rs. 45000",
                "souvenirs": "Rs. 1000",
                "food": "Rs. 6000",
                "accommodation": "Rs. 20000"
            }),
        );

        let itinerary = normalize(payload, &trip).unwrap();
        let keys: Vec<&str> = itinerary.budget_breakdown.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["accommodation", "food", "total", "souvenirs"]);
    }

    #[test]
    fn test_missing_title_uses_default() {
        let trip = sample_trip(3);
        let mut payload = payload_with_days(vec![day_entry(1, "Louvre")]);
        payload.remove("title");

        let itinerary = normalize(payload, &trip).unwrap();
        assert_eq!(itinerary.title, "3-Day Paris Trip");
    }

    #[test]
    fn test_numeric_field_values_tolerated() {
        let trip = sample_trip(1);
        let payload = payload_with_days(vec![json!({
            "day": 1,
            "date": "Monday, 02 March 2026",
            "activities": "Louvre",
            "accommodation": 4500,
            "meals": "Included",
            "transportation": "Metro",
            "highlights": "Art",
            "tips": "Book ahead"
        })]);

        let itinerary = normalize(payload, &trip).unwrap();
        assert_eq!(itinerary.days[0].accommodation, "4500");
    }

    #[test]
    fn test_non_object_day_entry_degrades_to_placeholder() {
        let trip = sample_trip(2);
        let payload = payload_with_days(vec![json!("just a string"), day_entry(2, "Versailles")]);

        let itinerary = normalize(payload, &trip).unwrap();
        assert!(itinerary.days[0].activities.contains("Paris"));
        assert_eq!(itinerary.days[1].activities, "Versailles");
    }

    #[test]
    fn test_day_set_is_exactly_one_to_n() {
        for n in 1..=6 {
            let trip = sample_trip(n);
            let payload = payload_with_days(vec![day_entry(1, "Louvre")]);
            let itinerary = normalize(payload, &trip).unwrap();
            let indices: Vec<u32> = itinerary.days.iter().map(|d| d.day).collect();
            let expected: Vec<u32> = (1..=n).collect();
            assert_eq!(indices, expected);
        }
    }
}
