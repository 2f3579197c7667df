//! Prompt assembly for the generative model
//!
//! Pure formatting, no I/O. The itinerary prompt embeds the exact JSON shape
//! the schema normalizer enforces; both sides are built from the shared
//! constants in [`crate::normalize`] so the contract cannot drift.

use crate::models::TripRequest;
use crate::normalize::{BUDGET_CATEGORIES, DAY_TEXT_FIELDS};

/// Build the deterministic itinerary-generation instruction for a trip.
#[must_use]
pub fn itinerary_prompt(trip: &TripRequest) -> String {
    let days = trip.days();
    let start = trip.start_date.format("%d %B %Y");
    let end = trip.end_date.format("%d %B %Y");

    let mut prompt = format!(
        "Create a detailed itinerary for a {days}-day trip to {destination} \
         with budget Rs. {budget} for {travelers} travelers.\n\
         Dates: {start} to {end}\n\
         Preferences: {preferences}\n\
         Transportation: {transport}\n\
         Food: {food}\n",
        destination = trip.destination,
        budget = trip.budget,
        travelers = trip.travelers,
        preferences = trip.preferences_label(),
        transport = trip.transport_mode.as_str(),
        food = trip.food_preference.as_str(),
    );

    if let Some(trip_type) = &trip.trip_type {
        prompt.push_str(&format!("Trip type: {trip_type}\n"));
    }
    if let Some(pace) = &trip.pace {
        prompt.push_str(&format!("Travel pace: {pace}\n"));
    }

    prompt.push_str(&format!(
        "\nImportant Rules:\n\
         1. Use ONLY ASCII characters (no currency symbols, emoji, or special glyphs)\n\
         2. Use \"Rs.\" instead of any currency symbol\n\
         3. The \"days\" array must contain exactly {days} entries\n\
         4. Return valid JSON with this structure:\n{schema}\n",
        schema = schema_block(),
    ));

    prompt
}

/// Build the trip-context chat prompt for a free-text question.
#[must_use]
pub fn chat_prompt(trip: Option<&TripRequest>, query: &str) -> String {
    let context = match trip {
        Some(trip) => format!(
            "User is planning a trip with these details:\n\
             - Destination: {destination}\n\
             - Duration: {days} days ({start} to {end})\n\
             - Budget: Rs. {budget} for {travelers} travelers\n\
             - Preferences: {preferences}\n\
             - Transport: {transport}\n\
             - Food: {food}\n",
            destination = trip.destination,
            days = trip.days(),
            start = trip.start_date.format("%d %B %Y"),
            end = trip.end_date.format("%d %B %Y"),
            budget = trip.budget,
            travelers = trip.travelers,
            preferences = trip.preferences_label(),
            transport = trip.transport_mode.as_str(),
            food = trip.food_preference.as_str(),
        ),
        None => "The user has not saved trip details yet; answer generally.\n".to_string(),
    };

    format!(
        "{context}\nCurrent query: {query}\n\n\
         Respond helpfully with specific recommendations when possible.\n\
         Format responses with clear sections for readability.\n"
    )
}

/// The JSON schema description shown to the model, built from the same field
/// lists the normalizer validates against.
fn schema_block() -> String {
    let budget_fields = BUDGET_CATEGORIES
        .iter()
        .map(|category| format!("        \"{category}\": \"string\""))
        .collect::<Vec<_>>()
        .join(",\n");

    let day_fields = DAY_TEXT_FIELDS
        .iter()
        .map(|field| format!("            \"{field}\": \"string\""))
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        "{{\n\
         \x20   \"title\": \"string\",\n\
         \x20   \"budget_breakdown\": {{\n{budget_fields}\n    }},\n\
         \x20   \"days\": [\n\
         \x20       {{\n\
         \x20           \"day\": number,\n\
         \x20           \"date\": \"string\",\n{day_fields}\n        }}\n\
         \x20   ]\n\
         }}"
    )
}
