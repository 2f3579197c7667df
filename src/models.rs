//! Core data structures for trip planning and itinerary generation

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::VoyageMindError;

/// Preferred mode of transport for the trip
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Flight,
    #[default]
    Train,
    RoadTrip,
    Cruise,
}

impl TransportMode {
    /// Parse a loose form label ("Road Trip 🚗", "flight", ...) into a mode
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        match value.as_str() {
            v if v.starts_with("flight") || v.starts_with("plane") => Some(Self::Flight),
            v if v.starts_with("train") || v.starts_with("rail") => Some(Self::Train),
            v if v.starts_with("road") || v.starts_with("car") || v.starts_with("drive") => {
                Some(Self::RoadTrip)
            }
            v if v.starts_with("cruise") || v.starts_with("ship") => Some(Self::Cruise),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flight => "Flight",
            Self::Train => "Train",
            Self::RoadTrip => "Road Trip",
            Self::Cruise => "Cruise",
        }
    }
}

/// Dietary preference applied to meal suggestions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodPreference {
    #[default]
    Vegetarian,
    NonVegetarian,
    Vegan,
}

impl FoodPreference {
    /// Parse a loose form label ("Non-Vegetarian 🍗", "vegan", ...)
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        match value.as_str() {
            v if v.starts_with("non-veg") || v.starts_with("non veg") || v.starts_with("nonveg") => {
                Some(Self::NonVegetarian)
            }
            v if v.starts_with("vegan") => Some(Self::Vegan),
            v if v.starts_with("veg") => Some(Self::Vegetarian),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vegetarian => "Vegetarian",
            Self::NonVegetarian => "Non-Vegetarian",
            Self::Vegan => "Vegan",
        }
    }
}

/// Validated trip parameters, immutable once constructed per itinerary request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    pub destination: String,
    pub budget: String,
    pub travelers: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub preferences: Vec<String>,
    pub transport_mode: TransportMode,
    pub food_preference: FoodPreference,
    pub trip_type: Option<String>,
    pub pace: Option<String>,
}

impl TripRequest {
    /// Build a trip request, validating the fields that the rest of the
    /// pipeline relies on.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        destination: impl Into<String>,
        budget: impl Into<String>,
        travelers: u32,
        start_date: NaiveDate,
        end_date: NaiveDate,
        preferences: Vec<String>,
        transport_mode: TransportMode,
        food_preference: FoodPreference,
    ) -> crate::Result<Self> {
        let destination = destination.into();
        if destination.trim().is_empty() {
            return Err(VoyageMindError::validation("Destination cannot be empty"));
        }
        if travelers == 0 {
            return Err(VoyageMindError::validation(
                "Traveler count must be at least 1",
            ));
        }
        if end_date < start_date {
            return Err(VoyageMindError::validation(
                "End date must not be before start date",
            ));
        }

        Ok(Self {
            destination,
            budget: budget.into(),
            travelers,
            start_date,
            end_date,
            preferences,
            transport_mode,
            food_preference,
            trip_type: None,
            pace: None,
        })
    }

    /// Trip length in days, inclusive of both endpoints. Always >= 1.
    #[must_use]
    pub fn days(&self) -> u32 {
        (self.end_date - self.start_date).num_days() as u32 + 1
    }

    /// Human-readable date label for a 1-based day index,
    /// e.g. "Monday, 02 March 2026".
    #[must_use]
    pub fn date_for_day(&self, day: u32) -> String {
        self.start_date
            .checked_add_days(Days::new(u64::from(day.saturating_sub(1))))
            .map_or_else(
                || format!("Day {day}"),
                |date| date.format("%A, %d %B %Y").to_string(),
            )
    }

    /// Comma-separated preference list, or "None" when empty
    #[must_use]
    pub fn preferences_label(&self) -> String {
        if self.preferences.is_empty() {
            "None".to_string()
        } else {
            self.preferences.join(", ")
        }
    }
}

/// One normalized day of an itinerary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryDay {
    pub day: u32,
    pub date: String,
    pub activities: String,
    pub accommodation: String,
    pub meals: String,
    pub transportation: String,
    pub highlights: String,
    pub tips: String,
}

/// Budget categories mapped to amount text, in stable insertion order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetBreakdown {
    entries: Vec<(String, String)>,
}

impl BudgetBreakdown {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a category. Re-inserting an existing category updates the amount
    /// in place and keeps its original position.
    pub fn insert(&mut self, category: impl Into<String>, amount: impl Into<String>) {
        let category = category.into();
        let amount = amount.into();
        if let Some(entry) = self.entries.iter_mut().find(|(c, _)| *c == category) {
            entry.1 = amount;
        } else {
            self.entries.push((category, amount));
        }
    }

    #[must_use]
    pub fn get(&self, category: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(c, _)| c == category)
            .map(|(_, amount)| amount.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(category, amount)| (category.as_str(), amount.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A normalized, render-ready itinerary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    pub title: String,
    pub budget_breakdown: BudgetBreakdown,
    pub days: Vec<ItineraryDay>,
}

/// A fetched destination image; advisory only, never blocks generation
#[derive(Debug, Clone)]
pub struct DestinationImage {
    pub bytes: Vec<u8>,
    pub source_url: String,
}

/// Who authored a chat transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One chat transcript entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
        }
    }
}
