use crate::finder::SearchState;
use crate::models::{Field, ParkingSpot, SearchCriteria};
use std::fmt::Write;

pub const TITLE: &str = "Parking Pro";
pub const TAGLINE: &str = "Find The Perfect Parking Spot Near You";
pub const RESULTS_HEADER: &str = "YAY! We Find Your Parking Spots";
pub const EMPTY_PROMPT: &str = "Enter details to find parking!";

/// Text of the submit control
pub fn submit_label(loading: bool) -> &'static str {
    if loading {
        "Searching..."
    } else {
        "Find Parking"
    }
}

fn field_label(field: Field) -> &'static str {
    match field {
        Field::City => "City",
        Field::Location => "Location",
        Field::ParkingType => "Park Type",
        Field::ParkingLength => "Park Length (minutes)",
        Field::ParkingTime => "Park Time",
    }
}

fn field_value(criteria: &SearchCriteria, field: Field) -> &str {
    match field {
        Field::City => &criteria.city,
        Field::Location => &criteria.location,
        Field::ParkingType => criteria.parking_type.label(),
        Field::ParkingLength => &criteria.parking_length,
        Field::ParkingTime => &criteria.parking_time,
    }
}

/// One result line pair: address, then cost and rules, with the distance badge if known
pub fn render_spot(spot: &ParkingSpot) -> String {
    let cost = if spot.free { "Free" } else { "Paid" };
    let mut out = spot.address.clone();
    if let Some(km) = spot.distance_km {
        let _ = write!(out, "  [{} km]", km);
    }
    let _ = write!(out, "\n   {} - {}", cost, spot.rules);
    out
}

/// Plain-text view of the whole form
pub fn render(state: &SearchState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}\n{}\n", TITLE, TAGLINE);

    for field in Field::ALL {
        let _ = writeln!(
            out,
            "{}: {}",
            field_label(field),
            field_value(&state.criteria, field)
        );
    }
    let _ = writeln!(out, "[ {} ]\n", submit_label(state.loading));

    if let Some(error) = &state.error {
        let _ = writeln!(out, "{}", error);
    }

    if !state.spots.is_empty() && !state.loading {
        let _ = writeln!(out, "{}", RESULTS_HEADER);
        for (i, spot) in state.spots.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", i + 1, render_spot(spot));
        }
    }

    if !state.loading && state.error.is_none() && state.spots.is_empty() {
        let _ = writeln!(out, "{}", EMPTY_PROMPT);
    }

    out
}
