use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::{Location, TimeSlot};

static PM_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(1[0-2]|0?[1-9])(?::[0-5]\d)?\s*(?:pm\b|p\.m\b\.?)").expect("valid pm pattern")
});
static AM_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(1[0-2]|0?[1-9])(?::[0-5]\d)?\s*(?:am\b|a\.m\b\.?)").expect("valid am pattern")
});
static CLOCK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([01]?\d|2[0-3]):[0-5]\d\b").expect("valid clock pattern")
});

// Night sits before evening so "late night" is not swallowed by the bare "night" keyword.
static PERIOD_KEYWORDS: Lazy<Vec<(TimeSlot, Regex)>> = Lazy::new(|| {
    [
        (TimeSlot::Morning, r"\b(morning|breakfast|early|sunrise)\b"),
        (TimeSlot::Afternoon, r"\b(afternoon|lunch|noon|midday)\b"),
        (TimeSlot::Night, r"\b(midnight|late night|late-night)\b"),
        (TimeSlot::Evening, r"\b(evening|dinner|night|tonight|sunset)\b"),
    ]
    .into_iter()
    .map(|(slot, pattern)| (slot, Regex::new(pattern).expect("valid period pattern")))
    .collect()
});

/// Closed gazetteer. Earlier entries win when several appear in one query.
pub const GAZETTEER: &[(Location, &[&str])] = &[
    (Location::Malleshwaram, &["malleshwaram", "malleswaram"]),
    (Location::Basavanagudi, &["basavanagudi"]),
    (Location::Koramangala, &["koramangala"]),
    (Location::Indiranagar, &["indiranagar", "indira nagar"]),
    (Location::Whitefield, &["whitefield"]),
    (Location::ElectronicCity, &["electronic city", "e-city"]),
    (Location::SilkBoard, &["silk board", "silkboard"]),
    (Location::OuterRingRoad, &["outer ring road"]),
    (Location::BannerghattaRoad, &["bannerghatta"]),
    (Location::Hebbal, &["hebbal"]),
    (Location::HosurRoad, &["hosur road"]),
    (Location::VvPuram, &["vv puram", "v.v. puram", "vvpuram"]),
    (Location::Shivajinagar, &["shivajinagar", "shivaji nagar"]),
    (Location::Jayanagar, &["jayanagar"]),
    (Location::MgRoad, &["mg road", "m.g. road"]),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slots {
    pub time: Option<TimeSlot>,
    pub location: Option<Location>,
}

pub fn extract_slots(text: &str) -> Slots {
    let lower = text.to_lowercase();
    Slots {
        time: time_slot_in(&lower),
        location: location_in(&lower),
    }
}

pub fn extract_time_slot(text: &str) -> Option<TimeSlot> {
    time_slot_in(&text.to_lowercase())
}

pub fn extract_location(text: &str) -> Option<Location> {
    location_in(&text.to_lowercase())
}

fn time_slot_in(lower: &str) -> Option<TimeSlot> {
    if let Some(hour) = first_hour(&PM_PATTERN, lower) {
        let hour24 = if hour == 12 { 12 } else { hour + 12 };
        return Some(TimeSlot::from_hour(hour24));
    }

    if let Some(hour) = first_hour(&AM_PATTERN, lower) {
        let hour24 = if hour == 12 { 0 } else { hour };
        return Some(TimeSlot::from_hour(hour24));
    }

    if let Some(hour) = first_hour(&CLOCK_PATTERN, lower) {
        return Some(TimeSlot::from_hour(hour));
    }

    PERIOD_KEYWORDS
        .iter()
        .find(|(_, pattern)| pattern.is_match(lower))
        .map(|(slot, _)| *slot)
}

fn first_hour(pattern: &Regex, lower: &str) -> Option<u8> {
    pattern
        .captures(lower)
        .and_then(|captures| captures.get(1))
        .and_then(|hour| hour.as_str().parse::<u8>().ok())
}

fn location_in(lower: &str) -> Option<Location> {
    GAZETTEER
        .iter()
        .find(|(_, aliases)| aliases.iter().any(|alias| lower.contains(alias)))
        .map(|(location, _)| *location)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pm_times_map_through_the_boundary_table() {
        let cases = [
            ("traffic at 6 PM", TimeSlot::Evening),
            ("leave by 5pm", TimeSlot::Evening),
            ("around 9:30 p.m.", TimeSlot::Evening),
            ("lunch at 12 pm", TimeSlot::Afternoon),
            ("meet at 4 pm", TimeSlot::Afternoon),
            ("back at 10 pm", TimeSlot::Night),
            ("out till 11pm", TimeSlot::Night),
        ];
        for (text, expected) in cases {
            assert_eq!(extract_time_slot(text), Some(expected), "{text}");
        }
    }

    #[test]
    fn am_times_map_through_the_boundary_table() {
        let cases = [
            ("start at 6 am", TimeSlot::Morning),
            ("by 10am", TimeSlot::Morning),
            ("at 11 am", TimeSlot::Afternoon),
            ("flight at 4 am", TimeSlot::Night),
            ("landing 12 am", TimeSlot::Night),
        ];
        for (text, expected) in cases {
            assert_eq!(extract_time_slot(text), Some(expected), "{text}");
        }
    }

    #[test]
    fn explicit_pm_outranks_keywords_and_am() {
        assert_eq!(
            extract_time_slot("breakfast plans from 9 am till 7 pm"),
            Some(TimeSlot::Evening)
        );
        assert_eq!(
            extract_time_slot("morning drive at 2 pm"),
            Some(TimeSlot::Afternoon)
        );
    }

    #[test]
    fn dotted_suffix_without_trailing_dot() {
        assert_eq!(extract_time_slot("at 9 p.m"), Some(TimeSlot::Evening));
        assert_eq!(extract_time_slot("by 7 a.m"), Some(TimeSlot::Morning));
        assert_eq!(extract_time_slot("by 7 a.m. sharp"), Some(TimeSlot::Morning));
    }

    #[test]
    fn reads_24_hour_clock() {
        assert_eq!(extract_time_slot("reach by 18:30"), Some(TimeSlot::Evening));
        assert_eq!(extract_time_slot("start 08:00"), Some(TimeSlot::Morning));
        assert_eq!(extract_time_slot("at 23:15"), Some(TimeSlot::Night));
    }

    #[test]
    fn keyword_periods() {
        assert_eq!(extract_time_slot("best breakfast"), Some(TimeSlot::Morning));
        assert_eq!(extract_time_slot("lunch spots"), Some(TimeSlot::Afternoon));
        assert_eq!(extract_time_slot("dinner ideas"), Some(TimeSlot::Evening));
        assert_eq!(extract_time_slot("night life"), Some(TimeSlot::Evening));
        assert_eq!(extract_time_slot("late night food"), Some(TimeSlot::Night));
    }

    #[test]
    fn absent_time_yields_none() {
        assert_eq!(extract_time_slot("what does guru mean"), None);
        assert_eq!(extract_time_slot("i am hungry"), None);
        assert_eq!(extract_time_slot("21 pm"), None);
    }

    #[test]
    fn finds_gazetteer_locations() {
        assert_eq!(
            extract_location("Traffic at Silk Board at 6 PM"),
            Some(Location::SilkBoard)
        );
        assert_eq!(
            extract_location("dosa in MALLESHWARAM"),
            Some(Location::Malleshwaram)
        );
        assert_eq!(
            extract_location("is the electronic city flyover bad"),
            Some(Location::ElectronicCity)
        );
        assert_eq!(extract_location("what does guru mean"), None);
    }

    #[test]
    fn gazetteer_order_decides_between_two_places() {
        assert_eq!(
            extract_location("from silk board to koramangala"),
            Some(Location::Koramangala)
        );
    }

    #[test]
    fn extracts_both_slots_together() {
        let slots = extract_slots("Dinner near Indiranagar at 8 pm");
        assert_eq!(slots.time, Some(TimeSlot::Evening));
        assert_eq!(slots.location, Some(Location::Indiranagar));
    }
}
