use serde_json::json;

use crate::models::{
    ClassifiedQuery, GuideReply, Intent, KnowledgeDoc, Location, ProcessingResult, TimeSlot,
};

pub const SLANG_GLOSSARY: &[(&str, &str)] = &[
    ("scene illa maga", "not happening / not possible, dude"),
    ("scene illa", "not happening / no chance"),
    ("guru", "buddy, mate"),
    ("machcha", "dude, close friend"),
    ("macha", "dude, close friend"),
    ("maga", "dude (literally 'son')"),
    ("sakkath", "awesome, superb"),
    ("swalpa adjust maadi", "please adjust a little"),
    ("bombat", "fantastic"),
    ("oota aytha", "have you eaten?"),
    ("banni", "come (welcome)"),
];

const SLANG_FOOTER: &str =
    "(Scene illa maga = not happening, Guru = buddy, Sakkath = awesome, Machcha = dude)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CongestionLevel {
    Moderate,
    Heavy,
    Nightmare,
}

#[derive(Debug, Clone, Copy)]
pub struct JunctionProfile {
    pub level: CongestionLevel,
    pub peak_hours: &'static str,
    pub metro_advice: Option<&'static str>,
    pub warning: &'static str,
}

/// Hardcoded congestion notes per junction. Not live data.
pub fn junction_profile(location: Location) -> Option<JunctionProfile> {
    let profile = match location {
        Location::SilkBoard => JunctionProfile {
            level: CongestionLevel::Nightmare,
            peak_hours: "8:00-10:00 AM and 6:00-9:00 PM",
            metro_advice: Some("Take the Purple Line metro to skip the chaos"),
            warning: "Arre, Silk Board? Scene illa maga! It's absolutely packed during peak hours.",
        },
        Location::ElectronicCity => JunctionProfile {
            level: CongestionLevel::Heavy,
            peak_hours: "8:00-10:30 AM and 6:00-8:30 PM",
            metro_advice: None,
            warning: "Electronic City gets crazy during IT office hours.",
        },
        Location::OuterRingRoad => JunctionProfile {
            level: CongestionLevel::Heavy,
            peak_hours: "all day, worst 8-10 AM and 6-9 PM",
            metro_advice: Some("Use metro stations along the route when possible"),
            warning: "Outer Ring Road is congested throughout the day, guru.",
        },
        Location::Whitefield => JunctionProfile {
            level: CongestionLevel::Heavy,
            peak_hours: "8:00-10:00 AM and 6:00-9:00 PM",
            metro_advice: Some("The Purple Line metro is your savior for Whitefield"),
            warning: "Whitefield road is sakkath bad during peak hours.",
        },
        Location::BannerghattaRoad => JunctionProfile {
            level: CongestionLevel::Moderate,
            peak_hours: "8:00-10:00 AM and 6:00-8:00 PM",
            metro_advice: Some("Use the Green Line metro to nearby stations"),
            warning: "Bannerghatta Road moves slow most times.",
        },
        Location::Hebbal => JunctionProfile {
            level: CongestionLevel::Heavy,
            peak_hours: "7:30-10:00 AM and 6:00-8:30 PM",
            metro_advice: Some("Metro can help you reach nearby areas"),
            warning: "Hebbal flyover is a major bottleneck during rush hours.",
        },
        Location::HosurRoad => JunctionProfile {
            level: CongestionLevel::Heavy,
            peak_hours: "8:00-10:30 AM and 6:00-9:00 PM",
            metro_advice: None,
            warning: "Hosur Road crawls whenever the IT crowd is on the move.",
        },
        _ => return None,
    };
    Some(profile)
}

pub fn compose_reply(query: &ClassifiedQuery, knowledge: Option<&KnowledgeDoc>) -> GuideReply {
    let (reply_text, backing_sections) = match query.intent {
        Intent::Food => food_reply(query.time_slot, query.location_slot),
        Intent::Traffic => traffic_reply(&query.sanitized_text, query.time_slot, query.location_slot),
        Intent::Slang => slang_reply(&query.sanitized_text),
        Intent::Itinerary => itinerary_reply(),
        Intent::Culture => culture_reply(),
        Intent::General => general_reply(),
        Intent::Invalid => (
            "Sorry, I couldn't make sense of that. Try asking about food, traffic, slang, plans or local customs."
                .to_string(),
            Vec::new(),
        ),
    };

    let slang_notes = slang_terms_in(&reply_text.to_lowercase())
        .into_iter()
        .map(|(term, meaning)| format!("{term} = {meaning}"))
        .collect::<Vec<_>>();

    let reply_text = if slang_notes.is_empty() || reply_text.contains(SLANG_FOOTER) {
        reply_text
    } else {
        format!("{reply_text}\n\n{SLANG_FOOTER}")
    };

    let sources = knowledge
        .map(|doc| {
            backing_sections
                .iter()
                .filter_map(|title| doc.section(title).map(|section| section.title.clone()))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    GuideReply {
        reply_text,
        intent: query.intent,
        time_slot: query.time_slot,
        location: query.location_slot,
        sources,
        slang_notes,
        json_payload: json!({
            "intent": query.intent,
            "confidence": query.confidence,
            "keywords": query.keywords,
            "time_slot": query.time_slot,
            "location": query.location_slot,
            "knowledge_source": knowledge.map(|doc| doc.source_path.clone()),
        }),
    }
}

/// Friendly prompt shown instead of a reply when the pipeline did not succeed.
pub fn rejection_reply(result: &ProcessingResult) -> String {
    match result.error_message.as_deref() {
        Some(message) => format!(
            "Swalpa adjust maadi! {message}. Please rephrase and ask me about Bengaluru food, traffic, slang, plans or customs."
        ),
        None => "Swalpa adjust maadi! Please rephrase your question about Bengaluru.".to_string(),
    }
}

fn food_reply(time: Option<TimeSlot>, location: Option<Location>) -> (String, Vec<&'static str>) {
    let mut text = match time {
        Some(TimeSlot::Morning) => {
            "Breakfast in Bengaluru is serious business! Go for idli, vada and a crisp masala dosa with filter coffee at a Darshini. ".to_string()
        }
        Some(TimeSlot::Afternoon) => {
            "Lunch time means a proper South Indian meal: rice, sambar, rasam, palya and curd rice. ".to_string()
        }
        Some(TimeSlot::Evening) | Some(TimeSlot::Night) => {
            "Evenings are for street food: chaat, bajjis and masala puri. ".to_string()
        }
        None => {
            "Bengaluru eats well at every hour, guru. Filter coffee and dosa never go wrong. ".to_string()
        }
    };

    match location {
        Some(Location::Malleshwaram) => text.push_str(
            "In Malleshwaram, hit up Janatha Hotel or any Upahara Darshini for sakkath dosas.",
        ),
        Some(Location::Basavanagudi) => text.push_str(
            "Basavanagudi has old-school tiffin rooms around Gandhi Bazaar, perfect for benne dosa.",
        ),
        Some(Location::VvPuram) => text.push_str(
            "VV Puram Food Street is the evening street food paradise, go hungry.",
        ),
        Some(Location::Koramangala) | Some(Location::Indiranagar) => text.push_str(
            "That side of town has hip cafes and pubs, but a Darshini is always around the corner.",
        ),
        Some(other) => text.push_str(&format!(
            "Around {}, ask for the nearest Darshini; the locals will point you right.",
            other.display_name()
        )),
        None => text.push_str(
            "Malleshwaram for breakfast and VV Puram Food Street for evening snacks are safe bets.",
        ),
    }

    (text, vec!["Popular Breakfast Spots and Street Food Areas"])
}

fn traffic_reply(
    text: &str,
    time: Option<TimeSlot>,
    location: Option<Location>,
) -> (String, Vec<&'static str>) {
    let lower = text.to_lowercase();
    let peak = time.map(TimeSlot::is_peak).unwrap_or(false)
        || contains_any(&lower, &["peak", "rush hour", "office hours"]);
    let profile = location.and_then(junction_profile);

    let reply = if contains_any(&lower, &["avoid", "alternative"]) {
        let mut reply = "To dodge the traffic madness: use Namma Metro whenever possible, take inner roads, and travel early morning or late evening.".to_string();
        if let (Some(location), Some(advice)) =
            (location, profile.and_then(|profile| profile.metro_advice))
        {
            reply.push_str(&format!(" For {}, {}.", location.display_name(), lowercase_first(advice)));
        }
        reply
    } else if let (Some(location), Some(profile)) = (location, profile) {
        if peak {
            let mut reply = format!("{} ", profile.warning);
            reply.push_str(match profile.level {
                CongestionLevel::Nightmare => "It's absolutely packed during these hours. ",
                CongestionLevel::Heavy => "Traffic is heavy during office hours. ",
                CongestionLevel::Moderate => "Traffic is busy but manageable. ",
            });
            if let Some(advice) = profile.metro_advice {
                reply.push_str(&format!("{advice}. "));
            }
            if location == Location::SilkBoard {
                reply.push_str("If you must drive, leave by 5 PM or wait till after 9 PM. ");
            }
            reply.push_str("Metro is definitely your best friend at this time!");
            reply
        } else {
            format!(
                "{} is usually worst during {}. Outside those hours it's manageable, but still plan some buffer time.",
                location.display_name(),
                profile.peak_hours
            )
        }
    } else if lower.contains("metro") {
        "Namma Metro is sakkath for beating traffic! The Purple Line runs east-west and the Green Line north-south. During peak hours (8-10 AM, 6-9 PM) it's much faster than the roads.".to_string()
    } else if peak {
        "Peak hours in Bengaluru are crazy, guru! Morning 8-10 AM and evening 6-9 PM are the worst. Major bottlenecks: Silk Board, Electronic City Flyover, ORR and Hebbal.".to_string()
    } else {
        "Bengaluru traffic can be unpredictable, machcha! Peak hours (8-10 AM, 6-9 PM) are the worst, and the metro is your best bet. Which area or time are you asking about?".to_string()
    };

    (reply, vec!["Traffic Patterns and Peak Hours"])
}

fn slang_reply(text: &str) -> (String, Vec<&'static str>) {
    let lower = text.to_lowercase();
    let found = slang_terms_in(&lower);

    let reply = if found.is_empty() {
        "Bengaluru slang mixes Kannada, Tamil, Hindi and English. Try asking about 'guru', 'machcha', 'sakkath' or 'scene illa maga'!".to_string()
    } else {
        found
            .iter()
            .map(|(term, meaning)| format!("'{term}' means {meaning}."))
            .collect::<Vec<_>>()
            .join(" ")
    };

    (reply, vec!["Local Slang and Meanings", "Languages Spoken"])
}

fn itinerary_reply() -> (String, Vec<&'static str>) {
    (
        "One day like a local: start with breakfast at a Malleshwaram Darshini, walk through Lalbagh or Cubbon Park before it gets hot, take the metro to MG Road for lunch, spend the afternoon at Bangalore Palace or Vidhana Soudha, and end the evening with street food at VV Puram. Avoid Silk Board and ORR during 6-9 PM!".to_string(),
        vec!["City Overview", "Practical Local Tips"],
    )
}

fn culture_reply() -> (String, Vec<&'static str>) {
    (
        "Bengaluru is relaxed but respectful: remove footwear before entering temples and homes, dress modestly at religious places, greet elders with a namaskara, and a few Kannada words like 'swalpa adjust maadi' go a long way.".to_string(),
        vec!["Cultural Norms and Etiquette"],
    )
}

fn general_reply() -> (String, Vec<&'static str>) {
    (
        "Namaskara! I can help with Bengaluru food spots, traffic and metro tips, local slang, one-day plans and cultural etiquette. What would you like to know, guru?".to_string(),
        vec!["City Overview", "Practical Local Tips"],
    )
}

fn slang_terms_in(lower: &str) -> Vec<(&'static str, &'static str)> {
    let mut found: Vec<(&'static str, &'static str)> = Vec::new();
    for (term, meaning) in SLANG_GLOSSARY {
        let covered = found.iter().any(|(existing, _)| existing.contains(term));
        if !covered && lower.contains(term) {
            found.push((term, meaning));
        }
    }
    found
}

fn lowercase_first(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| input.contains(needle))
}
