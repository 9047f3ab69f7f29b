use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::validate::QueryRejection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Food,
    Traffic,
    Slang,
    Itinerary,
    Culture,
    General,
    Invalid,
}

impl Intent {
    pub fn as_code(self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Traffic => "traffic",
            Self::Slang => "slang",
            Self::Itinerary => "itinerary",
            Self::Culture => "culture",
            Self::General => "general",
            Self::Invalid => "invalid",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "food" => Some(Self::Food),
            "traffic" => Some(Self::Traffic),
            "slang" => Some(Self::Slang),
            "itinerary" => Some(Self::Itinerary),
            "culture" => Some(Self::Culture),
            "general" => Some(Self::General),
            "invalid" => Some(Self::Invalid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeSlot {
    /// Maps a 24-hour clock hour onto a period.
    ///
    /// 06-10 is morning, 11-16 afternoon, 17-21 evening and 22-05 night.
    pub fn from_hour(hour: u8) -> Self {
        match hour % 24 {
            6..=10 => Self::Morning,
            11..=16 => Self::Afternoon,
            17..=21 => Self::Evening,
            _ => Self::Night,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Afternoon => "afternoon",
            Self::Evening => "evening",
            Self::Night => "night",
        }
    }

    /// Morning and evening are the city's rush periods.
    pub fn is_peak(self) -> bool {
        matches!(self, Self::Morning | Self::Evening)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Malleshwaram,
    Basavanagudi,
    Koramangala,
    Indiranagar,
    Whitefield,
    ElectronicCity,
    SilkBoard,
    OuterRingRoad,
    BannerghattaRoad,
    Hebbal,
    HosurRoad,
    VvPuram,
    Shivajinagar,
    Jayanagar,
    MgRoad,
}

impl Location {
    pub fn as_key(self) -> &'static str {
        match self {
            Self::Malleshwaram => "malleshwaram",
            Self::Basavanagudi => "basavanagudi",
            Self::Koramangala => "koramangala",
            Self::Indiranagar => "indiranagar",
            Self::Whitefield => "whitefield",
            Self::ElectronicCity => "electronic_city",
            Self::SilkBoard => "silk_board",
            Self::OuterRingRoad => "outer_ring_road",
            Self::BannerghattaRoad => "bannerghatta_road",
            Self::Hebbal => "hebbal",
            Self::HosurRoad => "hosur_road",
            Self::VvPuram => "vv_puram",
            Self::Shivajinagar => "shivajinagar",
            Self::Jayanagar => "jayanagar",
            Self::MgRoad => "mg_road",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Malleshwaram => "Malleshwaram",
            Self::Basavanagudi => "Basavanagudi",
            Self::Koramangala => "Koramangala",
            Self::Indiranagar => "Indiranagar",
            Self::Whitefield => "Whitefield",
            Self::ElectronicCity => "Electronic City",
            Self::SilkBoard => "Silk Board Junction",
            Self::OuterRingRoad => "Outer Ring Road (ORR)",
            Self::BannerghattaRoad => "Bannerghatta Road",
            Self::Hebbal => "Hebbal Flyover",
            Self::HosurRoad => "Hosur Road",
            Self::VvPuram => "VV Puram",
            Self::Shivajinagar => "Shivajinagar",
            Self::Jayanagar => "Jayanagar",
            Self::MgRoad => "MG Road",
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_key())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawQuery {
    pub text: String,
    pub received_at: DateTime<Utc>,
    pub session_id: String,
}

impl RawQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            received_at: Utc::now(),
            session_id: Self::new_session_id(),
        }
    }

    pub fn new_session_id() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn with_session(text: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            received_at: Utc::now(),
            session_id: session_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Accepted { sanitized_text: String },
    Rejected { reason: QueryRejection },
}

impl ValidationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    pub fn sanitized_text(&self) -> Option<&str> {
        match self {
            Self::Accepted { sanitized_text } => Some(sanitized_text),
            Self::Rejected { .. } => None,
        }
    }

    pub fn rejection_reason(&self) -> Option<&QueryRejection> {
        match self {
            Self::Accepted { .. } => None,
            Self::Rejected { reason } => Some(reason),
        }
    }
}

/// A classified query is only usable above this confidence.
pub const MIN_VALID_CONFIDENCE: f32 = 0.3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedQuery {
    pub original_text: String,
    pub sanitized_text: String,
    pub intent: Intent,
    pub confidence: f32,
    pub keywords: Vec<String>,
    pub time_slot: Option<TimeSlot>,
    pub location_slot: Option<Location>,
    pub is_valid: bool,
}

impl ClassifiedQuery {
    pub fn invalid(original_text: &str) -> Self {
        Self {
            original_text: original_text.to_string(),
            sanitized_text: String::new(),
            intent: Intent::Invalid,
            confidence: 0.0,
            keywords: Vec::new(),
            time_slot: None,
            location_slot: None,
            is_valid: false,
        }
    }

    pub fn is_usable(intent: Intent, confidence: f32) -> bool {
        intent != Intent::Invalid && confidence > MIN_VALID_CONFIDENCE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Received,
    Validating,
    Rejected,
    Validated,
    Classifying,
    Slotting,
    Complete,
    Faulted,
}

impl PipelineStage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Complete | Self::Faulted)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub classified_query: ClassifiedQuery,
    pub elapsed_ms: f64,
    pub success: bool,
    pub error_message: Option<String>,
    pub stage: PipelineStage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeSection {
    pub title: String,
    pub body: String,
}

/// Immutable snapshot of the city knowledge document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeDoc {
    pub source_path: String,
    pub title: String,
    pub body: String,
    pub sections: Vec<KnowledgeSection>,
    pub last_modified: DateTime<Utc>,
}

impl KnowledgeDoc {
    pub fn section(&self, title: &str) -> Option<&KnowledgeSection> {
        self.sections
            .iter()
            .find(|section| section.title.eq_ignore_ascii_case(title.trim()))
    }

    pub fn has_section(&self, title: &str) -> bool {
        self.section(title).is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuideReply {
    pub reply_text: String,
    pub intent: Intent,
    pub time_slot: Option<TimeSlot>,
    pub location: Option<Location>,
    pub sources: Vec<String>,
    pub slang_notes: Vec<String>,
    pub json_payload: Value,
}
