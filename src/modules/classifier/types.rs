use serde::{Deserialize, Serialize};
use sqlx::Type;

/// Road damage category estimated from a photo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
pub enum CrackType {
    #[serde(rename = "longitudinal crack")]
    #[sqlx(rename = "longitudinal crack")]
    Longitudinal,
    #[serde(rename = "transverse crack")]
    #[sqlx(rename = "transverse crack")]
    Transverse,
    #[serde(rename = "alligator crack")]
    #[sqlx(rename = "alligator crack")]
    Alligator,
    #[serde(rename = "pothole")]
    #[sqlx(rename = "pothole")]
    Pothole,
    #[serde(rename = "unknown")]
    #[sqlx(rename = "unknown")]
    Unknown,
}

impl CrackType {
    /// Order in which labels are searched for in free-text responses
    pub const KEYWORD_ORDER: [CrackType; 4] = [
        CrackType::Longitudinal,
        CrackType::Transverse,
        CrackType::Alligator,
        CrackType::Pothole,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CrackType::Longitudinal => "longitudinal crack",
            CrackType::Transverse => "transverse crack",
            CrackType::Alligator => "alligator crack",
            CrackType::Pothole => "pothole",
            CrackType::Unknown => "unknown",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().to_lowercase();
        Self::KEYWORD_ORDER
            .into_iter()
            .chain(std::iter::once(CrackType::Unknown))
            .find(|t| t.label() == label)
    }
}

impl std::fmt::Display for CrackType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Repair priority, most urgent first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum RepairLevel {
    Immediate,
    Moderate,
    Low,
    None,
}

impl RepairLevel {
    /// Order in which labels are searched for in free-text responses
    pub const KEYWORD_ORDER: [RepairLevel; 4] = [
        RepairLevel::Immediate,
        RepairLevel::Moderate,
        RepairLevel::Low,
        RepairLevel::None,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RepairLevel::Immediate => "immediate",
            RepairLevel::Moderate => "moderate",
            RepairLevel::Low => "low",
            RepairLevel::None => "none",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim().to_lowercase();
        Self::KEYWORD_ORDER.into_iter().find(|l| l.label() == label)
    }
}

impl std::fmt::Display for RepairLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Which path produced a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationSource {
    /// Labels read from a JSON object in the service response
    Structured,
    /// Labels found by keyword search over the response text
    Keyword,
    /// Deterministic stand-in computed locally
    Mock,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub crack_type: CrackType,
    pub repair_level: RepairLevel,
    /// Response body, or a note explaining why the mock was used
    pub raw: String,
    pub source: ClassificationSource,
}
