use super::types::{Classification, ClassificationSource, CrackType, RepairLevel};

const MOCK_CRACK_TYPES: [CrackType; 4] = [
    CrackType::Longitudinal,
    CrackType::Transverse,
    CrackType::Alligator,
    CrackType::Pothole,
];

const MOCK_REPAIR_LEVELS: [RepairLevel; 4] = [
    RepairLevel::Immediate,
    RepairLevel::Moderate,
    RepairLevel::Low,
    RepairLevel::None,
];

/// Deterministic stand-in result that depends only on the image length.
pub fn mock_classification(image: &[u8], note: impl Into<String>) -> Classification {
    let n = image.len();
    Classification {
        crack_type: MOCK_CRACK_TYPES[n % MOCK_CRACK_TYPES.len()],
        repair_level: MOCK_REPAIR_LEVELS[(n / 3) % MOCK_REPAIR_LEVELS.len()],
        raw: note.into(),
        source: ClassificationSource::Mock,
    }
}
