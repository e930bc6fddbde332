#![cfg(feature = "serde")]

use ai_core::Vec3;
use ai_perception::{RecommendedAction, ThreatAssessment, ThreatEntity, ThreatKey, ThreatLevel};

#[test]
fn assessment_serializes_with_snake_case_tags() {
    let assessment = ThreatAssessment {
        threats: vec![ThreatEntity {
            key: ThreatKey::new("zombie", 3),
            kind: "zombie".to_string(),
            position: Vec3::new(1.0, 64.0, -3.0),
            last_seen_ms: 42,
            distance: 4.5,
            has_line_of_sight: true,
            threat_score: 54.6,
            is_self: false,
        }],
        overall_threat_level: ThreatLevel::Medium,
        recommended_action: RecommendedAction::FindShelter,
        overall_score: 54.6,
    };

    let json = serde_json::to_value(&assessment).unwrap();
    assert_eq!(json["overall_threat_level"], "medium");
    assert_eq!(json["recommended_action"], "find_shelter");
    assert_eq!(json["threats"][0]["key"]["kind"], "zombie");

    let back: ThreatAssessment = serde_json::from_value(json).unwrap();
    assert_eq!(back, assessment);
}
