//! Detection and tracker fixtures

use deepsort_cascade_rs::{
    ClassId, CornerBox, FaceDetection, FeatureBlob, ObjectDetection, ScenarioConfig,
    ScenarioFrame, ScenarioGenerator, Tracker, TrackerConfig,
};

pub const PERSON: ClassId = ClassId(0);
pub const CAR: ClassId = ClassId(2);

/// Object detection from corner coordinates
pub fn det(class_id: ClassId, [x1, y1, x2, y2]: [f32; 4], score: f32) -> ObjectDetection {
    ObjectDetection::new(class_id, CornerBox::new(x1, y1, x2, y2), score)
}

/// Person detection carrying an int8 appearance feature
pub fn person_with_feature(corners: [f32; 4], score: f32, feature: &[i8]) -> ObjectDetection {
    det(PERSON, corners, score).with_feature(FeatureBlob::int8(feature))
}

pub fn face(corners: [f32; 4]) -> FaceDetection {
    let [x1, y1, x2, y2] = corners;
    FaceDetection::new(CornerBox::new(x1, y1, x2, y2), 0.9)
}

/// Tracker with default configuration except the retention period
pub fn tracker_with_max_age(max_age: u32) -> Tracker {
    let config = TrackerConfig::builder()
        .max_age(max_age)
        .build()
        .expect("valid config");
    Tracker::new(config).expect("valid tracker")
}

/// Frames of a seeded synthetic scenario
pub fn scenario(config: ScenarioConfig, seed: u64) -> Vec<ScenarioFrame> {
    ScenarioGenerator::new(config, seed)
        .expect("valid scenario")
        .generate()
}
