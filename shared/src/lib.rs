use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// The four MRI classes, in the index order the classifier was trained with.
#[derive(Serialize, Deserialize, Display, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TumorClass {
    Glioma,
    Meningioma,
    Pituitary,
    #[serde(rename = "No Tumor")]
    #[strum(serialize = "No Tumor")]
    NoTumor,
}

impl TumorClass {
    /// Classifier output order: index i of the prediction vector scores ALL[i].
    pub const ALL: [TumorClass; 4] = [
        TumorClass::Glioma,
        TumorClass::Meningioma,
        TumorClass::Pituitary,
        TumorClass::NoTumor,
    ];
}

/// Result of classifying one uploaded scan.
///
/// `tumor_size` is a rough category derived from model confidence, not a
/// measurement of physical tumor extent.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ClassificationResponse {
    pub prediction: String,
    pub confidence: f32,
    pub tumor_name: String,
    pub tumor_size: String,
}
