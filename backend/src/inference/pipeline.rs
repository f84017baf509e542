use image::imageops::FilterType;
use ndarray::Array4;
use thiserror::Error;

use crate::inference::model::{Classifier, IMG_SIZE, NUM_CLASSES};
use shared::{ClassificationResponse, TumorClass};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("uploaded bytes are not a decodable image")]
    Decode(#[from] image::ImageError),
    #[error("could not shape data for the classifier: {0}")]
    Shape(String),
}

/// Decode, resize and scale an uploaded image into the (1, 128, 128, 3)
/// batch the classifier expects.
///
/// The resize is exact, without preserving aspect ratio; distortion from
/// non-square sources matches the fixed-size input the model was trained on.
pub fn preprocess(raw: &[u8]) -> Result<Array4<f32>, PipelineError> {
    let img = image::load_from_memory(raw)?
        .resize_exact(IMG_SIZE, IMG_SIZE, FilterType::Triangle)
        .to_rgb8();
    let scaled: Vec<f32> = img.into_raw().iter().map(|&v| v as f32 / 255.0).collect();
    Array4::from_shape_vec((1, IMG_SIZE as usize, IMG_SIZE as usize, 3), scaled)
        .map_err(|e| PipelineError::Shape(e.to_string()))
}

/// Map the classifier's score vector to the user-visible result.
///
/// The "tumor size" field is a rough category derived from confidence alone,
/// not a measurement of physical tumor extent.
pub fn interpret(predictions: &[f32]) -> Result<ClassificationResponse, PipelineError> {
    if predictions.len() != NUM_CLASSES {
        return Err(PipelineError::Shape(format!(
            "expected {NUM_CLASSES} class scores, got {}",
            predictions.len()
        )));
    }

    // Ties resolve to the lowest index.
    let mut class_index = 0;
    for (i, &score) in predictions.iter().enumerate() {
        if score > predictions[class_index] {
            class_index = i;
        }
    }
    let label = TumorClass::ALL[class_index];
    let confidence = round2(predictions[class_index] * 100.0);

    let (tumor_name, tumor_size) = if label == TumorClass::NoTumor {
        ("No Tumor Detected".to_string(), "To be Fetched".to_string())
    } else {
        (format!("{label} Tumor"), size_category(confidence).to_string())
    };

    Ok(ClassificationResponse {
        prediction: label.to_string(),
        confidence,
        tumor_name,
        tumor_size,
    })
}

/// Full pipeline: raw upload bytes to classification result.
pub fn classify(
    classifier: &Classifier,
    raw: &[u8],
) -> Result<ClassificationResponse, PipelineError> {
    let input = preprocess(raw)?;
    let predictions = classifier.predict(&input)?;
    interpret(&predictions)
}

fn size_category(confidence: f32) -> &'static str {
    if confidence >= 85.0 {
        "Large (high confidence)"
    } else if confidence >= 60.0 {
        "Medium"
    } else {
        "Small / Early-stage (low confidence)"
    }
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb(color));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn preprocess_resizes_any_input_to_fixed_shape() {
        for (w, h) in [(1, 1), (640, 480), (128, 128), (37, 213)] {
            let tensor = preprocess(&png_bytes(w, h, [120, 40, 200])).unwrap();
            assert_eq!(tensor.dim(), (1, 128, 128, 3));
            assert!(tensor.iter().all(|&v| (0.0..=1.0).contains(&v)));
        }
    }

    #[test]
    fn preprocess_discards_alpha_channel() {
        let img = RgbaImage::from_pixel(64, 64, Rgba([10, 20, 30, 128]));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        let tensor = preprocess(&buf).unwrap();
        assert_eq!(tensor.dim(), (1, 128, 128, 3));
    }

    #[test]
    fn preprocess_scales_intensities_into_unit_range() {
        let tensor = preprocess(&png_bytes(32, 32, [255, 0, 51])).unwrap();
        assert!((tensor[[0, 64, 64, 0]] - 1.0).abs() < 1e-6);
        assert!(tensor[[0, 64, 64, 1]].abs() < 1e-6);
        assert!((tensor[[0, 64, 64, 2]] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn preprocess_rejects_empty_upload() {
        assert!(matches!(preprocess(&[]), Err(PipelineError::Decode(_))));
    }

    #[test]
    fn preprocess_rejects_non_image_bytes() {
        assert!(matches!(
            preprocess(b"definitely not an image"),
            Err(PipelineError::Decode(_))
        ));
    }

    #[test]
    fn preprocess_is_deterministic() {
        let bytes = png_bytes(200, 100, [17, 93, 201]);
        assert_eq!(preprocess(&bytes).unwrap(), preprocess(&bytes).unwrap());
    }

    #[test]
    fn glioma_scenario() {
        let result = interpret(&[0.9, 0.03, 0.02, 0.05]).unwrap();
        assert_eq!(result.prediction, "Glioma");
        assert_eq!(result.confidence, 90.0);
        assert_eq!(result.tumor_name, "Glioma Tumor");
        assert_eq!(result.tumor_size, "Large (high confidence)");
    }

    #[test]
    fn no_tumor_scenario() {
        let result = interpret(&[0.1, 0.1, 0.1, 0.7]).unwrap();
        assert_eq!(result.prediction, "No Tumor");
        assert_eq!(result.confidence, 70.0);
        assert_eq!(result.tumor_name, "No Tumor Detected");
        assert_eq!(result.tumor_size, "To be Fetched");
    }

    #[test]
    fn argmax_tie_picks_lowest_index() {
        let result = interpret(&[0.4, 0.4, 0.1, 0.1]).unwrap();
        assert_eq!(result.prediction, "Glioma");
    }

    #[test]
    fn size_category_threshold_edges() {
        assert_eq!(
            interpret(&[0.85, 0.05, 0.05, 0.05]).unwrap().tumor_size,
            "Large (high confidence)"
        );
        assert_eq!(interpret(&[0.60, 0.2, 0.1, 0.1]).unwrap().tumor_size, "Medium");
        assert_eq!(
            interpret(&[0.5999, 0.2, 0.1, 0.1]).unwrap().tumor_size,
            "Small / Early-stage (low confidence)"
        );
    }

    #[test]
    fn confidence_rounds_to_two_decimals() {
        let result = interpret(&[0.33333, 0.3, 0.2, 0.1]).unwrap();
        assert_eq!(result.confidence, 33.33);
    }

    #[test]
    fn interpret_rejects_wrong_arity() {
        assert!(matches!(
            interpret(&[0.5, 0.5]),
            Err(PipelineError::Shape(_))
        ));
        assert!(matches!(interpret(&[]), Err(PipelineError::Shape(_))));
    }
}
