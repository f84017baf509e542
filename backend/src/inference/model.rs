use std::path::Path;
use std::sync::Mutex;

use ndarray::Array4;
use tch::nn::ModuleT;
use tch::{CModule, Device, Kind, TchError, Tensor};

use crate::inference::pipeline::PipelineError;
use shared::TumorClass;

/// Edge length the classifier was trained on.
pub const IMG_SIZE: u32 = 128;
/// Arity of the classifier's output vector.
pub const NUM_CLASSES: usize = TumorClass::ALL.len();

/// A loaded TorchScript classifier.
///
/// Forward passes are serialized behind a mutex; the module is not assumed
/// to be safe for concurrent calls.
pub struct Classifier {
    module: Mutex<CModule>,
    device: Device,
}

impl Classifier {
    pub fn load(path: &Path) -> Result<Self, TchError> {
        let device = Device::cuda_if_available();
        let module = CModule::load_on_device(path, device)?;
        Ok(Self {
            module: Mutex::new(module),
            device,
        })
    }

    /// Run one forward pass over a normalized (1, 128, 128, 3) batch and
    /// return the four class scores in training order.
    pub fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>, PipelineError> {
        let data = input
            .as_slice()
            .ok_or_else(|| PipelineError::Shape("input tensor is not contiguous".into()))?;
        let tensor = Tensor::from_slice(data)
            .view([1, IMG_SIZE as i64, IMG_SIZE as i64, 3])
            .to_device(self.device);

        let output = self.module.lock().unwrap().forward_t(&tensor, false);
        let output_flat = output.to_kind(Kind::Float).view([-1]);
        let num_elements = output_flat.size()[0] as usize;
        if num_elements != NUM_CLASSES {
            return Err(PipelineError::Shape(format!(
                "classifier returned {num_elements} scores, expected {NUM_CLASSES}"
            )));
        }

        let mut scores = vec![0.0f32; num_elements];
        output_flat.copy_data(&mut scores, num_elements);
        Ok(scores)
    }
}
