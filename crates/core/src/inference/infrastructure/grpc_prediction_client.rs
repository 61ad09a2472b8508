use std::collections::HashMap;

use thiserror::Error;

use crate::inference::domain::inference_client::InferenceClient;
use crate::inference::domain::model_spec::{ModelSpec, OutputNames};
use crate::inference::domain::raw_detections::RawDetections;
use crate::inference::domain::tensor::{Tensor, TensorDType};
use crate::inference::infrastructure::serving_proto as pb;
use crate::transport::grpc_channel::{ChannelOptions, GrpcChannel, TransportError};

#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("model output '{0}' missing from response")]
    MissingOutput(String),
    #[error("model output '{name}' has dtype {dtype}, expected float")]
    UnexpectedDtype { name: String, dtype: i32 },
    #[error("model output '{name}' has {len} content bytes, not a whole number of floats")]
    MalformedContent { name: String, len: usize },
}

/// Detection client for a TensorFlow Serving `PredictionService`.
pub struct GrpcPredictionClient {
    channel: GrpcChannel,
    spec: ModelSpec,
    outputs: OutputNames,
}

impl GrpcPredictionClient {
    pub fn connect(
        address: &str,
        options: &ChannelOptions,
        spec: ModelSpec,
        outputs: OutputNames,
    ) -> Result<Self, TransportError> {
        Ok(Self {
            channel: GrpcChannel::connect(address, options)?,
            spec,
            outputs,
        })
    }
}

impl InferenceClient for GrpcPredictionClient {
    fn infer(&mut self, tensor: &Tensor<'_>) -> Result<RawDetections, Box<dyn std::error::Error>> {
        let request = build_request(&self.spec, tensor);
        let response: pb::PredictResponse = self.channel.unary(pb::PREDICT_PATH, request)?;
        Ok(parse_response(&response, &self.outputs)?)
    }
}

/// Wraps `tensor` as the single named input of a model-scoped request.
fn build_request(spec: &ModelSpec, tensor: &Tensor<'_>) -> pb::PredictRequest {
    let dtype = match tensor.dtype() {
        TensorDType::Uint8 => pb::DataType::DtUint8,
    };
    let input = pb::TensorProto {
        dtype: dtype as i32,
        tensor_shape: Some(pb::TensorShapeProto {
            dim: tensor
                .shape()
                .iter()
                .map(|&size| pb::TensorShapeDim {
                    size,
                    name: String::new(),
                })
                .collect(),
            unknown_rank: false,
        }),
        tensor_content: tensor.content().to_vec(),
        ..Default::default()
    };

    pb::PredictRequest {
        model_spec: Some(pb::ModelSpec {
            name: spec.name.clone(),
            version: Some(pb::Int64Value {
                value: spec.version,
            }),
            signature_name: spec.signature_name.clone(),
        }),
        inputs: HashMap::from([(spec.input_name.clone(), input)]),
        output_filter: Vec::new(),
    }
}

fn parse_response(
    response: &pb::PredictResponse,
    names: &OutputNames,
) -> Result<RawDetections, InferenceError> {
    let scores = float_output(response, &names.scores)?;
    let classes = float_output(response, &names.classes)?;
    let boxes = float_output(response, &names.boxes)?;

    // Optional: a model without the count output still yields usable slots.
    let num_detections = match &names.num_detections {
        Some(name) if response.outputs.contains_key(name) => float_output(response, name)?
            .first()
            .filter(|n| n.is_finite() && **n >= 0.0)
            .map(|&n| n as usize),
        _ => None,
    };

    Ok(RawDetections {
        scores,
        classes,
        boxes,
        num_detections,
    })
}

/// Reads a float tensor from `float_val`, falling back to little-endian
/// `tensor_content`.
fn float_output(response: &pb::PredictResponse, name: &str) -> Result<Vec<f32>, InferenceError> {
    let tensor = response
        .outputs
        .get(name)
        .ok_or_else(|| InferenceError::MissingOutput(name.to_string()))?;

    if !tensor.float_val.is_empty() {
        return Ok(tensor.float_val.clone());
    }
    if tensor.tensor_content.is_empty() {
        return Ok(Vec::new());
    }
    if tensor.dtype != pb::DataType::DtFloat as i32 {
        return Err(InferenceError::UnexpectedDtype {
            name: name.to_string(),
            dtype: tensor.dtype,
        });
    }
    if tensor.tensor_content.len() % 4 != 0 {
        return Err(InferenceError::MalformedContent {
            name: name.to_string(),
            len: tensor.tensor_content.len(),
        });
    }
    Ok(tensor
        .tensor_content
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}
