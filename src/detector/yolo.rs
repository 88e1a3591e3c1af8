// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Learned damage detector (YOLO-family ONNX model).
//!
//! The session and label vocabulary are loaded once at startup and shared
//! read-only across requests; the underlying `ort` session is serialized
//! behind a mutex. Runs on CPU only.

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::{Array4, ArrayView3, Ix3};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use super::{DetectedRegion, DetectionParams, Detector, DetectorError};

/// Letterbox padding intensity (the YOLO training convention, 114/255).
const PAD_VALUE: f32 = 114.0 / 255.0;

/// Geometry of the letterbox transform, needed to map detections back to
/// original-image coordinates.
#[derive(Debug, Clone, Copy)]
struct Letterbox {
    scale: f32,
    pad_x: f32,
    pad_y: f32,
    orig_w: u32,
    orig_h: u32,
}

/// A raw model detection in letterboxed input coordinates.
#[derive(Debug, Clone)]
struct Candidate {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
    class_id: usize,
    confidence: f32,
}

/// Learned object-detection model over `ort`.
pub struct YoloDetector {
    /// ONNX Runtime session (thread-safe)
    session: Arc<Mutex<Session>>,
    /// Model input name
    input_name: String,
    /// Stable index-to-label vocabulary loaded at startup
    labels: Vec<String>,
}

impl std::fmt::Debug for YoloDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloDetector")
            .field("input_name", &self.input_name)
            .field("labels", &self.labels.len())
            .finish_non_exhaustive()
    }
}

impl YoloDetector {
    /// Load the detection model and its label vocabulary.
    ///
    /// # Errors
    /// Returns error if the model or labels file is missing, or ONNX Runtime
    /// initialization fails.
    pub fn load<P: AsRef<Path>>(model_path: P, labels_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();
        let labels_path = labels_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("Detection model not found: {}", model_path.display());
        }

        let labels = load_labels(labels_path)?;

        info!(
            "Loading damage detection model from {} ({} classes)",
            model_path.display(),
            labels.len()
        );

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load detection model from {}",
                model_path.display()
            ))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        debug!("Detection model loaded - input: {}", input_name);
        info!("Damage detection model loaded successfully (CPU-only)");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            labels,
        })
    }

    /// Label vocabulary associated with the loaded model.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl Detector for YoloDetector {
    fn name(&self) -> &'static str {
        "yolo-onnx"
    }

    fn detect(
        &self,
        image: &DynamicImage,
        params: &DetectionParams,
    ) -> Result<Vec<DetectedRegion>, DetectorError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(DetectorError::Inference("empty input image".to_string()));
        }
        if params.input_size == 0 {
            return Err(DetectorError::Inference(
                "inference size must be non-zero".to_string(),
            ));
        }

        let (input, letterbox) = preprocess(image, params.input_size);

        let mut session = self.session.lock().unwrap();
        let input_value = Value::from_array(input)
            .map_err(|e| DetectorError::Inference(format!("input tensor: {e}")))?;
        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .map_err(|e| DetectorError::Inference(e.to_string()))?;
        let output = outputs[0]
            .try_extract_array::<f32>()
            .map_err(|e| DetectorError::Inference(format!("output tensor: {e}")))?;

        // Expected layout [1, 4 + num_classes, num_anchors]
        let preds = output
            .view()
            .into_dimensionality::<Ix3>()
            .map_err(|_| {
                DetectorError::Inference(format!(
                    "unexpected output shape: {:?}",
                    output.shape()
                ))
            })?;
        if preds.shape()[0] != 1 || preds.shape()[1] <= 4 {
            return Err(DetectorError::Inference(format!(
                "unexpected output shape: {:?}",
                preds.shape()
            )));
        }

        let mut candidates = parse_predictions(preds, params.confidence_threshold);
        let kept = nms(&mut candidates, params.iou_threshold);
        let regions = to_regions(&kept, &letterbox, &self.labels);

        debug!(
            "Detected {} regions ({} raw candidates)",
            regions.len(),
            candidates.len()
        );

        Ok(regions)
    }
}

fn load_labels(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .context(format!("Failed to read labels file {}", path.display()))?;
    let labels: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();
    if labels.is_empty() {
        anyhow::bail!("Labels file {} contains no classes", path.display());
    }
    Ok(labels)
}

/// Letterbox the image into a square NCHW tensor normalized to [0, 1].
fn preprocess(image: &DynamicImage, size: u32) -> (Array4<f32>, Letterbox) {
    let (orig_w, orig_h) = (image.width(), image.height());
    let scale = (size as f32 / orig_w as f32).min(size as f32 / orig_h as f32);
    let new_w = ((orig_w as f32 * scale).round() as u32).clamp(1, size);
    let new_h = ((orig_h as f32 * scale).round() as u32).clamp(1, size);
    let pad_x = (size - new_w) / 2;
    let pad_y = (size - new_h) / 2;

    let resized = image
        .resize_exact(new_w, new_h, FilterType::Triangle)
        .to_rgb8();

    let mut tensor = Array4::<f32>::from_elem((1, 3, size as usize, size as usize), PAD_VALUE);
    for (x, y, pixel) in resized.enumerate_pixels() {
        let tx = (x + pad_x) as usize;
        let ty = (y + pad_y) as usize;
        for c in 0..3 {
            tensor[[0, c, ty, tx]] = pixel.0[c] as f32 / 255.0;
        }
    }

    (
        tensor,
        Letterbox {
            scale,
            pad_x: pad_x as f32,
            pad_y: pad_y as f32,
            orig_w,
            orig_h,
        },
    )
}

/// Decode the raw prediction tensor: per anchor, take the best-scoring class
/// and keep it only at or above the confidence threshold.
fn parse_predictions(preds: ArrayView3<f32>, conf_threshold: f32) -> Vec<Candidate> {
    let num_attrs = preds.shape()[1];
    let num_anchors = preds.shape()[2];
    let num_classes = num_attrs - 4;

    let mut candidates = Vec::new();
    for i in 0..num_anchors {
        let mut best_conf = 0.0f32;
        let mut best_class = 0usize;
        for c in 0..num_classes {
            let conf = preds[[0, 4 + c, i]];
            if conf > best_conf {
                best_conf = conf;
                best_class = c;
            }
        }
        if best_conf < conf_threshold {
            continue;
        }

        let cx = preds[[0, 0, i]];
        let cy = preds[[0, 1, i]];
        let w = preds[[0, 2, i]];
        let h = preds[[0, 3, i]];
        candidates.push(Candidate {
            x1: cx - w / 2.0,
            y1: cy - h / 2.0,
            x2: cx + w / 2.0,
            y2: cy + h / 2.0,
            class_id: best_class,
            confidence: best_conf,
        });
    }
    candidates
}

/// Non-maximum suppression over corner-form boxes.
fn nms(candidates: &mut Vec<Candidate>, iou_threshold: f32) -> Vec<Candidate> {
    if candidates.is_empty() {
        return vec![];
    }

    candidates.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = vec![];
    let mut suppressed = vec![false; candidates.len()];
    for i in 0..candidates.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(candidates[i].clone());
        for j in (i + 1)..candidates.len() {
            if !suppressed[j] && iou(&candidates[i], &candidates[j]) > iou_threshold {
                suppressed[j] = true;
            }
        }
    }
    keep
}

fn iou(a: &Candidate, b: &Candidate) -> f32 {
    let x1 = a.x1.max(b.x1);
    let y1 = a.y1.max(b.y1);
    let x2 = a.x2.min(b.x2);
    let y2 = a.y2.min(b.y2);

    let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let area_a = (a.x2 - a.x1) * (a.y2 - a.y1);
    let area_b = (b.x2 - b.x1) * (b.y2 - b.y1);
    let union = area_a + area_b - intersection;

    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}

/// Undo the letterbox transform and clamp into the original image.
fn to_regions(candidates: &[Candidate], lb: &Letterbox, labels: &[String]) -> Vec<DetectedRegion> {
    candidates
        .iter()
        .map(|c| {
            let map_x = |x: f32| ((x - lb.pad_x) / lb.scale).clamp(0.0, lb.orig_w as f32);
            let map_y = |y: f32| ((y - lb.pad_y) / lb.scale).clamp(0.0, lb.orig_h as f32);
            let x1 = map_x(c.x1).round() as i32;
            let y1 = map_y(c.y1).round() as i32;
            let x2 = map_x(c.x2).round() as i32;
            let y2 = map_y(c.y2).round() as i32;

            let label = labels.get(c.class_id).cloned().unwrap_or_else(|| {
                warn!("No label for class index {}", c.class_id);
                format!("class_{}", c.class_id)
            });

            DetectedRegion {
                x1: x1.min(x2),
                y1: y1.min(y2),
                x2: x1.max(x2),
                y2: y1.max(y2),
                label,
                confidence: c.confidence,
            }
        })
        .collect()
}
