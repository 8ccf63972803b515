//! Types for the tool module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::job::JobVariant;

use super::config::ToolConfig;

/// Top-level verb passed to the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolCommand {
    /// Process one target with the given sources.
    HeadlessRun,
    /// Process with several sources in one run.
    BatchRun,
}

impl ToolCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HeadlessRun => "headless-run",
            Self::BatchRun => "batch-run",
        }
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order in which detected faces are matched to sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FaceSelectorOrder {
    LeftRight,
    RightLeft,
    TopBottom,
    BottomTop,
    SmallLarge,
    LargeSmall,
    BestWorst,
    WorstBest,
}

impl FaceSelectorOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeftRight => "left-right",
            Self::RightLeft => "right-left",
            Self::TopBottom => "top-bottom",
            Self::BottomTop => "bottom-top",
            Self::SmallLarge => "small-large",
            Self::LargeSmall => "large-small",
            Self::BestWorst => "best-worst",
            Self::WorstBest => "worst-best",
        }
    }

    /// The reverse ordering, used to match a second source to the complementary face.
    pub fn opposite(&self) -> Self {
        match self {
            Self::LeftRight => Self::RightLeft,
            Self::RightLeft => Self::LeftRight,
            Self::TopBottom => Self::BottomTop,
            Self::BottomTop => Self::TopBottom,
            Self::SmallLarge => Self::LargeSmall,
            Self::LargeSmall => Self::SmallLarge,
            Self::BestWorst => Self::WorstBest,
            Self::WorstBest => Self::BestWorst,
        }
    }
}

impl fmt::Display for FaceSelectorOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed option set for one tool invocation.
///
/// `None` fields are omitted from the command line and left to the tool's
/// own defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapParameters {
    pub processors: Vec<String>,
    pub face_detector_model: Option<String>,
    pub face_detector_size: Option<String>,
    pub face_detector_angles: Vec<u16>,
    pub face_detector_score: Option<f32>,
    pub face_landmarker_model: Option<String>,
    pub face_landmarker_score: Option<f32>,
    pub face_selector_mode: Option<String>,
    pub face_selector_order: Option<FaceSelectorOrder>,
    pub face_selector_gender: Option<String>,
    /// Inclusive age range `(start, end)`.
    pub face_selector_age: Option<(u8, u8)>,
    pub reference_face_distance: Option<f32>,
    pub face_mask_types: Vec<String>,
    pub face_mask_blur: Option<f32>,
    /// Top, right, bottom, left padding in percent.
    pub face_mask_padding: Option<[u8; 4]>,
    pub execution_providers: Vec<String>,
    pub execution_thread_count: Option<u32>,
    pub execution_queue_count: Option<u32>,
    pub face_swapper_pixel_boost: Option<String>,
    pub output_image_quality: Option<u8>,
    pub output_image_resolution: Option<String>,
    pub output_video_encoder: Option<String>,
    pub output_video_preset: Option<String>,
    pub output_video_quality: Option<u8>,
    pub output_video_resolution: Option<String>,
    pub output_video_fps: Option<u32>,
    pub log_level: Option<String>,
    /// Skip the tool's model download check.
    pub skip_download: bool,
}

const OUTPUT_RESOLUTION: &str = "1920x1080";

impl SwapParameters {
    /// Detector, landmarker and selector options shared by every variant.
    fn detection(config: &ToolConfig) -> Self {
        Self {
            processors: vec!["face_swapper".to_string()],
            face_detector_model: Some("yoloface".to_string()),
            face_detector_size: Some("640x640".to_string()),
            face_detector_angles: vec![0, 90, 180, 270],
            face_detector_score: Some(0.5),
            face_landmarker_model: Some("2dfan4".to_string()),
            face_landmarker_score: Some(0.5),
            face_selector_mode: Some("reference".to_string()),
            face_selector_order: Some(FaceSelectorOrder::LargeSmall),
            face_selector_gender: None,
            face_selector_age: None,
            reference_face_distance: None,
            face_mask_types: Vec::new(),
            face_mask_blur: None,
            face_mask_padding: None,
            execution_providers: Vec::new(),
            execution_thread_count: None,
            execution_queue_count: None,
            face_swapper_pixel_boost: None,
            output_image_quality: None,
            output_image_resolution: Some(OUTPUT_RESOLUTION.to_string()),
            output_video_encoder: None,
            output_video_preset: None,
            output_video_quality: None,
            output_video_resolution: None,
            output_video_fps: None,
            log_level: Some(config.log_level.clone()),
            skip_download: false,
        }
    }

    /// Adds reference selection, masking and execution options.
    fn with_reference_options(mut self, config: &ToolConfig) -> Self {
        self.face_selector_gender = Some("male".to_string());
        self.face_selector_age = Some((0, 100));
        self.reference_face_distance = Some(0.6);
        self.face_mask_types = vec!["box".to_string(), "region".to_string()];
        self.face_mask_blur = Some(0.3);
        self.face_mask_padding = Some([0, 0, 0, 0]);
        self.execution_providers = config.execution_providers.clone();
        self.execution_thread_count = Some(config.execution_thread_count);
        self.execution_queue_count = Some(config.execution_queue_count);
        self
    }

    /// Returns the option set used for `variant`.
    pub fn for_variant(variant: JobVariant, config: &ToolConfig) -> Self {
        match variant {
            JobVariant::SingleImage | JobVariant::DualSourceImage => {
                let mut params = Self::detection(config).with_reference_options(config);
                params.face_swapper_pixel_boost = Some("256x256".to_string());
                params.output_image_quality = Some(100);
                params
            }
            JobVariant::FiveTarget => {
                let mut params = Self::detection(config).with_reference_options(config);
                params.output_image_quality = Some(100);
                params.skip_download = true;
                params
            }
            JobVariant::Video => {
                let mut params = Self::detection(config).with_reference_options(config);
                params.output_video_encoder = Some("libx264".to_string());
                params.output_video_preset = Some("veryfast".to_string());
                params.output_video_quality = Some(80);
                params.output_video_resolution = Some(OUTPUT_RESOLUTION.to_string());
                params.output_video_fps = Some(30);
                params
            }
            JobVariant::DualSourceBatch => {
                let mut params = Self::detection(config);
                params.output_video_quality = Some(100);
                params.output_video_resolution = Some(OUTPUT_RESOLUTION.to_string());
                params
            }
        }
    }

    pub fn with_selector_order(mut self, order: FaceSelectorOrder) -> Self {
        self.face_selector_order = Some(order);
        self
    }

    pub fn with_selector_gender(mut self, gender: impl Into<String>) -> Self {
        self.face_selector_gender = Some(gender.into());
        self
    }

    /// Renders the options as command-line arguments.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        push_list(&mut args, "--processors", &self.processors);
        push_opt(&mut args, "--face-detector-model", &self.face_detector_model);
        push_opt(&mut args, "--face-detector-size", &self.face_detector_size);
        push_list(&mut args, "--face-detector-angles", &self.face_detector_angles);
        push_opt(&mut args, "--face-detector-score", &self.face_detector_score);
        push_opt(&mut args, "--face-landmarker-model", &self.face_landmarker_model);
        push_opt(&mut args, "--face-landmarker-score", &self.face_landmarker_score);
        push_opt(&mut args, "--face-selector-mode", &self.face_selector_mode);
        push_opt(&mut args, "--face-selector-order", &self.face_selector_order);
        push_opt(&mut args, "--face-selector-gender", &self.face_selector_gender);
        if let Some((start, end)) = self.face_selector_age {
            args.extend([
                "--face-selector-age-start".to_string(),
                start.to_string(),
                "--face-selector-age-end".to_string(),
                end.to_string(),
            ]);
        }
        push_opt(&mut args, "--reference-face-distance", &self.reference_face_distance);
        push_list(&mut args, "--face-mask-types", &self.face_mask_types);
        push_opt(&mut args, "--face-mask-blur", &self.face_mask_blur);
        if let Some(padding) = self.face_mask_padding {
            push_list(&mut args, "--face-mask-padding", &padding);
        }
        push_list(&mut args, "--execution-providers", &self.execution_providers);
        push_opt(&mut args, "--execution-thread-count", &self.execution_thread_count);
        push_opt(&mut args, "--execution-queue-count", &self.execution_queue_count);
        push_opt(&mut args, "--face-swapper-pixel-boost", &self.face_swapper_pixel_boost);
        push_opt(&mut args, "--output-image-quality", &self.output_image_quality);
        push_opt(&mut args, "--output-image-resolution", &self.output_image_resolution);
        push_opt(&mut args, "--output-video-encoder", &self.output_video_encoder);
        push_opt(&mut args, "--output-video-preset", &self.output_video_preset);
        push_opt(&mut args, "--output-video-quality", &self.output_video_quality);
        push_opt(&mut args, "--output-video-resolution", &self.output_video_resolution);
        push_opt(&mut args, "--output-video-fps", &self.output_video_fps);
        push_opt(&mut args, "--log-level", &self.log_level);
        if self.skip_download {
            args.push("--skip-download".to_string());
        }

        args
    }
}

fn push_opt<T: fmt::Display>(args: &mut Vec<String>, flag: &str, value: &Option<T>) {
    if let Some(value) = value {
        args.extend([flag.to_string(), value.to_string()]);
    }
}

fn push_list<T: fmt::Display>(args: &mut Vec<String>, flag: &str, values: &[T]) {
    if values.is_empty() {
        return;
    }
    args.push(flag.to_string());
    args.extend(values.iter().map(|v| v.to_string()));
}

/// One complete execution of the tool.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub command: ToolCommand,
    pub source_paths: Vec<PathBuf>,
    pub target_path: PathBuf,
    pub output_path: PathBuf,
    pub parameters: SwapParameters,
}

impl Invocation {
    /// Builds the tool arguments: verb, paths, then options.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![self.command.as_str().to_string(), "--source-paths".to_string()];
        args.extend(
            self.source_paths
                .iter()
                .map(|p| p.to_string_lossy().to_string()),
        );
        args.extend([
            "--target-path".to_string(),
            self.target_path.to_string_lossy().to_string(),
            "--output-path".to_string(),
            self.output_path.to_string_lossy().to_string(),
        ]);
        args.extend(self.parameters.to_args());
        args
    }
}

/// Captured result of a finished tool process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    /// Exit code, `None` when terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

impl ProcessResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}
