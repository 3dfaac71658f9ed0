// 该文件是 Quyu （区域检测） 项目的一部分。
// src/model/yolov2.rs - YOLOv2 区域层检测模型
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::{marker::PhantomData, str::FromStr};

use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
  FromUrl,
  decode::{
    Anchor, ClassActivation, DEFAULT_CONF_THRESHOLD, DEFAULT_IOU_THRESHOLD, DecodeConfig,
    DecodeError, RegionGeometry, TensorLayout, decode,
  },
  frame::ImageFrame,
  input::AsNhwcFrame,
  model::{
    DetectResult, Model, WithLabel,
    backend::{Backend, BackendError, BackendWrapper},
  },
};

/// YOLOv2 的总下采样倍数
const YOLOV2_STRIDE: usize = 32;

#[derive(Error, Debug)]
pub enum YoloV2Error {
  #[error("解码错误: {0}")]
  DecodeError(#[from] DecodeError),
  #[error("后端错误: {0}")]
  BackendError(#[from] BackendError),
  #[error("模型参数 {key} 无效: {value}")]
  InvalidParameter { key: String, value: String },
}

impl YoloV2Error {
  fn parameter(key: &str, value: &str) -> Self {
    YoloV2Error::InvalidParameter {
      key: key.to_string(),
      value: value.to_string(),
    }
  }
}

/// 预置模型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Preset {
  /// Tiny YOLOv2 VOC，416×416
  #[default]
  Voc,
  /// YOLOv2 COCO，608×608
  Coco,
}

impl Preset {
  pub fn geometry(&self) -> RegionGeometry {
    match self {
      Preset::Voc => RegionGeometry::tiny_yolo_voc(),
      Preset::Coco => RegionGeometry::yolo_coco(),
    }
  }
}

impl FromStr for Preset {
  type Err = YoloV2Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "voc" => Ok(Preset::Voc),
      "coco" => Ok(Preset::Coco),
      _ => Err(YoloV2Error::parameter("preset", s)),
    }
  }
}

pub struct YoloV2<B, T, const W: u32, const H: u32> {
  backend: B,
  config: DecodeConfig,
  _label: PhantomData<T>,
}

impl<B: Backend, T: WithLabel, const W: u32, const H: u32> YoloV2<B, T, W, H> {
  /// 用已打开的后端构建模型，若后端能给出输出长度则提前校验
  pub fn new(backend: B, config: DecodeConfig) -> Result<Self, YoloV2Error> {
    config.validate()?;

    let info = backend.describe();
    for (i, tensor) in info.inputs.iter().enumerate() {
      info!("模型输入 {}: {}", i, tensor);
    }
    for (i, tensor) in info.outputs.iter().enumerate() {
      info!("模型输出 {}: {}", i, tensor);
    }

    if let (Some(actual), Some(expected)) = (backend.output_len(), config.geometry.expected_len())
      && actual != expected
    {
      return Err(DecodeError::InvalidInputShape { expected, actual }.into());
    }

    if T::label_count() != config.geometry.num_classes {
      warn!(
        "标签数量 {} 与模型类别数量 {} 不一致",
        T::label_count(),
        config.geometry.num_classes
      );
    }

    Ok(YoloV2 {
      backend,
      config,
      _label: PhantomData,
    })
  }
}

impl<B: Backend, T: WithLabel, const W: u32, const H: u32> Model for YoloV2<B, T, W, H> {
  type Input = ImageFrame<W, H>;
  type Output = DetectResult<T>;
  type Error = YoloV2Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    debug!("执行模型推理");
    let raw = self.backend.run(input.as_nhwc())?;
    debug!("模型输出长度: {}", raw.len());

    let (width, height) = input.origin_size();
    let objects = decode(&raw, &self.config, width, height)?;
    debug!("检测到 {} 个物体", objects.len());

    Ok(DetectResult::from(objects))
  }
}

pub struct YoloV2Builder {
  url: Url,
  preset: Preset,
  grid: Option<(usize, usize)>,
  classes: Option<usize>,
  anchors: Option<Vec<Anchor>>,
  activation: ClassActivation,
  layout: TensorLayout,
  confidence: f32,
  nms_threshold: f32,
}

fn parse_grid(value: &str) -> Result<(usize, usize), YoloV2Error> {
  let (w, h) = value
    .split_once('x')
    .ok_or_else(|| YoloV2Error::parameter("grid", value))?;
  let w = w.parse().map_err(|_| YoloV2Error::parameter("grid", value))?;
  let h = h.parse().map_err(|_| YoloV2Error::parameter("grid", value))?;
  Ok((w, h))
}

fn parse_anchors(value: &str) -> Result<Vec<Anchor>, YoloV2Error> {
  let numbers = value
    .split(',')
    .map(|v| v.trim().parse::<f32>())
    .collect::<Result<Vec<_>, _>>()
    .map_err(|_| YoloV2Error::parameter("anchors", value))?;
  if numbers.len() % 2 != 0 {
    return Err(YoloV2Error::parameter("anchors", value));
  }
  Ok(
    numbers
      .chunks_exact(2)
      .map(|wh| Anchor::new(wh[0], wh[1]))
      .collect(),
  )
}

impl FromUrl for YoloV2Builder {
  type Error = YoloV2Error;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    let mut builder = YoloV2Builder {
      url: url.clone(),
      preset: Preset::default(),
      grid: None,
      classes: None,
      anchors: None,
      activation: ClassActivation::default(),
      layout: TensorLayout::default(),
      confidence: DEFAULT_CONF_THRESHOLD,
      nms_threshold: DEFAULT_IOU_THRESHOLD,
    };

    for (key, value) in url.query_pairs() {
      match key.as_ref() {
        "preset" => builder.preset = value.parse()?,
        "grid" => builder.grid = Some(parse_grid(&value)?),
        "classes" => {
          let classes = value
            .parse()
            .map_err(|_| YoloV2Error::parameter("classes", &value))?;
          builder.classes = Some(classes);
        }
        "anchors" => builder.anchors = Some(parse_anchors(&value)?),
        "activation" => builder.activation = value.parse()?,
        "layout" => builder.layout = value.parse()?,
        other => warn!("忽略未知的模型参数: {}={}", other, value),
      }
    }

    Ok(builder)
  }
}

impl YoloV2Builder {
  pub fn preset(mut self, preset: Preset) -> Self {
    self.preset = preset;
    self
  }

  pub fn confidence(mut self, threshold: f32) -> Self {
    self.confidence = threshold;
    self
  }

  pub fn nms_threshold(mut self, threshold: f32) -> Self {
    self.nms_threshold = threshold;
    self
  }

  /// 在预置模型的基础上叠加 URL 参数
  pub fn decode_config(&self) -> DecodeConfig {
    let mut geometry = self.preset.geometry();
    if let Some((grid_w, grid_h)) = self.grid {
      geometry.grid_w = grid_w;
      geometry.grid_h = grid_h;
    }
    if let Some(classes) = self.classes {
      geometry.num_classes = classes;
    }
    if let Some(anchors) = &self.anchors {
      geometry.anchors = anchors.clone();
    }

    DecodeConfig::new(geometry)
      .conf_threshold(self.confidence)
      .iou_threshold(self.nms_threshold)
      .activation(self.activation)
      .layout(self.layout)
  }

  pub fn build<T: WithLabel, const W: u32, const H: u32>(
    self,
  ) -> Result<YoloV2<BackendWrapper, T, W, H>, YoloV2Error> {
    let config = self.decode_config();
    // 先校验配置，再打开后端
    config.validate()?;

    let geometry = &config.geometry;
    info!(
      "网格 {}x{}, 先验框 {} 个, 类别 {} 个, 激活 {:?}, 布局 {:?}",
      geometry.grid_w,
      geometry.grid_h,
      geometry.anchors_per_cell(),
      geometry.num_classes,
      config.activation,
      config.layout
    );
    let matches_stride = |cells: usize, pixels: u32| {
      cells.checked_mul(YOLOV2_STRIDE) == Some(pixels as usize)
    };
    if !matches_stride(geometry.grid_w, W) || !matches_stride(geometry.grid_h, H) {
      warn!(
        "输入尺寸 {}x{} 与网格 {}x{} 不符合 {} 倍下采样",
        W, H, geometry.grid_w, geometry.grid_h, YOLOV2_STRIDE
      );
    }

    let backend = BackendWrapper::open(&self.url, W, H)?;
    YoloV2::new(backend, config)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::{TensorFileBackend, VocLabel};
  use image::RgbImage;

  fn builder(url: &str) -> YoloV2Builder {
    YoloV2Builder::from_url(&Url::parse(url).unwrap()).unwrap()
  }

  #[test]
  fn preset_defaults_to_voc() {
    let config = builder("tensor:///tmp/out.bin").decode_config();
    assert_eq!(config.geometry, RegionGeometry::tiny_yolo_voc());
    assert_eq!(config.conf_threshold, DEFAULT_CONF_THRESHOLD);
    assert_eq!(config.iou_threshold, DEFAULT_IOU_THRESHOLD);
  }

  #[test]
  fn query_overrides_preset() {
    let config = builder(
      "tensor:///tmp/out.bin?preset=coco&grid=4x3&classes=2&anchors=1,2,3,4&activation=sigmoid&layout=nchw",
    )
    .confidence(0.3)
    .nms_threshold(0.6)
    .decode_config();

    assert_eq!(config.geometry.grid_w, 4);
    assert_eq!(config.geometry.grid_h, 3);
    assert_eq!(config.geometry.num_classes, 2);
    assert_eq!(
      config.geometry.anchors,
      vec![Anchor::new(1.0, 2.0), Anchor::new(3.0, 4.0)]
    );
    assert_eq!(config.activation, ClassActivation::Sigmoid);
    assert_eq!(config.layout, TensorLayout::ChannelMajor);
    assert_eq!(config.conf_threshold, 0.3);
    assert_eq!(config.iou_threshold, 0.6);
  }

  #[test]
  fn malformed_query_is_rejected() {
    for url in [
      "tensor:///out.bin?grid=13",
      "tensor:///out.bin?anchors=1,2,3",
      "tensor:///out.bin?classes=many",
      "tensor:///out.bin?preset=imagenet",
    ] {
      assert!(
        matches!(
          YoloV2Builder::from_url(&Url::parse(url).unwrap()),
          Err(YoloV2Error::InvalidParameter { .. })
        ),
        "{}",
        url
      );
    }

    assert!(matches!(
      YoloV2Builder::from_url(&Url::parse("tensor:///out.bin?activation=relu").unwrap()),
      Err(YoloV2Error::DecodeError(DecodeError::InvalidConfiguration(_)))
    ));
  }

  #[test]
  fn invalid_thresholds_fail_before_opening_backend() {
    let result = builder("tensor:///definitely/not/here.bin")
      .confidence(0.0)
      .build::<VocLabel, 416, 416>();
    assert!(matches!(
      result,
      Err(YoloV2Error::DecodeError(DecodeError::InvalidConfiguration(_)))
    ));
  }

  #[test]
  fn oversized_grid_is_an_error_not_a_panic() {
    let result = builder("tensor:///definitely/not/here.bin?grid=200000000x1")
      .build::<VocLabel, 416, 416>();
    assert!(matches!(
      result,
      Err(YoloV2Error::BackendError(BackendError::ModelLoadError(_)))
    ));

    let result = builder(&format!(
      "tensor:///definitely/not/here.bin?grid={}x1",
      usize::MAX
    ))
    .build::<VocLabel, 416, 416>();
    assert!(result.is_err());
  }

  #[test]
  fn tensor_length_is_checked_at_construction() {
    let config = DecodeConfig::new(RegionGeometry::tiny_yolo_voc());
    let backend = TensorFileBackend::from(vec![0.0; 10]);
    let result = YoloV2::<_, VocLabel, 416, 416>::new(backend, config);
    assert!(matches!(
      result,
      Err(YoloV2Error::DecodeError(DecodeError::InvalidInputShape {
        actual: 10,
        ..
      }))
    ));
  }

  #[test]
  fn infer_reports_boxes_in_origin_pixels() {
    let geometry = RegionGeometry {
      grid_w: 1,
      grid_h: 1,
      anchors: vec![Anchor::new(0.5, 0.5)],
      num_classes: 20,
    };
    let mut raw = vec![0.0f32; geometry.expected_len().unwrap()];
    raw[4] = 8.0;
    raw[5 + 14] = 12.0;
    let config = DecodeConfig::new(geometry).conf_threshold(0.5);

    let model =
      YoloV2::<_, VocLabel, 32, 32>::new(TensorFileBackend::from(raw), config).unwrap();
    let frame = ImageFrame::<32, 32>::from(RgbImage::new(200, 100));
    let result = model.infer(&frame).unwrap();

    assert_eq!(result.len(), 1);
    let item = &result.items[0];
    assert_eq!(item.kind, VocLabel::Person);
    assert!((item.bbox[0] - 50.0).abs() < 1e-3);
    assert!((item.bbox[1] - 25.0).abs() < 1e-3);
    assert!((item.bbox[2] - 150.0).abs() < 1e-3);
    assert!((item.bbox[3] - 75.0).abs() < 1e-3);
  }
}
