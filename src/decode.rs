// 该文件是 Quyu （区域检测） 项目的一部分。
// src/decode.rs - YOLOv2 区域层输出解码
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

use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, trace};

mod activation;
mod nms;

pub use self::activation::{sigmoid, sigmoid_f64, softmax};
pub use self::nms::{iou, non_max_suppression};

/// 每个候选框在类别概率之前的条目数: tx, ty, tw, th, objectness
pub const REGION_BOX_ENTRIES: usize = 5;
const OBJECTNESS_ENTRY: usize = 4;

pub const DEFAULT_CONF_THRESHOLD: f32 = 0.5;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.45;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
  #[error("输出张量长度不匹配: 期望 {expected}, 实际 {actual}")]
  InvalidInputShape { expected: usize, actual: usize },
  #[error("解码配置无效: {0}")]
  InvalidConfiguration(String),
}

impl DecodeError {
  fn config(msg: impl Into<String>) -> Self {
    DecodeError::InvalidConfiguration(msg.into())
  }
}

/// 先验框尺寸，单位为网格单元
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
  pub width: f32,
  pub height: f32,
}

impl Anchor {
  pub const fn new(width: f32, height: f32) -> Self {
    Anchor { width, height }
  }
}

pub const TINY_YOLO_VOC_ANCHORS: [Anchor; 5] = [
  Anchor::new(1.08, 1.19),
  Anchor::new(3.42, 4.41),
  Anchor::new(6.63, 11.38),
  Anchor::new(9.42, 5.11),
  Anchor::new(16.62, 10.52),
];

pub const YOLO_COCO_ANCHORS: [Anchor; 5] = [
  Anchor::new(0.57273, 0.677385),
  Anchor::new(1.87446, 2.06253),
  Anchor::new(3.33843, 5.47434),
  Anchor::new(7.88282, 3.52778),
  Anchor::new(9.77052, 9.16828),
];

/// 类别概率的激活方式，必须与模型训练时一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassActivation {
  #[default]
  Softmax,
  Sigmoid,
}

impl FromStr for ClassActivation {
  type Err = DecodeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "softmax" => Ok(ClassActivation::Softmax),
      "sigmoid" => Ok(ClassActivation::Sigmoid),
      _ => Err(DecodeError::config(format!("未知的类别激活方式: {}", s))),
    }
  }
}

/// 输出张量的内存布局
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TensorLayout {
  /// 每个网格单元、每个先验框的 5 + C 个值连续存放
  #[default]
  CellMajor,
  /// 区域层 NCHW 输出: 通道 = 先验框 × (5 + C)，每个通道是一张 H×W 平面
  ChannelMajor,
}

impl FromStr for TensorLayout {
  type Err = DecodeError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "cell" | "nhwc" => Ok(TensorLayout::CellMajor),
      "channel" | "nchw" => Ok(TensorLayout::ChannelMajor),
      _ => Err(DecodeError::config(format!("未知的张量布局: {}", s))),
    }
  }
}

/// 网络输出的网格与先验框信息，属于模型元数据
#[derive(Debug, Clone, PartialEq)]
pub struct RegionGeometry {
  pub grid_w: usize,
  pub grid_h: usize,
  pub anchors: Vec<Anchor>,
  pub num_classes: usize,
}

impl RegionGeometry {
  /// Tiny YOLOv2 VOC: 416×416 输入，13×13 网格，20 类
  pub fn tiny_yolo_voc() -> Self {
    RegionGeometry {
      grid_w: 13,
      grid_h: 13,
      anchors: TINY_YOLO_VOC_ANCHORS.to_vec(),
      num_classes: 20,
    }
  }

  /// YOLOv2 COCO: 608×608 输入，19×19 网格，80 类
  pub fn yolo_coco() -> Self {
    RegionGeometry {
      grid_w: 19,
      grid_h: 19,
      anchors: YOLO_COCO_ANCHORS.to_vec(),
      num_classes: 80,
    }
  }

  pub fn anchors_per_cell(&self) -> usize {
    self.anchors.len()
  }

  pub fn entry_len(&self) -> usize {
    REGION_BOX_ENTRIES + self.num_classes
  }

  /// 期望的输出张量长度，溢出时返回 None
  pub fn expected_len(&self) -> Option<usize> {
    self
      .grid_w
      .checked_mul(self.grid_h)?
      .checked_mul(self.anchors_per_cell())?
      .checked_mul(self.entry_len())
  }

  pub fn validate(&self) -> Result<(), DecodeError> {
    if self.grid_w == 0 || self.grid_h == 0 {
      return Err(DecodeError::config(format!(
        "网格尺寸必须为正: {}x{}",
        self.grid_w, self.grid_h
      )));
    }
    if self.anchors.is_empty() {
      return Err(DecodeError::config("先验框列表为空"));
    }
    if self.num_classes == 0 {
      return Err(DecodeError::config("类别数量必须为正"));
    }
    if let Some(anchor) = self
      .anchors
      .iter()
      .find(|a| !(a.width > 0.0 && a.height > 0.0) || !a.width.is_finite() || !a.height.is_finite())
    {
      return Err(DecodeError::config(format!(
        "先验框尺寸必须为正: {}x{}",
        anchor.width, anchor.height
      )));
    }
    if self.expected_len().is_none() {
      return Err(DecodeError::config("输出张量长度溢出"));
    }
    Ok(())
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodeConfig {
  pub geometry: RegionGeometry,
  pub conf_threshold: f32,
  pub iou_threshold: f32,
  pub activation: ClassActivation,
  pub layout: TensorLayout,
}

impl DecodeConfig {
  pub fn new(geometry: RegionGeometry) -> Self {
    DecodeConfig {
      geometry,
      conf_threshold: DEFAULT_CONF_THRESHOLD,
      iou_threshold: DEFAULT_IOU_THRESHOLD,
      activation: ClassActivation::default(),
      layout: TensorLayout::default(),
    }
  }

  pub fn conf_threshold(mut self, threshold: f32) -> Self {
    self.conf_threshold = threshold;
    self
  }

  pub fn iou_threshold(mut self, threshold: f32) -> Self {
    self.iou_threshold = threshold;
    self
  }

  pub fn activation(mut self, activation: ClassActivation) -> Self {
    self.activation = activation;
    self
  }

  pub fn layout(mut self, layout: TensorLayout) -> Self {
    self.layout = layout;
    self
  }

  pub fn validate(&self) -> Result<(), DecodeError> {
    self.geometry.validate()?;
    check_threshold("置信度阈值", self.conf_threshold)?;
    check_threshold("NMS 阈值", self.iou_threshold)?;
    Ok(())
  }
}

fn check_threshold(name: &str, value: f32) -> Result<(), DecodeError> {
  // NaN 同样不满足该条件
  if value > 0.0 && value <= 1.0 {
    Ok(())
  } else {
    Err(DecodeError::config(format!(
      "{} 必须位于 (0, 1] 区间, 实际为 {}",
      name, value
    )))
  }
}

#[derive(Debug, Clone, Copy)]
struct Strides {
  row: usize,
  col: usize,
  anchor: usize,
  entry: usize,
}

/// 经过长度校验的原始输出视图
#[derive(Debug, Clone, Copy)]
pub struct RawActivations<'a> {
  data: &'a [f32],
  strides: Strides,
}

impl<'a> RawActivations<'a> {
  pub fn new(
    data: &'a [f32],
    geometry: &RegionGeometry,
    layout: TensorLayout,
  ) -> Result<Self, DecodeError> {
    let expected = geometry
      .expected_len()
      .ok_or_else(|| DecodeError::config("输出张量长度溢出"))?;
    if data.len() != expected {
      return Err(DecodeError::InvalidInputShape {
        expected,
        actual: data.len(),
      });
    }

    let entries = geometry.entry_len();
    let anchors = geometry.anchors_per_cell();
    let strides = match layout {
      TensorLayout::CellMajor => Strides {
        entry: 1,
        anchor: entries,
        col: anchors * entries,
        row: geometry.grid_w * anchors * entries,
      },
      TensorLayout::ChannelMajor => {
        let plane = geometry.grid_w * geometry.grid_h;
        Strides {
          col: 1,
          row: geometry.grid_w,
          entry: plane,
          anchor: entries * plane,
        }
      }
    };

    Ok(RawActivations { data, strides })
  }

  fn value(&self, row: usize, col: usize, anchor: usize, entry: usize) -> f32 {
    let s = &self.strides;
    self.data[row * s.row + col * s.col + anchor * s.anchor + entry * s.entry]
  }
}

/// 解码得到的目标，坐标为原图像素坐标
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectedObject {
  pub class_id: usize,
  pub confidence: f32,
  pub xmin: f32,
  pub ymin: f32,
  pub xmax: f32,
  pub ymax: f32,
}

impl DetectedObject {
  pub fn width(&self) -> f32 {
    (self.xmax - self.xmin).max(0.0)
  }

  pub fn height(&self) -> f32 {
    (self.ymax - self.ymin).max(0.0)
  }

  pub fn area(&self) -> f32 {
    self.width() * self.height()
  }
}

/// 将区域层输出解码为检测结果
///
/// 先校验配置，再校验张量长度，之后逐网格、逐先验框解码，
/// 过滤低于置信度阈值的类别，最后按类别做非极大值抑制。
/// 结果按类别升序、置信度降序排列。
///
/// 置信度以 f64 计算后再与阈值比较。单类别时 softmax 恒为 1，
/// 置信度即 objectness，只有 objectness logit 约大于 37 时才会达到 1.0。
pub fn decode(
  raw: &[f32],
  config: &DecodeConfig,
  image_w: u32,
  image_h: u32,
) -> Result<Vec<DetectedObject>, DecodeError> {
  config.validate()?;
  if image_w == 0 || image_h == 0 {
    return Err(DecodeError::config(format!(
      "图像尺寸必须为正: {}x{}",
      image_w, image_h
    )));
  }

  let geometry = &config.geometry;
  let view = RawActivations::new(raw, geometry, config.layout)?;

  let grid_w = geometry.grid_w as f32;
  let grid_h = geometry.grid_h as f32;
  let image_w = image_w as f32;
  let image_h = image_h as f32;
  let conf_threshold = f64::from(config.conf_threshold);

  let mut logits = vec![0.0f32; geometry.num_classes];
  let mut probs = vec![0.0f64; geometry.num_classes];
  let mut candidates = Vec::new();

  for row in 0..geometry.grid_h {
    for col in 0..geometry.grid_w {
      for (a, anchor) in geometry.anchors.iter().enumerate() {
        let objectness = sigmoid_f64(view.value(row, col, a, OBJECTNESS_ENTRY));
        // 类别概率不超过 1，objectness 不够时该框不可能通过阈值
        if !(objectness >= conf_threshold) {
          continue;
        }

        for (k, logit) in logits.iter_mut().enumerate() {
          *logit = view.value(row, col, a, REGION_BOX_ENTRIES + k);
        }
        match config.activation {
          ClassActivation::Softmax => softmax(&logits, &mut probs),
          ClassActivation::Sigmoid => {
            for (p, &l) in probs.iter_mut().zip(&logits) {
              *p = sigmoid_f64(l);
            }
          }
        }

        let x = (col as f32 + sigmoid(view.value(row, col, a, 0))) / grid_w;
        let y = (row as f32 + sigmoid(view.value(row, col, a, 1))) / grid_h;
        let w = anchor.width * view.value(row, col, a, 2).exp() / grid_w;
        let h = anchor.height * view.value(row, col, a, 3).exp() / grid_h;

        let xmin = ((x - w / 2.0) * image_w).clamp(0.0, image_w);
        let ymin = ((y - h / 2.0) * image_h).clamp(0.0, image_h);
        let xmax = ((x + w / 2.0) * image_w).clamp(0.0, image_w);
        let ymax = ((y + h / 2.0) * image_h).clamp(0.0, image_h);

        if [xmin, ymin, xmax, ymax].iter().any(|v| v.is_nan()) {
          trace!("网格 ({}, {}) 先验框 {} 坐标无效，跳过", row, col, a);
          continue;
        }

        for (class_id, &prob) in probs.iter().enumerate() {
          let confidence = objectness * prob;
          if !(confidence >= conf_threshold) {
            continue;
          }
          candidates.push(DetectedObject {
            class_id,
            confidence: confidence as f32,
            xmin,
            ymin,
            xmax,
            ymax,
          });
        }
      }
    }
  }

  let num_candidates = candidates.len();
  let detections = non_max_suppression(candidates, config.iou_threshold);
  debug!(
    "解码完成: 候选框 {} 个, NMS 后 {} 个",
    num_candidates,
    detections.len()
  );

  Ok(detections)
}

#[cfg(test)]
mod tests {
  use super::*;

  const HOT: f32 = 10.0;
  const COLD: f32 = -10.0;

  fn small_geometry(num_classes: usize) -> RegionGeometry {
    RegionGeometry {
      grid_w: 2,
      grid_h: 2,
      anchors: vec![Anchor::new(1.0, 1.0)],
      num_classes,
    }
  }

  /// 2×2 网格、单先验框、单类别，仅 (0, 1) 单元为高置信度
  fn hot_cell_buffer() -> Vec<f32> {
    let mut raw = Vec::new();
    for row in 0..2 {
      for col in 0..2 {
        let hot = row == 0 && col == 1;
        let score = if hot { HOT } else { COLD };
        raw.extend_from_slice(&[0.0, 0.0, 0.0, 0.0, score, score]);
      }
    }
    raw
  }

  /// 简单的线性同余发生器，避免测试依赖随机数库
  fn pseudo_random(len: usize, seed: u64) -> Vec<f32> {
    let mut state = seed;
    (0..len)
      .map(|_| {
        state = state
          .wrapping_mul(6364136223846793005)
          .wrapping_add(1442695040888963407);
        ((state >> 33) as f32 / (1u64 << 31) as f32) * 8.0 - 4.0
      })
      .collect()
  }

  fn to_channel_major(raw: &[f32], geometry: &RegionGeometry) -> Vec<f32> {
    let entries = geometry.entry_len();
    let anchors = geometry.anchors_per_cell();
    let (gw, gh) = (geometry.grid_w, geometry.grid_h);
    let mut out = vec![0.0; raw.len()];
    for row in 0..gh {
      for col in 0..gw {
        for a in 0..anchors {
          for k in 0..entries {
            let src = ((row * gw + col) * anchors + a) * entries + k;
            let dst = ((a * entries + k) * gh + row) * gw + col;
            out[dst] = raw[src];
          }
        }
      }
    }
    out
  }

  #[test]
  fn hot_cell_yields_single_detection() {
    let config = DecodeConfig::new(small_geometry(1))
      .conf_threshold(0.3)
      .iou_threshold(0.5);

    let detections = decode(&hot_cell_buffer(), &config, 100, 100).unwrap();
    assert_eq!(detections.len(), 1);

    let det = detections[0];
    assert_eq!(det.class_id, 0);
    assert!(det.confidence > 0.99);
    // 中心 (0.75, 0.25)，尺寸 0.5×0.5
    assert!((det.xmin - 50.0).abs() < 1e-3);
    assert!((det.ymin - 0.0).abs() < 1e-3);
    assert!((det.xmax - 100.0).abs() < 1e-3);
    assert!((det.ymax - 50.0).abs() < 1e-3);
  }

  #[test]
  fn all_zero_buffer_is_empty_above_prior() {
    let geometry = RegionGeometry::tiny_yolo_voc();
    let raw = vec![0.0; geometry.expected_len().unwrap()];
    // objectness 0.5 × 类别概率 1/20
    let config = DecodeConfig::new(geometry).conf_threshold(0.5 / 20.0 + 1e-4);

    let detections = decode(&raw, &config, 416, 416).unwrap();
    assert!(detections.is_empty());
  }

  #[test]
  fn all_zero_buffer_passes_at_prior() {
    let geometry = small_geometry(2);
    let raw = vec![0.0; geometry.expected_len().unwrap()];
    let config = DecodeConfig::new(geometry).conf_threshold(0.25);

    let detections = decode(&raw, &config, 64, 64).unwrap();
    assert!(!detections.is_empty());
    assert!(detections.iter().all(|d| (d.confidence - 0.25).abs() < 1e-6));
  }

  #[test]
  fn conf_threshold_of_one_is_empty() {
    let geometry = RegionGeometry::tiny_yolo_voc();
    let raw = pseudo_random(geometry.expected_len().unwrap(), 7);
    let config = DecodeConfig::new(geometry).conf_threshold(1.0);

    assert!(decode(&raw, &config, 416, 416).unwrap().is_empty());
  }

  #[test]
  fn confident_single_class_stays_below_one() {
    let geometry = RegionGeometry {
      grid_w: 1,
      grid_h: 1,
      anchors: vec![Anchor::new(1.0, 1.0)],
      num_classes: 1,
    };
    let raw = [0.0, 0.0, 0.0, 0.0, 20.0, 3.0];

    let strict = DecodeConfig::new(geometry.clone()).conf_threshold(1.0);
    assert!(decode(&raw, &strict, 100, 100).unwrap().is_empty());

    let relaxed = DecodeConfig::new(geometry.clone()).conf_threshold(0.99);
    let found = decode(&raw, &relaxed, 100, 100).unwrap();
    assert_eq!(found.len(), 1);
    assert!(found[0].confidence >= 0.99);

    // f64 同样会饱和
    let saturated = [0.0, 0.0, 0.0, 0.0, 40.0, 3.0];
    assert_eq!(decode(&saturated, &strict, 100, 100).unwrap().len(), 1);
  }

  #[test]
  fn off_by_one_buffer_is_rejected() {
    let config = DecodeConfig::new(small_geometry(1));
    let mut raw = hot_cell_buffer();
    raw.pop();

    let err = decode(&raw, &config, 100, 100).unwrap_err();
    assert_eq!(
      err,
      DecodeError::InvalidInputShape {
        expected: 24,
        actual: 23
      }
    );

    raw.extend_from_slice(&[0.0, 0.0]);
    assert!(matches!(
      decode(&raw, &config, 100, 100),
      Err(DecodeError::InvalidInputShape { expected: 24, actual: 25 })
    ));
  }

  #[test]
  fn empty_anchor_list_is_rejected() {
    let mut geometry = small_geometry(1);
    geometry.anchors.clear();
    let config = DecodeConfig::new(geometry);

    assert!(matches!(
      decode(&[], &config, 100, 100),
      Err(DecodeError::InvalidConfiguration(_))
    ));
  }

  #[test]
  fn configuration_is_checked_before_shape() {
    let config = DecodeConfig::new(small_geometry(1)).conf_threshold(0.0);
    // 长度同样错误，但应先报告配置错误
    assert!(matches!(
      decode(&[1.0], &config, 100, 100),
      Err(DecodeError::InvalidConfiguration(_))
    ));
  }

  #[test]
  fn invalid_configurations_are_rejected() {
    let raw = hot_cell_buffer();
    let base = DecodeConfig::new(small_geometry(1));

    let cases = [
      base.clone().conf_threshold(-0.1),
      base.clone().conf_threshold(f32::NAN),
      base.clone().conf_threshold(1.5),
      base.clone().iou_threshold(0.0),
      DecodeConfig::new(RegionGeometry {
        grid_w: 0,
        ..small_geometry(1)
      }),
      DecodeConfig::new(RegionGeometry {
        num_classes: 0,
        ..small_geometry(1)
      }),
      DecodeConfig::new(RegionGeometry {
        anchors: vec![Anchor::new(0.0, 1.0)],
        ..small_geometry(1)
      }),
    ];

    for config in cases {
      assert!(
        matches!(
          decode(&raw, &config, 100, 100),
          Err(DecodeError::InvalidConfiguration(_))
        ),
        "{:?}",
        config
      );
    }

    assert!(matches!(
      decode(&raw, &base, 0, 100),
      Err(DecodeError::InvalidConfiguration(_))
    ));
  }

  #[test]
  fn decode_is_deterministic() {
    let geometry = RegionGeometry::tiny_yolo_voc();
    let raw = pseudo_random(geometry.expected_len().unwrap(), 42);
    let config = DecodeConfig::new(geometry).conf_threshold(0.2);

    let first = decode(&raw, &config, 640, 480).unwrap();
    let second = decode(&raw, &config, 640, 480).unwrap();
    assert_eq!(first, second);
  }

  #[test]
  fn detections_respect_thresholds() {
    let geometry = RegionGeometry::tiny_yolo_voc();
    for seed in 0..8 {
      let raw = pseudo_random(geometry.expected_len().unwrap(), seed);
      let config = DecodeConfig::new(geometry.clone())
        .conf_threshold(0.15)
        .iou_threshold(0.4);

      let detections = decode(&raw, &config, 500, 375).unwrap();
      for (i, a) in detections.iter().enumerate() {
        assert!(a.confidence >= 0.15);
        assert!(a.xmin >= 0.0 && a.xmax <= 500.0);
        assert!(a.ymin >= 0.0 && a.ymax <= 375.0);
        for b in &detections[i + 1..] {
          if a.class_id == b.class_id {
            assert!(iou(a, b) < 0.4);
          }
        }
      }

      for pair in detections.windows(2) {
        assert!(
          pair[0].class_id < pair[1].class_id
            || (pair[0].class_id == pair[1].class_id && pair[0].confidence >= pair[1].confidence)
        );
      }
    }
  }

  #[test]
  fn channel_major_matches_cell_major() {
    let geometry = RegionGeometry {
      grid_w: 3,
      grid_h: 2,
      anchors: TINY_YOLO_VOC_ANCHORS[..2].to_vec(),
      num_classes: 3,
    };
    let cell = pseudo_random(geometry.expected_len().unwrap(), 3);
    let channel = to_channel_major(&cell, &geometry);

    let config = DecodeConfig::new(geometry).conf_threshold(0.1);
    let from_cell = decode(&cell, &config, 320, 240).unwrap();
    let from_channel = decode(
      &channel,
      &config.clone().layout(TensorLayout::ChannelMajor),
      320,
      240,
    )
    .unwrap();

    assert!(!from_cell.is_empty());
    assert_eq!(from_cell, from_channel);
  }

  #[test]
  fn sigmoid_activation_scores_classes_independently() {
    let geometry = small_geometry(2);
    let mut raw = vec![COLD; geometry.expected_len().unwrap()];
    // 单元 (1, 0)：objectness 与两个类别 logit 都很高
    let base = 2 * geometry.entry_len();
    raw[base..base + 4].copy_from_slice(&[0.0, 0.0, 0.0, 0.0]);
    raw[base + 4] = HOT;
    raw[base + 5] = HOT;
    raw[base + 6] = HOT;

    let softmax_config = DecodeConfig::new(geometry.clone()).conf_threshold(0.6);
    assert!(decode(&raw, &softmax_config, 10, 10).unwrap().is_empty());

    let sigmoid_config = softmax_config.activation(ClassActivation::Sigmoid);
    let detections = decode(&raw, &sigmoid_config, 10, 10).unwrap();
    assert_eq!(detections.len(), 2);
    assert_eq!(detections[0].class_id, 0);
    assert_eq!(detections[1].class_id, 1);
  }

  #[test]
  fn overlapping_anchors_are_suppressed() {
    let geometry = RegionGeometry {
      grid_w: 1,
      grid_h: 1,
      anchors: vec![Anchor::new(1.0, 1.0), Anchor::new(1.1, 1.1)],
      num_classes: 1,
    };
    let raw = vec![
      0.0, 0.0, -1.0, -1.0, HOT, 1.0, //
      0.0, 0.0, -1.0, -1.0, 3.0, 1.0,
    ];
    let config = DecodeConfig::new(geometry).conf_threshold(0.5).iou_threshold(0.5);

    let detections = decode(&raw, &config, 100, 100).unwrap();
    assert_eq!(detections.len(), 1);
    assert!(detections[0].confidence > 0.99);
  }

  #[test]
  fn parses_activation_and_layout() {
    assert_eq!("sigmoid".parse(), Ok(ClassActivation::Sigmoid));
    assert_eq!("softmax".parse(), Ok(ClassActivation::Softmax));
    assert_eq!("nchw".parse(), Ok(TensorLayout::ChannelMajor));
    assert_eq!("cell".parse(), Ok(TensorLayout::CellMajor));
    assert!("relu".parse::<ClassActivation>().is_err());
  }

  #[test]
  fn presets_are_valid() {
    let voc = RegionGeometry::tiny_yolo_voc();
    assert!(voc.validate().is_ok());
    assert_eq!(voc.expected_len(), Some(13 * 13 * 5 * 25));

    let coco = RegionGeometry::yolo_coco();
    assert!(coco.validate().is_ok());
    assert_eq!(coco.expected_len(), Some(19 * 19 * 5 * 85));
  }
}
