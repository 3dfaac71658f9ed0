// 该文件是 Quyu （区域检测） 项目的一部分。
// src/model.rs - 模型
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

use crate::decode::DetectedObject;

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectItem<T> {
  pub kind: T,
  pub score: f32,
  pub bbox: [f32; 4], // [x_min, y_min, x_max, y_max]，原图像素坐标
}

#[derive(Debug, Clone)]
pub struct DetectResult<T> {
  pub items: Box<[DetectItem<T>]>,
}

impl<T> DetectResult<T> {
  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn iter(&self) -> std::slice::Iter<'_, DetectItem<T>> {
    self.items.iter()
  }
}

impl<T: WithLabel> From<Vec<DetectedObject>> for DetectResult<T> {
  fn from(objects: Vec<DetectedObject>) -> Self {
    let items = objects
      .into_iter()
      .map(|obj| DetectItem {
        kind: T::from_label_id(obj.class_id as u32),
        score: obj.confidence,
        bbox: [obj.xmin, obj.ymin, obj.xmax, obj.ymax],
      })
      .collect();
    DetectResult { items }
  }
}

pub trait WithLabel: Sized + std::fmt::Debug {
  fn to_label_str(&self) -> String;
  fn to_label_id(&self) -> u32;
  fn from_label_id(id: u32) -> Self;
  fn label_count() -> usize;
}

mod backend;
mod label;
#[cfg(feature = "rknpu")]
mod rknn;
mod yolov2;

pub use self::backend::{
  Backend, BackendError, BackendInfo, BackendWrapper, TensorFileBackend, TensorInfo,
};
pub use self::label::{CocoLabel, VocLabel};
#[cfg(feature = "rknpu")]
pub use self::rknn::RknnBackend;
pub use self::yolov2::{Preset, YoloV2, YoloV2Builder, YoloV2Error};
