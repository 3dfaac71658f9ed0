// 该文件是 Quyu （区域检测） 项目的一部分。
// src/frame.rs - NHWC 帧定义
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

use image::{RgbImage, imageops::FilterType};
use thiserror::Error;

use crate::input::AsNhwcFrame;

pub const RGB_CHANNELS: usize = 3;

#[derive(Error, Debug)]
pub enum FrameError {
  #[error("数据长度不匹配: 期望长度 {expected}, 实际长度 {actual}")]
  LengthMismatch { expected: usize, actual: usize },
}

/// 网络输入张量，尺寸固定为 W×H
#[derive(Debug, Clone)]
pub struct RgbNhwcFrame<const W: u32, const H: u32> {
  data: Box<[u8]>,
}

impl<const W: u32, const H: u32> RgbNhwcFrame<W, H> {
  const LEN: usize = RGB_CHANNELS * W as usize * H as usize;

  pub fn height(&self) -> usize {
    H as usize
  }

  pub fn width(&self) -> usize {
    W as usize
  }

  pub fn channels(&self) -> usize {
    RGB_CHANNELS
  }
}

impl<const W: u32, const H: u32> TryFrom<Vec<u8>> for RgbNhwcFrame<W, H> {
  type Error = FrameError;

  fn try_from(data: Vec<u8>) -> Result<Self, Self::Error> {
    if data.len() != Self::LEN {
      return Err(FrameError::LengthMismatch {
        expected: Self::LEN,
        actual: data.len(),
      });
    }

    Ok(Self {
      data: data.into_boxed_slice(),
    })
  }
}

impl<const W: u32, const H: u32> From<&RgbImage> for RgbNhwcFrame<W, H> {
  fn from(image: &RgbImage) -> Self {
    let data = if image.dimensions() == (W, H) {
      image.as_raw().clone()
    } else {
      image::imageops::resize(image, W, H, FilterType::Triangle).into_raw()
    };

    Self {
      data: data.into_boxed_slice(),
    }
  }
}

impl<const W: u32, const H: u32> Default for RgbNhwcFrame<W, H> {
  fn default() -> Self {
    let data = vec![0u8; Self::LEN].into_boxed_slice();
    Self { data }
  }
}

impl<const W: u32, const H: u32> AsMut<[u8]> for RgbNhwcFrame<W, H> {
  fn as_mut(&mut self) -> &mut [u8] {
    &mut self.data
  }
}

impl<const W: u32, const H: u32> AsNhwcFrame<W, H> for RgbNhwcFrame<W, H> {
  fn as_nhwc(&self) -> &[u8] {
    &self.data
  }
}

/// 一帧输入：缩放后的网络张量和原始图像
///
/// 检测结果使用原始图像的像素坐标。
#[derive(Debug, Clone)]
pub struct ImageFrame<const W: u32, const H: u32> {
  tensor: RgbNhwcFrame<W, H>,
  origin: RgbImage,
}

impl<const W: u32, const H: u32> From<RgbImage> for ImageFrame<W, H> {
  fn from(origin: RgbImage) -> Self {
    let tensor = RgbNhwcFrame::from(&origin);
    Self { tensor, origin }
  }
}

impl<const W: u32, const H: u32> ImageFrame<W, H> {
  pub fn origin(&self) -> &RgbImage {
    &self.origin
  }

  pub fn origin_size(&self) -> (u32, u32) {
    self.origin.dimensions()
  }
}

impl<const W: u32, const H: u32> AsNhwcFrame<W, H> for ImageFrame<W, H> {
  fn as_nhwc(&self) -> &[u8] {
    self.tensor.as_nhwc()
  }
}
