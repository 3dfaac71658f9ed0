// 该文件是 Quyu （区域检测） 项目的一部分。
// src/output/draw.rs - 目标检测结果可视化
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

use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::{
  drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size},
  rect::Rect,
};
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::model::{DetectItem, DetectResult, WithLabel};

// 文本渲染常量
const LABEL_FONT_SIZE: f32 = 20.0;
const LABEL_TEXT_VERTICAL_PADDING: i32 = 2;
const LABEL_TEXT_COLOR: [u8; 3] = [255, 255, 255];
const BOX_THICKNESS: i32 = 2;

const PALETTE: [[u8; 3]; 8] = [
  [0, 0, 255],
  [255, 56, 56],
  [72, 249, 10],
  [255, 157, 151],
  [0, 194, 255],
  [255, 178, 29],
  [132, 56, 255],
  [26, 147, 52],
];

#[derive(Error, Debug)]
pub enum DrawError {
  #[error("字体文件读取失败: {0}")]
  IoError(#[from] std::io::Error),
  #[error("字体无效: {0}")]
  InvalidFont(#[from] ab_glyph::InvalidFont),
}

/// 边框绘制器；提供字体时在框上方绘制类别与置信度
pub struct Draw {
  font: Option<FontVec>,
  font_size: f32,
  thickness: i32,
}

impl Default for Draw {
  fn default() -> Self {
    Self {
      font: None,
      font_size: LABEL_FONT_SIZE,
      thickness: BOX_THICKNESS,
    }
  }
}

impl Draw {
  pub fn with_font(mut self, path: &Path) -> Result<Self, DrawError> {
    info!("加载字体: {}", path.display());
    let data = std::fs::read(path)?;
    self.font = Some(FontVec::try_from_vec(data)?);
    Ok(self)
  }

  /// 从输出 URL 的 `font` 参数中读取字体
  pub fn from_query(url: &Url) -> Result<Self, DrawError> {
    let font = url
      .query_pairs()
      .find(|(k, _)| k == "font")
      .map(|(_, v)| v.into_owned());

    match font {
      Some(path) => Draw::default().with_font(Path::new(&path)),
      None => Ok(Draw::default()),
    }
  }

  pub fn draw_detection<T: WithLabel>(&self, image: &RgbImage, result: &DetectResult<T>) -> RgbImage {
    let mut canvas = image.clone();
    for item in result.iter() {
      self.draw_bbox_with_label(&mut canvas, item);
    }
    canvas
  }

  // bbox 为原图像素坐标 [x_min, y_min, x_max, y_max]
  fn draw_bbox_with_label<T: WithLabel>(&self, image: &mut RgbImage, item: &DetectItem<T>) {
    let (w, h) = (image.width() as i32, image.height() as i32);
    if w == 0 || h == 0 {
      return;
    }

    let x_min = (item.bbox[0].floor() as i32).clamp(0, w - 1);
    let y_min = (item.bbox[1].floor() as i32).clamp(0, h - 1);
    let x_max = (item.bbox[2].ceil() as i32).clamp(0, w - 1);
    let y_max = (item.bbox[3].ceil() as i32).clamp(0, h - 1);

    if x_min >= x_max || y_min >= y_max {
      return;
    }

    let color = Rgb(PALETTE[item.kind.to_label_id() as usize % PALETTE.len()]);

    for t in 0..self.thickness {
      let width = x_max - x_min + 1 - 2 * t;
      let height = y_max - y_min + 1 - 2 * t;
      if width <= 0 || height <= 0 {
        break;
      }
      let rect = Rect::at(x_min + t, y_min + t).of_size(width as u32, height as u32);
      draw_hollow_rect_mut(image, rect, color);
    }

    let Some(font) = &self.font else {
      return;
    };

    let label = format!("{} {:.2}", item.kind.to_label_str(), item.score);
    let scale = PxScale::from(self.font_size);
    let (text_width, text_height) = text_size(scale, font, &label);
    let label_height = text_height as i32 + 2 * LABEL_TEXT_VERTICAL_PADDING;
    let label_y = (y_min - label_height).max(0);
    let label_width = (text_width as i32).min(w - x_min);

    if label_width > 0 && label_height > 0 {
      let rect = Rect::at(x_min, label_y).of_size(label_width as u32, label_height as u32);
      draw_filled_rect_mut(image, rect, color);
      draw_text_mut(
        image,
        Rgb(LABEL_TEXT_COLOR),
        x_min,
        label_y + LABEL_TEXT_VERTICAL_PADDING,
        scale,
        font,
        &label,
      );
    }
  }
}
