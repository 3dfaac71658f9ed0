// 该文件是 Quyu （区域检测） 项目的一部分。
// src/output/directory_record.rs - 目录记录输出
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

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU16, Ordering};

use chrono::{Datelike, Utc};
use image::RgbImage;
use thiserror::Error;
use tracing::debug;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::ImageFrame,
  model::{DetectResult, WithLabel},
  output::{
    Render,
    draw::{Draw, DrawError},
  },
  utils::url_path,
};

#[derive(Error, Debug)]
pub enum DirectoryRecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("绘制错误: {0}")]
  DrawError(#[from] DrawError),
}

/// 每个目标一行: `类别, 置信度, x_min, y_min, x_max, y_max`
pub struct Record {
  pub label_with_name: bool,
}

impl Record {
  pub fn record<T: WithLabel>(
    &self,
    result: &DetectResult<T>,
    path: &Path,
  ) -> Result<(), std::io::Error> {
    let records: Vec<String> = result
      .iter()
      .map(|item| {
        let name = if self.label_with_name {
          item.kind.to_label_str()
        } else {
          item.kind.to_label_id().to_string()
        };
        format!(
          "{}, {:.4}, {:.1}, {:.1}, {:.1}, {:.1}",
          name, item.score, item.bbox[0], item.bbox[1], item.bbox[2], item.bbox[3]
        )
      })
      .collect();
    std::fs::write(path.with_extension("txt"), records.join("\n"))
  }
}

pub enum DrawWrapper {
  Draw(Box<Draw>),
  Record(Record),
}

impl DrawWrapper {
  pub fn save_result<T: WithLabel>(
    &self,
    path: &Path,
    image: &RgbImage,
    result: &DetectResult<T>,
  ) -> Result<(), DirectoryRecordOutputError> {
    match self {
      DrawWrapper::Draw(draw) => {
        draw.draw_detection(image, result).save(path)?;
      }
      DrawWrapper::Record(record) => {
        image.save(path)?;
        record.record(result, path)?;
      }
    };

    Ok(())
  }
}

pub struct DirectoryRecordOutput {
  directory: PathBuf,
  draw: DrawWrapper,
  frame_counter: AtomicU16,
  always: bool,
}

impl FromUrlWithScheme for DirectoryRecordOutput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn from_url(uri: &url::Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(DirectoryRecordOutputError::SchemeMismatch);
    }

    let record = uri
      .query_pairs()
      .find(|(k, _)| k == "record")
      .map(|(_, v)| v == "id");
    let draw = match record {
      Some(by_id) => DrawWrapper::Record(Record {
        label_with_name: !by_id,
      }),
      None => DrawWrapper::Draw(Box::new(Draw::from_query(uri)?)),
    };

    let always = uri.query_pairs().any(|(k, _)| k == "always");

    Ok(DirectoryRecordOutput {
      directory: url_path(uri),
      draw,
      frame_counter: AtomicU16::new(0),
      always,
    })
  }
}

impl DirectoryRecordOutput {
  fn frame_id(&self) -> u16 {
    self.frame_counter.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
  }

  /// `目录/年/月/日/时-分-秒-序号.png`
  fn frame_path(&self) -> Result<PathBuf, std::io::Error> {
    let now = Utc::now();
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    std::fs::create_dir_all(&directory)?;

    Ok(directory.join(format!(
      "{}-{:04X}.png",
      now.format("%H-%M-%S"),
      self.frame_id()
    )))
  }
}

impl<const W: u32, const H: u32, T: WithLabel> Render<ImageFrame<W, H>, DetectResult<T>>
  for DirectoryRecordOutput
{
  type Error = DirectoryRecordOutputError;

  fn render_result(
    &self,
    frame: &ImageFrame<W, H>,
    result: &DetectResult<T>,
  ) -> Result<(), Self::Error> {
    if !self.always && result.is_empty() {
      debug!("无检测结果，跳过记录");
      return Ok(());
    }

    let path = self.frame_path()?;
    self.draw.save_result(&path, frame.origin(), result)?;
    debug!("记录到: {}", path.display());
    Ok(())
  }
}
