// 该文件是 Quyu （区域检测） 项目的一部分。
// src/output/save_image_file.rs - 保存图像文件
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

use std::path::PathBuf;

use thiserror::Error;
use tracing::warn;
use url::Url;

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

pub struct SaveImageFileOutput {
  path: PathBuf,
  draw: Draw,
}

#[derive(Error, Debug)]
pub enum SaveImageFileError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("绘制错误: {0}")]
  DrawError(#[from] DrawError),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

impl FromUrlWithScheme for SaveImageFileOutput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(SaveImageFileError::SchemeMismatch(format!(
        "期望保存方式 '{}', 实际保存方式 '{}'",
        Self::SCHEME,
        uri.scheme()
      )));
    }

    Ok(SaveImageFileOutput {
      path: url_path(uri),
      draw: Draw::from_query(uri)?,
    })
  }
}

impl SaveImageFileOutput {
  fn save_image(&self, image: image::RgbImage) -> Result<(), SaveImageFileError> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    image.save(&self.path)?;

    warn!("保存图像到文件: {}", self.path.display());

    Ok(())
  }
}

impl<const W: u32, const H: u32, T: WithLabel> Render<ImageFrame<W, H>, DetectResult<T>>
  for SaveImageFileOutput
{
  type Error = SaveImageFileError;

  fn render_result(
    &self,
    frame: &ImageFrame<W, H>,
    result: &DetectResult<T>,
  ) -> Result<(), Self::Error> {
    let image = self.draw.draw_detection(frame.origin(), result);
    self.save_image(image)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::{DetectItem, VocLabel};
  use image::RgbImage;

  #[test]
  fn saves_annotated_image_creating_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("out.png");
    let url = Url::from_file_path(&path).unwrap();
    let url = Url::parse(&url.as_str().replacen("file:", "image:", 1)).unwrap();

    let output = SaveImageFileOutput::from_url(&url).unwrap();
    let frame = ImageFrame::<8, 8>::from(RgbImage::new(32, 24));
    let result = DetectResult {
      items: vec![DetectItem {
        kind: VocLabel::Cat,
        score: 0.7,
        bbox: [2.0, 2.0, 20.0, 20.0],
      }]
      .into_boxed_slice(),
    };
    output.render_result(&frame, &result).unwrap();

    let saved = image::open(&path).unwrap().into_rgb8();
    assert_eq!(saved.dimensions(), (32, 24));
    assert_ne!(*saved.get_pixel(2, 2), image::Rgb([0, 0, 0]));
  }
}
