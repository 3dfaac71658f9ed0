// 该文件是 Quyu （区域检测） 项目的一部分。
// src/input/read_image_file.rs - 图像文件输入
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

use image::{ImageReader, RgbImage};
use thiserror::Error;
use tracing::{error, info};
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, frame::ImageFrame, utils::url_path};

#[derive(Error, Debug)]
pub enum ImageFileInputError {
  #[error("URI schema mismatch")]
  SchemaMismatch,
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("Image loading error: {0}")]
  ImageLoadError(#[from] image::ImageError),
}

/// 单张图像输入，只产生一帧
pub struct ImageFileInput<const W: u32, const H: u32> {
  image: Option<RgbImage>,
}

impl<const W: u32, const H: u32> FromUrlWithScheme for ImageFileInput<W, H> {
  const SCHEME: &'static str = "image";
}

impl<const W: u32, const H: u32> FromUrl for ImageFileInput<W, H> {
  type Error = ImageFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ImageFileInputError::SchemaMismatch);
    }

    let path = url_path(url);
    let image = ImageReader::open(&path)
      .inspect_err(|e| error!("Image: {} cannot be read: {}", path.display(), e))?
      .with_guessed_format()?
      .decode()?
      .into_rgb8();
    info!(
      "读取图像 {}: {}x{}",
      path.display(),
      image.width(),
      image.height()
    );

    Ok(ImageFileInput { image: Some(image) })
  }
}

impl<const W: u32, const H: u32> From<RgbImage> for ImageFileInput<W, H> {
  fn from(image: RgbImage) -> Self {
    ImageFileInput { image: Some(image) }
  }
}

impl<const W: u32, const H: u32> Iterator for ImageFileInput<W, H> {
  type Item = ImageFrame<W, H>;

  fn next(&mut self) -> Option<Self::Item> {
    self.image.take().map(ImageFrame::from)
  }
}
