// 该文件是 Quyu （区域检测） 项目的一部分。
// src/input/read_directory.rs - 目录图像输入
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

use std::{collections::VecDeque, path::PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, frame::ImageFrame, utils::url_path};

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

#[derive(Error, Debug)]
pub enum DirectoryInputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
}

/// 按文件名顺序逐张读取目录中的图像
pub struct DirectoryInput<const W: u32, const H: u32> {
  pending: VecDeque<PathBuf>,
}

impl<const W: u32, const H: u32> FromUrlWithScheme for DirectoryInput<W, H> {
  const SCHEME: &'static str = "folder";
}

impl<const W: u32, const H: u32> FromUrl for DirectoryInput<W, H> {
  type Error = DirectoryInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(DirectoryInputError::SchemeMismatch);
    }

    let directory = url_path(url);
    let mut pending = Vec::new();
    for entry in std::fs::read_dir(&directory)? {
      let path = entry?.path();
      let is_image = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false);
      if path.is_file() && is_image {
        pending.push(path);
      }
    }
    pending.sort();

    info!("目录 {} 中共有 {} 张图像", directory.display(), pending.len());

    Ok(DirectoryInput {
      pending: pending.into(),
    })
  }
}

impl<const W: u32, const H: u32> Iterator for DirectoryInput<W, H> {
  type Item = ImageFrame<W, H>;

  fn next(&mut self) -> Option<Self::Item> {
    while let Some(path) = self.pending.pop_front() {
      match image::open(&path) {
        Ok(image) => {
          debug!("读取图像: {}", path.display());
          return Some(ImageFrame::from(image.into_rgb8()));
        }
        Err(e) => warn!("跳过无法读取的图像 {}: {}", path.display(), e),
      }
    }
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{Rgb, RgbImage};

  fn folder_url(path: &std::path::Path) -> Url {
    let url = Url::from_directory_path(path).unwrap();
    Url::parse(&url.as_str().replacen("file:", "folder:", 1)).unwrap()
  }

  #[test]
  fn yields_images_in_name_order_and_skips_broken_files() {
    let dir = tempfile::tempdir().unwrap();
    RgbImage::from_pixel(3, 2, Rgb([0, 0, 0]))
      .save(dir.path().join("b.png"))
      .unwrap();
    RgbImage::from_pixel(5, 4, Rgb([0, 0, 0]))
      .save(dir.path().join("a.png"))
      .unwrap();
    std::fs::write(dir.path().join("c.jpg"), b"not an image").unwrap();
    std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

    let input = DirectoryInput::<4, 4>::from_url(&folder_url(dir.path())).unwrap();
    let sizes: Vec<_> = input.map(|frame| frame.origin_size()).collect();

    assert_eq!(sizes, vec![(5, 4), (3, 2)]);
  }

  #[test]
  fn missing_directory_is_an_error() {
    let url = Url::parse("folder:///definitely/not/here").unwrap();
    assert!(DirectoryInput::<4, 4>::from_url(&url).is_err());
  }
}
