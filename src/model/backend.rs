// 该文件是 Quyu （区域检测） 项目的一部分。
// src/model/backend.rs - 推理后端
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

use std::{
  fmt,
  path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, info};
use url::Url;

#[cfg(feature = "rknpu")]
use super::rknn::RknnBackend;
use crate::utils::url_path;

#[derive(Error, Debug)]
pub enum BackendError {
  #[error("模型加载错误: {0}")]
  ModelLoadError(#[from] std::io::Error),
  #[error("张量文件无效: {0}")]
  InvalidTensorFile(String),
  #[error("模型无效: {0}")]
  ModelInvalid(String),
  #[cfg(feature = "rknpu")]
  #[error("RKNN 错误: {0}")]
  RknnError(String),
  #[error("不支持的后端: {0}")]
  SchemeMismatch(String),
}

/// 单个张量的元信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorInfo {
  pub name: String,
  pub dtype: &'static str,
  pub layout: &'static str,
  pub dims: Vec<usize>,
}

impl TensorInfo {
  pub fn element_count(&self) -> usize {
    self.dims.iter().product()
  }
}

impl fmt::Display for TensorInfo {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}, 精度 {}, 布局 {}, 维度 {:?}",
      self.name, self.dtype, self.layout, self.dims
    )
  }
}

/// 后端的输入/输出张量描述
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendInfo {
  pub inputs: Vec<TensorInfo>,
  pub outputs: Vec<TensorInfo>,
}

/// 推理上下文，由调用方显式创建并持有
pub trait Backend {
  fn describe(&self) -> BackendInfo;

  /// 第一个输出张量的元素个数，后端未描述输出时返回 None
  fn output_len(&self) -> Option<usize> {
    self
      .describe()
      .outputs
      .first()
      .map(TensorInfo::element_count)
  }

  /// 输入一帧 NHWC u8 图像，返回第一个输出张量
  fn run(&self, input: &[u8]) -> Result<Vec<f32>, BackendError>;
}

/// 回放预先导出的输出张量（小端 f32），便于在没有 NPU 的机器上调试后处理
#[derive(Debug, Clone)]
pub struct TensorFileBackend {
  path: PathBuf,
  tensor: Vec<f32>,
}

impl TensorFileBackend {
  pub const SCHEME: &'static str = "tensor";

  pub fn open(path: &Path) -> Result<Self, BackendError> {
    info!("加载张量文件: {}", path.display());
    let bytes = std::fs::read(path)?;
    if bytes.len() % 4 != 0 {
      return Err(BackendError::InvalidTensorFile(format!(
        "{} 的长度 {} 不是 4 的倍数",
        path.display(),
        bytes.len()
      )));
    }

    let tensor: Vec<f32> = bytes
      .chunks_exact(4)
      .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
      .collect();
    debug!("张量长度: {}", tensor.len());

    Ok(TensorFileBackend {
      path: path.to_path_buf(),
      tensor,
    })
  }
}

impl From<Vec<f32>> for TensorFileBackend {
  fn from(tensor: Vec<f32>) -> Self {
    TensorFileBackend {
      path: PathBuf::new(),
      tensor,
    }
  }
}

impl Backend for TensorFileBackend {
  /// 回放不读取输入，只描述输出
  fn describe(&self) -> BackendInfo {
    let name = self
      .path
      .file_stem()
      .map(|s| s.to_string_lossy().into_owned())
      .unwrap_or_else(|| "tensor".to_string());
    BackendInfo {
      inputs: Vec::new(),
      outputs: vec![TensorInfo {
        name,
        dtype: "FP32",
        layout: "UNDEFINED",
        dims: vec![self.tensor.len()],
      }],
    }
  }

  fn run(&self, input: &[u8]) -> Result<Vec<f32>, BackendError> {
    debug!("回放张量, 输入长度 {}", input.len());
    Ok(self.tensor.clone())
  }
}

pub enum BackendWrapper {
  TensorFile(TensorFileBackend),
  #[cfg(feature = "rknpu")]
  Rknn(RknnBackend),
}

impl BackendWrapper {
  /// 按 URL 方案打开后端，`width`/`height` 为网络输入尺寸
  #[cfg_attr(not(feature = "rknpu"), allow(unused_variables))]
  pub fn open(url: &Url, width: u32, height: u32) -> Result<Self, BackendError> {
    let path = url_path(url);
    match url.scheme() {
      TensorFileBackend::SCHEME => Ok(BackendWrapper::TensorFile(TensorFileBackend::open(&path)?)),
      #[cfg(feature = "rknpu")]
      RknnBackend::SCHEME => Ok(BackendWrapper::Rknn(RknnBackend::open(
        &path, width, height,
      )?)),
      other => Err(BackendError::SchemeMismatch(other.to_string())),
    }
  }
}

impl Backend for BackendWrapper {
  fn describe(&self) -> BackendInfo {
    match self {
      BackendWrapper::TensorFile(backend) => backend.describe(),
      #[cfg(feature = "rknpu")]
      BackendWrapper::Rknn(backend) => backend.describe(),
    }
  }

  fn run(&self, input: &[u8]) -> Result<Vec<f32>, BackendError> {
    match self {
      BackendWrapper::TensorFile(backend) => backend.run(input),
      #[cfg(feature = "rknpu")]
      BackendWrapper::Rknn(backend) => backend.run(input),
    }
  }
}
