// 该文件是 Quyu （区域检测） 项目的一部分。
// src/model/rknn.rs - RKNN NPU 推理后端
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

use rknpu::{Context, InitFlags, TensorFormat, TensorType};
use tracing::{debug, error, info};

use super::backend::{Backend, BackendError, BackendInfo, TensorInfo};

const RKNN_NUM_INPUTS: u32 = 1;
const RKNN_NUM_OUTPUTS: u32 = 1;

impl From<rknpu::Error> for BackendError {
  fn from(err: rknpu::Error) -> Self {
    BackendError::RknnError(err.to_string())
  }
}

pub struct RknnBackend {
  context: Context,
  info: BackendInfo,
}

impl RknnBackend {
  pub const SCHEME: &'static str = "rknn";

  /// 打开模型，并以 `width`×`height` 的空白帧预热一次以确定输出长度
  pub fn open(path: &Path, width: u32, height: u32) -> Result<Self, BackendError> {
    info!("加载模型文件: {}", path.display());
    let model_data = std::fs::read(path)?;
    debug!(
      "模型文件大小: {:.2} MB",
      model_data.len() as f64 / (1024.0 * 1024.0)
    );

    info!("创建 RKNN 推理上下文");
    let context = Context::new(&model_data, InitFlags::default())?;

    match context.sdk_version() {
      Ok(version) => {
        if let Ok(api_ver) = version.api_version() {
          info!("模型 API 版本: {}", api_ver);
        }
        if let Ok(drv_ver) = version.driver_version() {
          info!("模型驱动版本: {}", drv_ver);
        }
      }
      Err(e) => {
        error!("查询 SDK 版本失败: {}", e);
        return Err(BackendError::ModelInvalid(format!("无法查询 SDK 版本: {}", e)));
      }
    }

    let num_inputs = context.num_inputs()?;
    let num_outputs = context.num_outputs()?;
    if num_inputs != RKNN_NUM_INPUTS || num_outputs != RKNN_NUM_OUTPUTS {
      let msg = format!(
        "预期模型输入/输出数量为 {}/{}, 实际为 {}/{}",
        RKNN_NUM_INPUTS, RKNN_NUM_OUTPUTS, num_inputs, num_outputs
      );
      error!("{}", msg);
      return Err(BackendError::ModelInvalid(msg));
    }
    debug!("模型输入数量: {}", num_inputs);
    debug!("模型输出数量: {}", num_outputs);

    let input = TensorInfo {
      name: "input0".to_string(),
      dtype: "U8",
      layout: "NHWC",
      dims: vec![1, height as usize, width as usize, 3],
    };
    debug!("预热推理, 输入 {}", input);
    let blank = vec![0u8; input.element_count()];
    let output_len = Self::infer_raw(&context, &blank)?.len();
    let output = TensorInfo {
      name: "output0".to_string(),
      dtype: "FP32",
      layout: "UNDEFINED",
      dims: vec![output_len],
    };

    info!("模型加载完成");
    Ok(RknnBackend {
      context,
      info: BackendInfo {
        inputs: vec![input],
        outputs: vec![output],
      },
    })
  }

  fn infer_raw(context: &Context, input: &[u8]) -> Result<Vec<f32>, BackendError> {
    debug!("设置模型输入");
    context.set_input(0, input, TensorFormat::NHWC, TensorType::UInt8)?;

    debug!("执行模型推理");
    context.run()?;

    debug!("获取模型输出");
    let output = context.get_outputs()?;
    let data = output.get_f32(0)?;
    Ok(data.to_vec())
  }
}

impl Backend for RknnBackend {
  fn describe(&self) -> BackendInfo {
    self.info.clone()
  }

  fn run(&self, input: &[u8]) -> Result<Vec<f32>, BackendError> {
    Self::infer_raw(&self.context, input)
  }
}
