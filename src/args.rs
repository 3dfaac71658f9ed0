// 该文件是 Quyu （区域检测） 项目的一部分。
// src/args.rs - 项目参数配置
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

use clap::Args;
use url::Url;

use crate::{
  decode::{DEFAULT_CONF_THRESHOLD, DEFAULT_IOU_THRESHOLD},
  model::Preset,
};

/// 各个可执行程序共用的参数
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
  /// 模型路径
  /// - tensor:///path/to/output.bin 回放导出的输出张量
  /// - rknn:///path/to/model.rknn RKNN NPU 模型（需启用 rknpu 特性）
  ///
  /// 可附加参数: preset, grid=WxH, classes, anchors=w,h,..., activation, layout
  #[arg(long, value_name = "MODEL")]
  pub model: Url,

  /// 输入来源: image:///path/to/file.jpg 或 folder:///path/to/dir
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,

  /// 输出路径: image:///out.png, folder:///dir 或 log:stdout
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,

  /// 预置模型，决定输入尺寸、标签和默认网格
  #[arg(long, value_enum, default_value_t = Preset::Voc)]
  pub preset: Preset,

  /// 置信度阈值 (0.0 - 1.0]
  #[arg(long, default_value_t = DEFAULT_CONF_THRESHOLD, value_parser = parse_threshold, value_name = "THRESHOLD")]
  pub confidence: f32,

  /// NMS IOU 阈值 (0.0 - 1.0]
  #[arg(long, default_value_t = DEFAULT_IOU_THRESHOLD, value_parser = parse_threshold, value_name = "THRESHOLD")]
  pub nms_threshold: f32,
}

pub fn parse_threshold(value: &str) -> Result<f32, String> {
  let threshold: f32 = value
    .parse()
    .map_err(|e| format!("无法解析阈值 '{}': {}", value, e))?;
  if threshold > 0.0 && threshold <= 1.0 {
    Ok(threshold)
  } else {
    Err(format!("阈值必须位于 (0, 1] 区间, 实际为 {}", threshold))
  }
}
