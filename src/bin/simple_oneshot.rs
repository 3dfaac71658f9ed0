// 该文件是 Quyu （区域检测） 项目的一部分。
// src/bin/simple_oneshot.rs - 单张图像推理
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

use anyhow::Result;
use clap::Parser;

use quyu::{
  FromUrl,
  args::CommonArgs,
  input::InputWrapper,
  model::{CocoLabel, Preset, VocLabel, WithLabel, YoloV2Builder},
  output::OutputWrapper,
  task::{OneShotTask, Task},
};
use tracing::info;

/// Quyu 单张图像推理
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  #[command(flatten)]
  pub common: CommonArgs,
}

fn run<T: WithLabel, const W: u32, const H: u32>(args: &CommonArgs) -> Result<()> {
  let input = InputWrapper::<W, H>::from_url(&args.input)?;
  let model = YoloV2Builder::from_url(&args.model)?
    .preset(args.preset)
    .confidence(args.confidence)
    .nms_threshold(args.nms_threshold)
    .build::<T, W, H>()?;
  let output = OutputWrapper::from_url(&args.output)?;

  OneShotTask.run_task(input, model, output)
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("模型文件路径: {}", args.common.model);
  info!("输入来源: {}", args.common.input);
  info!("输出路径: {}", args.common.output);
  info!("置信度阈值: {}", args.common.confidence);
  info!("NMS 阈值: {}", args.common.nms_threshold);

  match args.common.preset {
    Preset::Voc => run::<VocLabel, 416, 416>(&args.common),
    Preset::Coco => run::<CocoLabel, 608, 608>(&args.common),
  }
}
