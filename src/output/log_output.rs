// 该文件是 Quyu （区域检测） 项目的一部分。
// src/output/log_output.rs - 检测结果文本输出
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

use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{Value, json};
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::ImageFrame,
  model::{DetectItem, DetectResult, WithLabel},
  output::Render,
};

#[derive(Error, Debug)]
pub enum LogOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

/// 将检测结果打印到标准输出，`?json` 时每帧输出一行 JSON
pub struct LogOutput {
  json: bool,
  frame_counter: AtomicUsize,
}

impl FromUrlWithScheme for LogOutput {
  const SCHEME: &'static str = "log";
}

impl FromUrl for LogOutput {
  type Error = LogOutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(LogOutputError::SchemeMismatch);
    }

    Ok(LogOutput {
      json: url.query_pairs().any(|(k, _)| k == "json"),
      frame_counter: AtomicUsize::new(0),
    })
  }
}

pub fn format_item<T: WithLabel>(index: usize, item: &DetectItem<T>) -> String {
  format!(
    "[{},{}] element, prob = {:.4}    ({:.0},{:.0})-({:.0},{:.0})",
    index,
    item.kind.to_label_str(),
    item.score,
    item.bbox[0],
    item.bbox[1],
    item.bbox[2],
    item.bbox[3]
  )
}

pub fn json_record<T: WithLabel>(
  frame_index: usize,
  size: (u32, u32),
  result: &DetectResult<T>,
) -> Value {
  let detections: Vec<Value> = result
    .iter()
    .map(|item| {
      json!({
        "class_id": item.kind.to_label_id(),
        "label": item.kind.to_label_str(),
        "confidence": item.score,
        "bbox": item.bbox,
      })
    })
    .collect();

  json!({
    "frame": frame_index,
    "width": size.0,
    "height": size.1,
    "detections": detections,
  })
}

impl<const W: u32, const H: u32, T: WithLabel> Render<ImageFrame<W, H>, DetectResult<T>>
  for LogOutput
{
  type Error = LogOutputError;

  fn render_result(
    &self,
    frame: &ImageFrame<W, H>,
    result: &DetectResult<T>,
  ) -> Result<(), Self::Error> {
    let frame_index = self.frame_counter.fetch_add(1, Ordering::Relaxed);

    if self.json {
      println!("{}", json_record(frame_index, frame.origin_size(), result));
    } else {
      info!("第 {} 帧: 检测到 {} 个对象", frame_index, result.len());
      for (i, item) in result.iter().enumerate() {
        println!("{}", format_item(i, item));
      }
    }

    Ok(())
  }
}
