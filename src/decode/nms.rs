// 该文件是 Quyu （区域检测） 项目的一部分。
// src/decode/nms.rs - 非极大值抑制
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

use super::DetectedObject;

/// 计算两个边界框的 IoU，并集为空时返回 0
pub fn iou(a: &DetectedObject, b: &DetectedObject) -> f32 {
  let x1 = a.xmin.max(b.xmin);
  let y1 = a.ymin.max(b.ymin);
  let x2 = a.xmax.min(b.xmax);
  let y2 = a.ymax.min(b.ymax);

  let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
  let union = a.area() + b.area() - intersection;

  if union > 0.0 {
    intersection / union
  } else {
    0.0
  }
}

/// 按类别分组的贪心非极大值抑制
///
/// 结果按类别升序、置信度降序排列。同分时保持输入顺序（稳定排序）。
/// 与已保留框 IoU 大于等于 `iou_threshold` 的候选框会被移除。
pub fn non_max_suppression(
  mut boxes: Vec<DetectedObject>,
  iou_threshold: f32,
) -> Vec<DetectedObject> {
  boxes.sort_by(|a, b| {
    a.class_id
      .cmp(&b.class_id)
      .then_with(|| b.confidence.total_cmp(&a.confidence))
  });

  let mut kept: Vec<DetectedObject> = Vec::with_capacity(boxes.len());
  let mut group_start = 0;
  let mut group_class = None;

  for candidate in boxes {
    if group_class != Some(candidate.class_id) {
      group_class = Some(candidate.class_id);
      group_start = kept.len();
    }

    let suppressed = kept[group_start..]
      .iter()
      .any(|best| iou(best, &candidate) >= iou_threshold);
    if !suppressed {
      kept.push(candidate);
    }
  }

  kept
}
