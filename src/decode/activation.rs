// 该文件是 Quyu （区域检测） 项目的一部分。
// src/decode/activation.rs - 激活函数
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

pub fn sigmoid(x: f32) -> f32 {
  1.0 / (1.0 + (-x).exp())
}

/// f64 精度的 sigmoid，用于置信度
///
/// f32 的 sigmoid 在 x 约大于 17 时已等于 1.0，f64 要到 x 约大于 37 才饱和
pub fn sigmoid_f64(x: f32) -> f64 {
  1.0 / (1.0 + (-f64::from(x)).exp())
}

/// 将 `logits` 的 softmax 结果写入 `out`，两者长度必须一致
///
/// 先减去最大值再取指数，避免大 logit 溢出
pub fn softmax(logits: &[f32], out: &mut [f64]) {
  debug_assert_eq!(logits.len(), out.len());

  let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
  let mut sum = 0.0f64;
  for (o, &l) in out.iter_mut().zip(logits) {
    *o = f64::from(l - max).exp();
    sum += *o;
  }

  if sum > 0.0 {
    for o in out.iter_mut() {
      *o /= sum;
    }
  }
}
