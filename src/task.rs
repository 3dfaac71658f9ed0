// 该文件是 Quyu （区域检测） 项目的一部分。
// src/task.rs - 推理任务
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
  sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
  },
  time::{Duration, Instant},
};

use tracing::{info, warn};

use crate::{model::Model, output::Render};

/// 基准测试中不计入平均值的预热次数
const WARMUP_RUNS: usize = 2;

pub trait Task<I, M, O>: Sized {
  type Error;
  fn run_task(self, input: I, model: M, output: O) -> Result<(), Self::Error>;
}

pub struct OneShotTask;

impl<
  F,
  D,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  M: Model<Input = F, Output = D, Error = ME>,
  O: Render<F, D, Error = RE>,
> Task<I, M, O> for OneShotTask
{
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, model: M, output: O) -> Result<(), Self::Error> {
    info!("开始任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入帧"))?;
    info!("输入帧获取成功，开始推理...");
    let now = Instant::now();
    let result = model.infer(&frame)?;
    info!("推理完成，耗时: {:.2?}", now.elapsed());
    output.render_result(&frame, &result)?;
    info!("渲染完成，耗时: {:.2?}", now.elapsed());

    Ok(())
  }
}

/// 对同一帧重复推理，统计平均耗时
pub struct RepeatShotTask {
  times: usize,
}

impl RepeatShotTask {
  pub fn new(times: usize) -> Self {
    RepeatShotTask { times }
  }
}

impl Default for RepeatShotTask {
  fn default() -> Self {
    RepeatShotTask { times: 1000 }
  }
}

/// 去掉预热次数后的平均耗时
pub fn average_after_warmup(times: &[Duration]) -> Option<Duration> {
  let measured = times.get(WARMUP_RUNS..).filter(|t| !t.is_empty())?;
  Some(measured.iter().sum::<Duration>() / measured.len() as u32)
}

impl<
  F,
  D,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  M: Model<Input = F, Output = D, Error = ME>,
  O: Render<F, D, Error = RE>,
> Task<I, M, O> for RepeatShotTask
{
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, model: M, output: O) -> Result<(), Self::Error> {
    info!("开始任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入帧"))?;
    info!("输入帧获取成功，开始推理...");
    let mut times = Vec::with_capacity(self.times);
    for i in 0..self.times {
      let now = Instant::now();
      let result = model.infer(&frame)?;
      let elapsed = now.elapsed();
      info!("({})推理完成，耗时: {:.2?}", i, elapsed);
      output.render_result(&frame, &result)?;
      info!("({})渲染完成，耗时: {:.2?}", i, now.elapsed());
      times.push(elapsed);
    }

    match average_after_warmup(&times) {
      Some(average) => warn!("平均推理时间: {:.2?}", average),
      None => warn!("运行次数不超过 {} 次，不统计平均推理时间", WARMUP_RUNS),
    }

    Ok(())
  }
}

#[derive(Default, Debug)]
pub struct ContinuousTask {
  frame_number: Option<usize>,
}

impl ContinuousTask {
  pub fn with_frame_number(mut self, frame_number: Option<usize>) -> Self {
    self.frame_number = frame_number;
    self
  }

  fn run_until<F, D, I, M, O>(
    &self,
    input: I,
    model: M,
    output: O,
    stop: &AtomicBool,
  ) -> anyhow::Result<usize>
  where
    I: Iterator<Item = F>,
    M: Model<Input = F, Output = D>,
    M::Error: std::error::Error + Sync + Send + 'static,
    O: Render<F, D>,
    O::Error: std::error::Error + Sync + Send + 'static,
  {
    let mut frame_index = 0;
    let mut now = Instant::now();
    for frame in input {
      frame_index += 1;
      info!("处理第 {} 帧图像", frame_index);
      let result = model.infer(&frame)?;
      let elapsed_a = now.elapsed();
      output.render_result(&frame, &result)?;
      let elapsed_b = now.elapsed();
      now = Instant::now();
      info!("推理完成，耗时: {:.2?} / {:.2?}", elapsed_a, elapsed_b);
      if self.frame_number.is_some_and(|n| frame_index >= n) {
        info!("达到指定帧数 {}, 退出任务循环", frame_index);
        break;
      }
      if stop.load(Ordering::Relaxed) {
        warn!("中断信号接收，退出任务循环");
        break;
      }
    }
    Ok(frame_index)
  }
}

impl<
  F,
  D,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  M: Model<Input = F, Output = D, Error = ME>,
  O: Render<F, D, Error = RE>,
> Task<I, M, O> for ContinuousTask
{
  type Error = anyhow::Error;

  fn run_task(self, input: I, model: M, output: O) -> Result<(), Self::Error> {
    info!("开始任务...");
    let stop = Arc::new(AtomicBool::new(false));
    let handler_stop = Arc::clone(&stop);
    ctrlc::set_handler(move || {
      info!("收到中断信号，准备退出...");
      handler_stop.store(true, Ordering::Relaxed);
    })?;

    let frames = self.run_until(input, model, output, &stop)?;
    info!("任务完成，共处理 {} 帧，退出", frames);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::cell::RefCell;
  use std::convert::Infallible;

  struct Doubler;

  impl Model for Doubler {
    type Input = u32;
    type Output = u32;
    type Error = Infallible;

    fn infer(&self, input: &u32) -> Result<u32, Infallible> {
      Ok(input * 2)
    }
  }

  #[derive(Default)]
  struct Collect(RefCell<Vec<(u32, u32)>>);

  impl Render<u32, u32> for &Collect {
    type Error = Infallible;

    fn render_result(&self, frame: &u32, result: &u32) -> Result<(), Infallible> {
      self.0.borrow_mut().push((*frame, *result));
      Ok(())
    }
  }

  #[test]
  fn one_shot_renders_first_frame_only() {
    let collect = Collect::default();
    OneShotTask.run_task(vec![1, 2, 3].into_iter(), Doubler, &collect).unwrap();
    assert_eq!(*collect.0.borrow(), vec![(1, 2)]);
  }

  #[test]
  fn one_shot_without_input_fails() {
    let collect = Collect::default();
    assert!(OneShotTask.run_task(Vec::new().into_iter(), Doubler, &collect).is_err());
  }

  #[test]
  fn repeat_shot_reuses_the_first_frame() {
    let collect = Collect::default();
    RepeatShotTask::new(4)
      .run_task(vec![5, 6].into_iter(), Doubler, &collect)
      .unwrap();
    assert_eq!(*collect.0.borrow(), vec![(5, 10); 4]);
  }

  #[test]
  fn continuous_respects_frame_limit() {
    let collect = Collect::default();
    let stop = AtomicBool::new(false);
    let frames = ContinuousTask::default()
      .with_frame_number(Some(2))
      .run_until(1..10, Doubler, &collect, &stop)
      .unwrap();
    assert_eq!(frames, 2);
    assert_eq!(*collect.0.borrow(), vec![(1, 2), (2, 4)]);
  }

  #[test]
  fn continuous_stops_on_signal() {
    let collect = Collect::default();
    let stop = AtomicBool::new(true);
    let frames = ContinuousTask::default()
      .run_until(1..10, Doubler, &collect, &stop)
      .unwrap();
    assert_eq!(frames, 1);
  }

  #[test]
  fn average_skips_warmup() {
    let times = [
      Duration::from_millis(100),
      Duration::from_millis(50),
      Duration::from_millis(10),
      Duration::from_millis(20),
    ];
    assert_eq!(average_after_warmup(&times), Some(Duration::from_millis(15)));
    assert_eq!(average_after_warmup(&times[..2]), None);
  }
}
