// 该文件是 Quyu （区域检测） 项目的一部分。
// src/model/label.rs - 类别标签
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

use super::WithLabel;

/// 生成标签枚举，超出范围的编号映射为 `Unknown(id)`
macro_rules! label_set {
  ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
    $(#[$meta])*
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum $name {
      $($variant,)+
      Unknown(u32),
    }

    impl $name {
      const VARIANTS: &'static [$name] = &[$($name::$variant),+];
    }

    impl WithLabel for $name {
      fn to_label_str(&self) -> String {
        match self {
          $($name::$variant => $label.to_string(),)+
          $name::Unknown(id) => format!("unknown({})", id),
        }
      }

      fn to_label_id(&self) -> u32 {
        match self {
          $name::Unknown(id) => *id,
          known => Self::VARIANTS
            .iter()
            .position(|v| v == known)
            .map(|p| p as u32)
            .unwrap_or(u32::MAX),
        }
      }

      fn from_label_id(id: u32) -> Self {
        Self::VARIANTS
          .get(id as usize)
          .copied()
          .unwrap_or($name::Unknown(id))
      }

      fn label_count() -> usize {
        Self::VARIANTS.len()
      }
    }
  };
}

label_set! {
  /// PASCAL VOC 20 类
  VocLabel {
    Aeroplane => "aeroplane",
    Bicycle => "bicycle",
    Bird => "bird",
    Boat => "boat",
    Bottle => "bottle",
    Bus => "bus",
    Car => "car",
    Cat => "cat",
    Chair => "chair",
    Cow => "cow",
    DiningTable => "diningtable",
    Dog => "dog",
    Horse => "horse",
    Motorbike => "motorbike",
    Person => "person",
    PottedPlant => "pottedplant",
    Sheep => "sheep",
    Sofa => "sofa",
    Train => "train",
    TvMonitor => "tvmonitor",
  }
}

label_set! {
  /// COCO 数据集 80 类
  CocoLabel {
    Person => "person",
    Bicycle => "bicycle",
    Car => "car",
    Motorcycle => "motorcycle",
    Airplane => "airplane",
    Bus => "bus",
    Train => "train",
    Truck => "truck",
    Boat => "boat",
    TrafficLight => "traffic light",
    FireHydrant => "fire hydrant",
    StopSign => "stop sign",
    ParkingMeter => "parking meter",
    Bench => "bench",
    Bird => "bird",
    Cat => "cat",
    Dog => "dog",
    Horse => "horse",
    Sheep => "sheep",
    Cow => "cow",
    Elephant => "elephant",
    Bear => "bear",
    Zebra => "zebra",
    Giraffe => "giraffe",
    Backpack => "backpack",
    Umbrella => "umbrella",
    Handbag => "handbag",
    Tie => "tie",
    Suitcase => "suitcase",
    Frisbee => "frisbee",
    Skis => "skis",
    Snowboard => "snowboard",
    SportsBall => "sports ball",
    Kite => "kite",
    BaseballBat => "baseball bat",
    BaseballGlove => "baseball glove",
    Skateboard => "skateboard",
    Surfboard => "surfboard",
    TennisRacket => "tennis racket",
    Bottle => "bottle",
    WineGlass => "wine glass",
    Cup => "cup",
    Fork => "fork",
    Knife => "knife",
    Spoon => "spoon",
    Bowl => "bowl",
    Banana => "banana",
    Apple => "apple",
    Sandwich => "sandwich",
    Orange => "orange",
    Broccoli => "broccoli",
    Carrot => "carrot",
    HotDog => "hot dog",
    Pizza => "pizza",
    Donut => "donut",
    Cake => "cake",
    Chair => "chair",
    Couch => "couch",
    PottedPlant => "potted plant",
    Bed => "bed",
    DiningTable => "dining table",
    Toilet => "toilet",
    Tv => "tv",
    Laptop => "laptop",
    Mouse => "mouse",
    Remote => "remote",
    Keyboard => "keyboard",
    CellPhone => "cell phone",
    Microwave => "microwave",
    Oven => "oven",
    Toaster => "toaster",
    Sink => "sink",
    Refrigerator => "refrigerator",
    Book => "book",
    Clock => "clock",
    Vase => "vase",
    Scissors => "scissors",
    TeddyBear => "teddy bear",
    HairDrier => "hair drier",
    Toothbrush => "toothbrush",
  }
}
