//! 随机数来源 - 基础设施层
//!
//! 组卷中唯一的随机性来源，可注入固定种子以复现结果

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 随机数来源
pub trait RandomSource {
    /// 返回 `[0, 1)` 区间内的随机数
    fn next(&mut self) -> f64;
}

impl<T: RandomSource + ?Sized> RandomSource for &mut T {
    fn next(&mut self) -> f64 {
        (**self).next()
    }
}

/// 基于 `StdRng` 的标准随机数来源
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    /// 使用系统熵初始化
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// 使用固定种子初始化，相同种子产生相同序列
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// 有种子时使用种子，否则使用系统熵
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl RandomSource for StdRandom {
    fn next(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// 循环返回固定序列的随机数来源（用于测试断言确定的排列）
#[derive(Debug, Clone)]
pub struct FixedSequence {
    values: Vec<f64>,
    position: usize,
}

impl FixedSequence {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            position: 0,
        }
    }
}

impl RandomSource for FixedSequence {
    fn next(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.position % self.values.len()];
        self.position += 1;
        value.clamp(0.0, 1.0 - f64::EPSILON)
    }
}
