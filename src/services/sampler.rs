//! 无放回抽样
//!
//! 组卷中唯一引入随机性的地方

use crate::infrastructure::RandomSource;

/// 抽样器
///
/// 先做 Fisher–Yates 洗牌，再取前 `min(count, len)` 个。
/// 数量不足时静默截断，不视为错误。
pub struct Sampler<R> {
    rng: R,
}

impl<R: RandomSource> Sampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// 从 `pool` 中无放回地抽取 `count` 个元素
    ///
    /// # 参数
    /// - `pool`: 候选集合（不会被修改）
    /// - `count`: 需要的数量，0 时返回空列表
    ///
    /// # 返回
    /// 长度为 `min(count, pool.len())` 的列表，顺序即抽样顺序
    pub fn sample<T: Clone>(&mut self, pool: &[T], count: usize) -> Vec<T> {
        if count == 0 || pool.is_empty() {
            return Vec::new();
        }

        let mut shuffled = pool.to_vec();
        for i in (1..shuffled.len()).rev() {
            let j = self.index_up_to(i);
            shuffled.swap(i, j);
        }
        shuffled.truncate(count.min(pool.len()));
        shuffled
    }

    /// 取 `[0, i]` 区间内的随机下标
    fn index_up_to(&mut self, i: usize) -> usize {
        let r = self.rng.next();
        let j = (r * (i + 1) as f64).floor() as usize;
        j.min(i)
    }

    pub fn into_inner(self) -> R {
        self.rng
    }
}
