use super::CombineFn;
use anyhow::Result;

/// Average of values per key as `f64`.
///
/// - Accumulator: `(sum, count)`
/// - Output: `f64`
#[derive(Clone, Copy, Debug, Default)]
pub struct AverageF64;

impl<V> CombineFn<V, (f64, u64), f64> for AverageF64
where
    V: Into<f64>,
{
    fn create(&self) -> (f64, u64) {
        (0.0, 0)
    }

    fn add_input(&self, acc: &mut (f64, u64), v: V) {
        acc.0 += v.into();
        acc.1 += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(&self, acc: (f64, u64)) -> Result<f64> {
        Ok(if acc.1 == 0 { 0.0 } else { acc.0 / acc.1 as f64 })
    }
}
