//! Counting and ordering combiners: Count, Sum, Min, Max

use super::CombineFn;
use crate::collection::Elem;
use anyhow::{Result, anyhow};
use std::marker::PhantomData;
use std::mem::take;
use std::ops::Add;

/// Number of values per key.
#[derive(Clone, Copy, Debug, Default)]
pub struct Count;

impl<V> CombineFn<V, usize, usize> for Count {
    fn create(&self) -> usize {
        0
    }

    fn add_input(&self, acc: &mut usize, _v: V) {
        *acc += 1;
    }

    fn finish(&self, acc: usize) -> Result<usize> {
        Ok(acc)
    }
}

/// Sum of values per key.
///
/// - Accumulator: `T`
/// - Output: `T`
#[derive(Clone, Copy, Debug, Default)]
pub struct Sum<T>(pub PhantomData<T>);

impl<T> Sum<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> CombineFn<T, T, T> for Sum<T>
where
    T: Elem + Add<Output = T> + Default,
{
    fn create(&self) -> T {
        T::default()
    }

    fn add_input(&self, acc: &mut T, v: T) {
        *acc = take(acc) + v;
    }

    fn finish(&self, acc: T) -> Result<T> {
        Ok(acc)
    }
}

/// Smallest value per key; the first of equal minima wins.
#[derive(Clone, Copy, Debug, Default)]
pub struct Min<T>(pub PhantomData<T>);

impl<T> Min<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> CombineFn<T, Option<T>, T> for Min<T>
where
    T: Elem + Ord,
{
    fn create(&self) -> Option<T> {
        None
    }

    fn add_input(&self, acc: &mut Option<T>, v: T) {
        match acc {
            Some(cur) => {
                if v < *cur {
                    *cur = v;
                }
            }
            None => *acc = Some(v),
        }
    }

    fn finish(&self, acc: Option<T>) -> Result<T> {
        acc.ok_or_else(|| anyhow!("Min finished without any input"))
    }
}

/// Largest value per key; the first of equal maxima wins.
#[derive(Clone, Copy, Debug, Default)]
pub struct Max<T>(pub PhantomData<T>);

impl<T> Max<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> CombineFn<T, Option<T>, T> for Max<T>
where
    T: Elem + Ord,
{
    fn create(&self) -> Option<T> {
        None
    }

    fn add_input(&self, acc: &mut Option<T>, v: T) {
        match acc {
            Some(cur) => {
                if v > *cur {
                    *cur = v;
                }
            }
            None => *acc = Some(v),
        }
    }

    fn finish(&self, acc: Option<T>) -> Result<T> {
        acc.ok_or_else(|| anyhow!("Max finished without any input"))
    }
}
