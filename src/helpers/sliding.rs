use crate::collection::Elem;
use crate::error::CanalError;
use crate::node::{failed, Flow};
use crate::Canal;
use anyhow::Result;
use std::collections::VecDeque;
use std::iter::Fuse;

impl<T: Elem> Canal<T> {
    /// Fixed-size windows advancing by `step`.
    ///
    /// Windows overlap when `step < size` and leave gaps when `step > size`. The last window
    /// may be shorter than `size`; it is emitted as long as it picked up at least one new
    /// element. A zero `size` or `step` fails on first pull with
    /// [`CanalError::InvalidSliding`].
    ///
    /// ```
    /// use ironcanal::Canal;
    ///
    /// let w = Canal::from_vec(vec![1, 2, 3, 4, 5, 6]).sliding(3, 2).collect().unwrap();
    /// assert_eq!(w, vec![vec![1, 2, 3], vec![3, 4, 5], vec![5, 6]]);
    ///
    /// // the trailing `5` was already emitted, so no third window
    /// let w = Canal::from_vec(vec![1, 2, 3, 4, 5]).sliding(3, 2).collect().unwrap();
    /// assert_eq!(w, vec![vec![1, 2, 3], vec![3, 4, 5]]);
    /// ```
    pub fn sliding(&self, size: usize, step: usize) -> Canal<Vec<T>> {
        self.follow(self.extent(), move |up| -> Flow<Vec<T>> {
            if size == 0 || step == 0 {
                return failed(CanalError::InvalidSliding { size, step }.into());
            }
            Box::new(Sliding {
                flow: up.fuse(),
                window: VecDeque::with_capacity(size),
                size,
                step,
                started: false,
            })
        })
    }
}

struct Sliding<T> {
    flow: Fuse<Flow<T>>,
    window: VecDeque<T>,
    size: usize,
    step: usize,
    started: bool,
}

impl<T: Clone> Iterator for Sliding<T> {
    type Item = Result<Vec<T>>;

    fn next(&mut self) -> Option<Result<Vec<T>>> {
        if self.started {
            for _ in self.size..self.step {
                match self.flow.next()? {
                    Ok(_) => {}
                    Err(e) => return Some(Err(e)),
                }
            }
        }
        self.started = true;

        let mut added = false;
        while self.window.len() < self.size {
            match self.flow.next() {
                Some(Ok(t)) => {
                    self.window.push_back(t);
                    added = true;
                }
                Some(Err(e)) => return Some(Err(e)),
                None => break,
            }
        }
        if !added {
            return None;
        }

        let out: Vec<T> = self.window.iter().cloned().collect();
        if self.step >= self.size {
            self.window.clear();
        } else {
            let n = self.step.min(self.window.len());
            self.window.drain(..n);
        }
        Some(Ok(out))
    }
}
