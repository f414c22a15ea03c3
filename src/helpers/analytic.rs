use crate::node::replay;
use crate::order::Order;
use crate::record::{Item, Record, compare_keys, eval_all};
use crate::window::{WindowSpec, evaluate};
use crate::Canal;
use anyhow::Result;

impl<R: Record> Canal<R> {
    /// Attach analytic window columns to every row. Blocking.
    ///
    /// Every spec is validated up front, so a malformed frame fails here rather than on the
    /// first pull. Specs run in order and each writes its result under its alias before the
    /// next one runs, so a later spec can read an earlier alias. Rows come out in their
    /// original order.
    ///
    /// ```
    /// use ironcanal::{Canal, Item, WindowFn, row};
    /// use serde_json::json;
    ///
    /// let rows = Canal::from_vec(vec![
    ///     row([("g", json!(1)), ("v", json!(10))]),
    ///     row([("g", json!(2)), ("v", json!(5))]),
    ///     row([("g", json!(1)), ("v", json!(7))]),
    /// ]);
    /// let out = rows
    ///     .window(vec![WindowFn::row_number()
    ///         .over()
    ///         .partition_by(vec![Item::col("g")])
    ///         .order_by(vec![Item::col("v")])
    ///         .alias("rn")])
    ///     .unwrap()
    ///     .map(|r| r["rn"].clone())
    ///     .collect()
    ///     .unwrap();
    /// assert_eq!(out, vec![json!(2), json!(1), json!(1)]);
    /// ```
    pub fn window(&self, specs: Vec<WindowSpec<R>>) -> Result<Canal<R>> {
        for spec in &specs {
            spec.validate()?;
        }
        let runner = self.runner;
        Ok(self.blocking("window", move |up| {
            let mut rows = up.collect::<Result<Vec<R>>>()?;
            for spec in &specs {
                let column = evaluate(spec, &rows, runner)?;
                for (row, value) in rows.iter_mut().zip(column) {
                    row.set(spec.name(), value);
                }
            }
            Ok(replay(rows))
        }))
    }

    /// Sort by `items` (direction and null placement included), then group runs of rows
    /// whose item values are equal.
    pub fn stratify_by_items(&self, items: Vec<Item<R>>) -> Canal<Canal<R>> {
        self.stratify_by(vec![Order::with(move |a: &R, b: &R| {
            compare_keys(&items, &eval_all(&items, a), &eval_all(&items, b))
        })])
    }
}
