use anyhow::{Result, anyhow};
use ironcanal::testing::*;
use ironcanal::*;

#[test]
fn building_is_lazy() -> Result<()> {
    let calls = CallCounter::new();
    let counted = calls.clone();
    let c = Canal::from_vec(vec![1, 2, 3]).map(move |x| {
        counted.hit();
        x + 1
    });
    assert_eq!(calls.get(), 0);
    assert_eq!(c.first()?, Some(2));
    assert_eq!(calls.get(), 1, "first pulls exactly one element");
    Ok(())
}

#[test]
fn map_filter_flat_map_preserve_order() -> Result<()> {
    let out = Canal::from_vec(vec![1, 2, 3, 4])
        .filter(|x| x % 2 == 0)
        .flat_map(|x| vec![x, x * 10])
        .map(|x| x + 1)
        .collect()?;
    assert_eq!(out, vec![3, 21, 5, 41]);
    Ok(())
}

#[test]
fn closure_errors_propagate_at_their_position() {
    let seen = CallCounter::new();
    let counted = seen.clone();
    let c = Canal::from_vec(vec![1, 2, 0, 4])
        .try_filter(|x| if *x == 0 { Err(anyhow!("zero")) } else { Ok(true) })
        .peek(move |_| counted.hit());
    let err = c.collect().unwrap_err();
    assert_eq!(err.to_string(), "zero");
    assert_eq!(seen.get(), 2, "elements after the failure are never pulled");
}

#[test]
fn try_map_and_try_flat_map() -> Result<()> {
    let parsed = Canal::from_vec(vec!["1", "2", "x"]).try_map(|s| Ok(s.parse::<i32>()?));
    assert!(parsed.collect().is_err());
    assert_eq!(parsed.take(2)?, vec![1, 2]);

    let split = Canal::from_vec(vec!["a,b", "c"]).try_flat_map(|s| {
        Ok(s.split(',').map(str::to_string).collect::<Vec<_>>())
    });
    assert_eq!(split.collect()?, vec!["a", "b", "c"]);
    Ok(())
}

#[test]
fn map_with_state_starts_fresh_per_traversal() -> Result<()> {
    let running = Canal::from_vec(vec![1, 2, 3]).map_with_state(|| 0, |acc: &mut i32, x| {
        *acc += x;
        *acc
    });
    assert_eq!(running.collect()?, vec![1, 3, 6]);
    assert_eq!(running.collect()?, vec![1, 3, 6]);
    Ok(())
}

#[test]
fn flatten_nested_canals() -> Result<()> {
    let nested = Canal::from_vec(vec![Canal::from_vec(vec![1, 2]), Canal::none(), Canal::some(3)]);
    assert_eq!(nested.flatten().collect()?, vec![1, 2, 3]);
    Ok(())
}

#[test]
fn distinct_keeps_first_seen_order_and_is_idempotent() -> Result<()> {
    let input = vec![3, 1, 3, 2, 1, 4];
    let once = Canal::from_vec(input.clone()).distinct();
    let out = once.collect()?;
    assert_eq!(out, vec![3, 1, 2, 4]);
    assert!(out.len() <= input.len());
    assert_eq!(once.distinct().collect()?, out);

    let by_len = Canal::from_vec(vec!["aa", "b", "cc", "d", "eee"]).distinct_by(|s| s.len());
    assert_eq!(by_len.collect()?, vec!["aa", "b", "eee"]);
    Ok(())
}

#[test]
fn distinct_streams_over_unbounded_input() -> Result<()> {
    let cycled = Canal::iterate(0u32, |x| (x + 1) % 3).distinct();
    assert_eq!(cycled.take(3)?, vec![0, 1, 2]);
    Ok(())
}

#[test]
fn set_algebra() -> Result<()> {
    let a = Canal::from_vec(vec![1, 2, 3, 2]);
    let b = Canal::from_vec(vec![2, 4]);
    assert_eq!(a.union(&b).collect()?, vec![1, 2, 3, 2, 2, 4]);
    assert_eq!(a.intersection(&b).collect()?, vec![2, 2]);
    assert_eq!(a.subtract(&b).collect()?, vec![1, 3]);
    assert_eq!(
        Canal::from_vec(vec![1, 2]).cartesian(&Canal::from_vec(vec!['x', 'y'])).collect()?,
        vec![(1, 'x'), (1, 'y'), (2, 'x'), (2, 'y')]
    );
    assert_eq!(a.reverse().collect()?, vec![2, 3, 2, 1]);
    Ok(())
}

#[test]
fn cartesian_with_unbounded_right_fails_fast() {
    let right = Canal::generate(|| 1);
    let err = expect_canal_error(&Canal::from_vec(vec![1]).cartesian(&right));
    assert_eq!(err, CanalError::Unbounded { op: "cartesian" });
}

#[test]
fn sliding_windows() -> Result<()> {
    let c = Canal::from_vec((1..=6).collect::<Vec<_>>());
    assert_eq!(
        c.sliding(3, 1).collect()?,
        vec![vec![1, 2, 3], vec![2, 3, 4], vec![3, 4, 5], vec![4, 5, 6]]
    );
    assert_eq!(c.sliding(2, 2).collect()?, vec![vec![1, 2], vec![3, 4], vec![5, 6]]);
    assert_eq!(c.sliding(4, 3).collect()?, vec![vec![1, 2, 3, 4], vec![4, 5, 6]]);
    assert_eq!(c.sliding(2, 3).collect()?, vec![vec![1, 2], vec![4, 5]]);
    assert_eq!(c.sliding(4, 4).collect()?, vec![vec![1, 2, 3, 4], vec![5, 6]]);
    assert!(Canal::<i32>::none().sliding(2, 1).collect()?.is_empty());

    // a tail holding only already-emitted elements is not a window
    let five = Canal::from_vec(vec![1, 2, 3, 4, 5]);
    assert_eq!(five.sliding(3, 2).collect()?, vec![vec![1, 2, 3], vec![3, 4, 5]]);
    assert_eq!(five.sliding(3, 1).count()?, 3);
    Ok(())
}

#[test]
fn sliding_rejects_zero_size_or_step() {
    let c = Canal::from_vec(vec![1, 2, 3]);
    assert_eq!(
        expect_canal_error(&c.sliding(0, 1)),
        CanalError::InvalidSliding { size: 0, step: 1 }
    );
    assert_eq!(
        expect_canal_error(&c.sliding(2, 0)),
        CanalError::InvalidSliding { size: 2, step: 0 }
    );
}

#[test]
fn blocking_operators_fail_fast_on_unbounded_input() {
    let naturals = Canal::iterate(0u64, |x| x + 1);
    assert_eq!(
        expect_canal_error(&naturals.reverse()),
        CanalError::Unbounded { op: "reverse" }
    );
    assert_eq!(
        expect_canal_error(&naturals.sort_with(true)),
        CanalError::Unbounded { op: "sort" }
    );
    let err = naturals.last().unwrap_err();
    assert_eq!(
        err.downcast_ref::<CanalError>(),
        Some(&CanalError::Unbounded { op: "last" })
    );
    assert!(naturals.count().is_err());
    // bounded again, everything works
    assert_eq!(naturals.limit(3).reverse().collect().unwrap(), vec![2, 1, 0]);
}

#[test]
fn terminals() -> Result<()> {
    let c = Canal::from_vec(vec![4, 7, 1, 8, 2]);
    assert_eq!(c.first()?, Some(4));
    assert_eq!(c.find(|x| *x > 5)?, Some(7));
    assert_eq!(c.last()?, Some(2));
    assert_eq!(c.last_where(|x| *x > 5)?, Some(8));
    assert_eq!(c.fold(0, |a, x| a + x)?, 22);
    assert_eq!(c.reduce(i32::max)?, Some(8));
    assert_eq!(Canal::<i32>::none().reduce(i32::max)?, None);
    assert_eq!(c.take(2)?, vec![4, 7]);
    assert!(c.all(|x| *x > 0)?);
    assert!(c.any(|x| *x == 1)?);
    assert!(!c.any(|x| *x == 5)?);
    assert_eq!(c.element_at(3)?, 8);
    assert_eq!(c.count()?, 5);

    let mut sum = 0;
    c.for_each(|x| sum += x)?;
    assert_eq!(sum, 22);

    let err = c.try_for_each(|x| if x == 1 { Err(anyhow!("stop")) } else { Ok(()) });
    assert!(err.is_err());
    Ok(())
}

#[test]
fn element_at_past_the_end() {
    let err = Canal::from_vec(vec!['a', 'b']).element_at(5).unwrap_err();
    assert_eq!(
        err.downcast_ref::<CanalError>(),
        Some(&CanalError::IndexOutOfBounds { index: 5, len: 2 })
    );
}

#[test]
fn short_circuit_terminals_work_on_unbounded_canals() -> Result<()> {
    let naturals = Canal::iterate(0u64, |x| x + 1);
    assert_eq!(naturals.find(|x| *x * *x > 50)?, Some(8));
    assert!(naturals.any(|x| *x == 100)?);
    assert!(!naturals.all(|x| *x < 10)?);
    assert_eq!(naturals.element_at(42)?, 42);
    Ok(())
}

#[test]
fn mk_string_wraps() -> Result<()> {
    let c = Canal::from_vec(vec!["a", "b", "c"]);
    assert_eq!(c.mk_string(",", "", "", false)?, "a,b,c");
    assert_eq!(c.mk_string(" | ", "<", ">", false)?, "<a | b | c>");
    assert_eq!(Canal::<&str>::none().mk_string(",", "(", ")", true)?, "()");
    Ok(())
}

#[test]
fn iter_exposes_a_traversal() -> Result<()> {
    let c = Canal::from_vec(vec![1, 2, 3]);
    let mut total = 0;
    for x in &c {
        total += x?;
    }
    assert_eq!(total, 6);
    assert_eq!(c.iter().count(), 3);
    Ok(())
}
