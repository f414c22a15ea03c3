use anyhow::Result;
use ironcanal::*;

#[test]
fn reverse_flips_one_component_of_a_composite_key() -> Result<()> {
    let pairs = Canal::from_vec(vec![(2, 3), (1, 1), (1, 2)]);
    let by_key = pairs.sort_by_key(|p| (p.0, Reverse(p.1))).collect()?;
    assert_eq!(by_key, vec![(1, 2), (1, 1), (2, 3)]);

    let by_orders = pairs
        .sort_by(vec![Order::asc(|p: &(i32, i32)| p.0), Order::desc(|p: &(i32, i32)| p.1)])
        .collect()?;
    assert_eq!(by_orders, by_key);
    Ok(())
}

#[test]
fn sorting_is_stable() -> Result<()> {
    let tagged = Canal::from_vec(vec![(3, 'a'), (1, 'b'), (3, 'c'), (1, 'd'), (2, 'e')]);
    assert_eq!(
        tagged.sort_by_key(|p| p.0).collect()?,
        vec![(1, 'b'), (1, 'd'), (2, 'e'), (3, 'a'), (3, 'c')]
    );
    // descending keeps ties in arrival order too
    assert_eq!(
        tagged.sort_by(vec![Order::desc(|p: &(i32, char)| p.0)]).collect()?,
        vec![(3, 'a'), (3, 'c'), (2, 'e'), (1, 'b'), (1, 'd')]
    );
    Ok(())
}

#[test]
fn natural_and_custom_comparisons() -> Result<()> {
    let nums = Canal::from_vec(vec![5, 2, 9, 1]);
    assert_eq!(nums.sort_with(true).collect()?, vec![1, 2, 5, 9]);
    assert_eq!(nums.sort_with(false).collect()?, vec![9, 5, 2, 1]);

    let words = Canal::from_vec(vec!["ccc", "a", "bb"]);
    let by_len = words.sort_with_cmp(|a, b| a.len().cmp(&b.len()), false).collect()?;
    assert_eq!(by_len, vec!["ccc", "bb", "a"]);

    let reversed = Order::natural(true).reversed();
    assert!(!reversed.is_ascending());
    assert_eq!(nums.sort_by(vec![reversed]).collect()?, vec![9, 5, 2, 1]);
    Ok(())
}

#[test]
fn empty_order_list_keeps_input_order() -> Result<()> {
    let c = Canal::from_vec(vec![3, 1, 2]);
    assert_eq!(c.sort_by(Vec::new()).collect()?, vec![3, 1, 2]);
    Ok(())
}

#[test]
fn sorting_is_lazy_and_refuses_unbounded_input() -> Result<()> {
    let endless = Canal::iterate(0i32, |x| x - 1);
    let sorted = endless.sort_with(true);
    let err = sorted.collect().err().and_then(|e| e.downcast::<CanalError>().ok());
    assert!(matches!(err, Some(CanalError::Unbounded { op: "sort" })));

    let bounded = endless.limit(4).sort_with(true);
    assert_eq!(bounded.collect()?, vec![-3, -2, -1, 0]);
    Ok(())
}

#[test]
fn stratify_cuts_equal_runs() -> Result<()> {
    let people = Canal::from_vec(vec![("ann", 30), ("bo", 25), ("cy", 30), ("di", 25), ("ed", 41)]);
    let strata = people.stratify_by_key(|p| p.1).collect()?;
    let sizes: Vec<usize> = strata.iter().map(|s| s.count()).collect::<Result<_>>()?;
    assert_eq!(sizes, vec![2, 2, 1]);
    assert_eq!(strata[0].collect()?, vec![("bo", 25), ("di", 25)]);
    assert_eq!(strata[1].collect()?, vec![("ann", 30), ("cy", 30)]);

    let runs = Canal::from_vec(vec![2, 1, 2, 2, 3])
        .stratify_with(false)
        .try_map(|s| s.collect())
        .collect()?;
    assert_eq!(runs, vec![vec![3], vec![2, 2, 2], vec![1]]);
    Ok(())
}

#[test]
fn stratify_on_empty_input_has_no_strata() -> Result<()> {
    assert_eq!(Canal::<i32>::none().stratify_with(true).count()?, 0);
    Ok(())
}

#[test]
fn parallel_runner_sorts_identically() -> Result<()> {
    let data: Vec<(u32, u32)> = (0..5_000u32).map(|i| ((i * 7919) % 97, i)).collect();
    let seq = Canal::from_vec(data.clone()).sort_by_key(|p| p.0).collect()?;
    let par = Canal::from_vec(data)
        .with_runner(Runner::parallel(Some(2)).with_threshold(1))
        .sort_by_key(|p| p.0)
        .collect()?;
    assert_eq!(seq, par);
    assert!(seq.windows(2).all(|w| w[0].0 < w[1].0 || (w[0].0 == w[1].0 && w[0].1 < w[1].1)));
    Ok(())
}

#[test]
fn runner_settings_follow_the_canal() {
    let runner = Runner::parallel(None).with_threshold(10);
    let c = Canal::from_vec(vec![1, 2, 3]).with_runner(runner);
    assert_eq!(c.map(|x| x + 1).runner(), runner);
    assert_eq!(c.sort_with(true).runner(), runner);
    assert_eq!(Canal::from_vec(vec![1]).runner(), Runner::sequential());
    assert_eq!(runner.mode, ExecMode::Parallel { threads: None });
}
