use anyhow::Result;
use ironcanal::testing::*;
use ironcanal::*;

fn mod4() -> Canal<(i32, i32)> {
    Canal::range(1, 6, 1).map(|x| x as i32).key_by(|x| x % 4)
}

fn mod3() -> Canal<(i32, i32)> {
    Canal::range(1, 6, 1).map(|x| x as i32).key_by(|x| x % 3)
}

#[test]
fn inner_join_is_left_driven() -> Result<()> {
    let joined = mod4().join(&mod3()).collect()?;
    assert_eq!(
        joined,
        vec![
            (1, (1, 1)),
            (1, (1, 4)),
            (1, (5, 1)),
            (1, (5, 4)),
            (2, (2, 2)),
            (2, (2, 5)),
            (0, (4, 3)),
        ]
    );
    Ok(())
}

#[test]
fn left_join_keeps_unmatched_left_rows_in_place() -> Result<()> {
    let joined = mod4().left_join(&mod3()).collect()?;
    assert_eq!(
        joined,
        vec![
            (1, (1, Some(1))),
            (1, (1, Some(4))),
            (1, (5, Some(1))),
            (1, (5, Some(4))),
            (2, (2, Some(2))),
            (2, (2, Some(5))),
            (3, (3, None)),
            (0, (4, Some(3))),
        ]
    );
    Ok(())
}

#[test]
fn right_join_orders_keys_by_the_right_side() -> Result<()> {
    let joined = mod4().right_join(&mod3()).collect()?;
    assert_eq!(
        joined,
        vec![
            (1, (Some(1), 1)),
            (1, (Some(1), 4)),
            (1, (Some(5), 1)),
            (1, (Some(5), 4)),
            (2, (Some(2), 2)),
            (2, (Some(2), 5)),
            (0, (Some(4), 3)),
        ]
    );

    let left = Canal::from_vec(vec![(1, 'a'), (1, 'e')]);
    let right = Canal::from_vec(vec![(7, 70), (1, 10), (1, 40)]);
    assert_eq!(
        left.right_join(&right).collect()?,
        vec![
            (7, (None, 70)),
            (1, (Some('a'), 10)),
            (1, (Some('a'), 40)),
            (1, (Some('e'), 10)),
            (1, (Some('e'), 40)),
        ]
    );
    Ok(())
}

#[test]
fn full_join_appends_right_only_keys() -> Result<()> {
    let joined = mod4().full_join(&mod3()).collect()?;
    assert_eq!(joined.len(), 8);
    assert_eq!(joined[6], (3, (Some(3), None)));

    let left = Canal::from_vec(vec![("a", 1), ("b", 2)]);
    let right = Canal::from_vec(vec![("c", 'x'), ("b", 'y'), ("d", 'z')]);
    assert_eq!(
        left.full_join(&right).collect()?,
        vec![
            ("a", (Some(1), None)),
            ("b", (Some(2), Some('y'))),
            ("c", (None, Some('x'))),
            ("d", (None, Some('z'))),
        ]
    );
    Ok(())
}

#[test]
fn joins_with_an_empty_side() -> Result<()> {
    let empty = Canal::<(i32, i32)>::none();
    assert!(mod4().join(&empty).collect()?.is_empty());
    assert_eq!(mod4().left_join(&empty).count()?, 5);
    assert!(mod4().right_join(&empty).collect()?.is_empty());
    assert_eq!(empty.full_join(&mod3()).count()?, 5);
    Ok(())
}

#[test]
fn join_refuses_an_unbounded_side() {
    let endless = Canal::iterate(0i32, |x| x + 1).key_by(|x| x % 4);
    let err = expect_canal_error(&mod4().join(&endless));
    assert!(matches!(err, CanalError::Unbounded { op: "join" }), "{err:?}");
    let err = expect_canal_error(&endless.join(&mod3()));
    assert!(matches!(err, CanalError::Unbounded { .. }), "{err:?}");
}

#[test]
fn map_joint_flattens_joined_pairs() -> Result<()> {
    let names = Canal::from_vec(vec![(1, "ann"), (2, "bo")]);
    let ages = Canal::from_vec(vec![(2, 40), (1, 33)]);
    let lines = names
        .join(&ages)
        .map_joint(|name, age, id| format!("{id}:{name}:{age}"))
        .collect()?;
    assert_eq!(lines, vec!["1:ann:33", "2:bo:40"]);
    Ok(())
}

#[test]
fn joins_replay() -> Result<()> {
    let joined = mod4().join(&mod3());
    assert_eq!(joined.collect()?, joined.collect()?);
    Ok(())
}
