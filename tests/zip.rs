use anyhow::Result;
use ironcanal::*;

#[test]
fn zip_stops_at_the_shorter_side() -> Result<()> {
    let a = Canal::from_vec(vec![1, 2, 3]);
    let b = Canal::from_vec(vec!["x", "y"]);
    assert_eq!(a.zip(&b).collect()?, vec![(1, "x"), (2, "y")]);
    assert_eq!(b.zip(&a).collect()?, vec![("x", 1), ("y", 2)]);
    Ok(())
}

#[test]
fn zip_with_a_finite_side_is_finite() -> Result<()> {
    let naturals = Canal::iterate(0usize, |x| x + 1);
    let letters = Canal::from_vec(vec!['a', 'b', 'c']);
    let z = naturals.zip(&letters);
    assert_eq!(z.extent(), Extent::Finite);
    assert_eq!(z.collect()?, vec![(0, 'a'), (1, 'b'), (2, 'c')]);
    Ok(())
}

#[test]
fn zip_outer_runs_to_the_longer_side() -> Result<()> {
    let a = Canal::from_vec(vec![1, 2, 3]);
    let b = Canal::from_vec(vec!["x"]);
    assert_eq!(
        a.zip_outer(&b).collect()?,
        vec![(Some(1), Some("x")), (Some(2), None), (Some(3), None)]
    );
    assert_eq!(
        b.zip_outer(&a).collect()?,
        vec![(Some("x"), Some(1)), (None, Some(2)), (None, Some(3))]
    );
    assert!(Canal::<i32>::none().zip_outer(&Canal::<i32>::none()).collect()?.is_empty());
    Ok(())
}

#[test]
fn zip_with_index_counts_from_zero() -> Result<()> {
    let c = Canal::from_vec(vec!["a", "b"]).zip_with_index();
    assert_eq!(c.collect()?, vec![("a", 0), ("b", 1)]);
    Ok(())
}

#[test]
fn zip_with_phase_marks_boundaries() -> Result<()> {
    let many = Canal::from_vec(vec![1, 2, 3, 4]).zip_with_phase().collect()?;
    assert_eq!(
        many,
        vec![(1, Phase::First), (2, Phase::Middle), (3, Phase::Middle), (4, Phase::Last)]
    );
    assert_eq!(Canal::some(9).zip_with_phase().collect()?, vec![(9, Phase::Only)]);
    assert_eq!(
        Canal::from_vec(vec![1, 2]).zip_with_phase().collect()?,
        vec![(1, Phase::First), (2, Phase::Last)]
    );
    assert!(Canal::<i32>::none().zip_with_phase().collect()?.is_empty());
    Ok(())
}

#[test]
fn phase_drives_separator_rendering() -> Result<()> {
    let mut out = String::new();
    Canal::from_vec(vec!["a", "b", "c"])
        .zip_with_phase()
        .for_each(|(s, phase)| {
            if phase.is_first() {
                out.push('[');
            }
            out.push_str(s);
            out.push_str(if phase.is_last() { "]" } else { ", " });
        })?;
    assert_eq!(out, "[a, b, c]");
    assert!(Phase::Only.is_first() && Phase::Only.is_last());
    Ok(())
}

#[test]
fn swap_pairs() -> Result<()> {
    let c = Canal::from_vec(vec![(1, 'a'), (2, 'b')]).swap();
    assert_eq!(c.collect()?, vec![('a', 1), ('b', 2)]);
    assert_eq!((1, "x").reverse(), ("x", 1));
    Ok(())
}
