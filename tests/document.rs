use anyhow::Result;
use ironcanal::testing::*;
use ironcanal::*;
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Clone, Debug, Serialize)]
struct Person {
    name: String,
    age: u32,
}

#[test]
fn from_document_keeps_attribute_order() -> Result<()> {
    let Value::Object(doc) = json!({"zeta": 1, "alpha": [true], "mid": {"x": null}}) else {
        unreachable!()
    };
    let keys = Canal::from_document(&doc).keys().collect()?;
    assert_eq!(keys, vec!["zeta", "alpha", "mid"]);

    let numbers = Canal::from_document(&doc)
        .filter_values(Value::is_number)
        .collect()?;
    assert_eq!(numbers, vec![("zeta".to_string(), json!(1))]);
    Ok(())
}

#[test]
fn json_arrays_in_and_out() -> Result<()> {
    let c = Canal::from_json_array(vec![json!(1), json!("two"), json!(null)]);
    assert_eq!(c.count()?, 3);
    assert_eq!(c.collect_json()?, json!([1, "two", null]));

    let people = Canal::from_vec(vec![
        Person { name: "ann".into(), age: 31 },
        Person { name: "bo".into(), age: 27 },
    ]);
    assert_eq!(
        people.collect_json()?,
        json!([{"name": "ann", "age": 31}, {"name": "bo", "age": 27}])
    );
    Ok(())
}

#[test]
fn append_json_extends_the_sink() -> Result<()> {
    let mut sink = vec![json!("header")];
    let added = Canal::from_vec(vec![1, 2, 3]).append_json(&mut sink)?;
    assert_eq!(added, 3);
    assert_eq!(sink, vec![json!("header"), json!(1), json!(2), json!(3)]);

    let endless = Canal::generate(|| 0u8);
    assert!(endless.append_json(&mut sink).is_err());
    assert_eq!(sink.len(), 4, "an unbounded canal appends nothing");
    Ok(())
}

#[test]
fn to_rows_projects_structs() -> Result<()> {
    let rows = Canal::from_vec(vec![Person { name: "cy".into(), age: 40 }]).to_rows().collect()?;
    assert_eq!(rows, vec![row([("name", json!("cy")), ("age", json!(40))])]);

    let err = expect_canal_error(&Canal::from_vec(vec![1, 2]).to_rows());
    assert_eq!(err, CanalError::NotARecord { found: "a number".into() });
    Ok(())
}

#[test]
fn tables_become_rows() -> Result<()> {
    let table = Table::new(
        ["id", "name", "score"],
        vec![
            vec![json!(1), json!("ann"), json!(9.5)],
            vec![json!(2), json!("bo")],
            vec![json!(3), json!("cy"), json!(7), json!("extra")],
        ],
    );
    assert_eq!(table.ordinal("name"), Some(1));
    assert_eq!(table.ordinal("missing"), None);
    assert_eq!(table.ordinals()["score"], 2);

    let rows = Canal::from_table(&table).collect()?;
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], row([("id", json!(1)), ("name", json!("ann")), ("score", json!(9.5))]));
    assert_eq!(rows[1]["score"], Value::Null);
    assert_eq!(rows[2].len(), 3);
    let columns: Vec<&String> = rows[2].keys().collect();
    assert_eq!(columns, vec!["id", "name", "score"]);
    Ok(())
}

#[test]
fn table_rows_feed_window_functions() -> Result<()> {
    let table = Table::new(
        ["team", "points"],
        vec![
            vec![json!("red"), json!(3)],
            vec![json!("blue"), json!(5)],
            vec![json!("red"), json!(4)],
        ],
    );
    let totals = Canal::from_table(&table)
        .window(vec![WindowFn::sum(Item::col("points"))
            .over()
            .partition_by(vec![Item::col("team")])
            .alias("team_total")])?
        .map(|r| r["team_total"].clone())
        .collect()?;
    assert_eq!(totals, vec![json!(7), json!(5), json!(7)]);
    Ok(())
}
