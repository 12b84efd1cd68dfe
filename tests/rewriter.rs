// SPDX-License-Identifier: SEE LICENSE IN LICENSE.md
// SPDX-FileCopyrightText: 2022 CYBERTEC PostgreSQL International GmbH
// <office@cybertec.at>

use pretty_assertions::assert_eq;
use sql_rewriter::{parse_one, Dialect, RewriteError, Rewriter};

#[test]
fn test_ctas() {
    let expression = parse_one("SELECT * FROM y").unwrap();

    assert_eq!(
        Rewriter::new(&expression)
            .ctas("x", None, &[])
            .unwrap()
            .expression
            .sql(Dialect::Generic),
        "CREATE TABLE x AS SELECT * FROM y",
    );

    assert_eq!(
        Rewriter::new(&expression)
            .ctas("x", Some("foo"), &[("format", "parquet"), ("y", "2")])
            .unwrap()
            .expression
            .sql(Dialect::Hive),
        "CREATE TABLE foo.x STORED AS PARQUET TBLPROPERTIES ('y' = '2') AS SELECT * FROM y",
    );

    // The façade deep-copies; the input tree is untouched.
    assert_eq!(expression.sql(Dialect::Generic), "SELECT * FROM y");

    let rewriter = Rewriter::new(&expression).ctas("x", None, &[]).unwrap();
    assert_eq!(
        rewriter.expression.sql(Dialect::Generic),
        "CREATE TABLE x AS SELECT * FROM y",
    );

    assert!(matches!(
        rewriter.ctas("y", None, &[]),
        Err(RewriteError::AlreadyCreate)
    ));
}

#[test]
fn test_add_selects() {
    let expression = parse_one("SELECT * FROM (SELECT * FROM x) y").unwrap();

    assert_eq!(
        Rewriter::new(&expression)
            .add_selects(&["a", "sum(b) as c"])
            .unwrap()
            .expression
            .sql(Dialect::Hive),
        "SELECT *, a, SUM(b) AS c FROM (SELECT * FROM x) AS y",
    );
}

#[test]
fn test_add_where() {
    let expression = parse_one("SELECT * FROM x").unwrap();

    assert_eq!(
        Rewriter::new(&expression)
            .add_where("", "(col1 IN (1, 2, 3) AND col2 = 3) OR col3 LIKE 'cat'")
            .unwrap()
            .expression
            .sql(Dialect::Hive),
        "SELECT * FROM x WHERE (col1 IN (1, 2, 3) AND col2 = 3) OR col3 LIKE 'cat'",
    );

    let expression = parse_one("SELECT * FROM x WHERE col1 > 5").unwrap();

    // multi conditions
    assert_eq!(
        Rewriter::new(&expression)
            .add_where("AND", "((col1 = 1 AND col2 = 2) OR col3 = 3)")
            .unwrap()
            .expression
            .sql(Dialect::Hive),
        "SELECT * FROM x WHERE ((col1 = 1 AND col2 = 2) OR col3 = 3) AND col1 > 5",
    );

    assert_eq!(
        Rewriter::new(&expression)
            .add_where("OR", "((col1 = 1 AND col2 = 2) OR col3 = 3)")
            .unwrap()
            .expression
            .sql(Dialect::Hive),
        "SELECT * FROM x WHERE ((col1 = 1 AND col2 = 2) OR col3 = 3) OR col1 > 5",
    );

    // IN operator
    assert_eq!(
        Rewriter::new(&expression)
            .add_where("AND", "col2 IN (1, 2, 3)")
            .unwrap()
            .expression
            .sql(Dialect::Hive),
        "SELECT * FROM x WHERE col2 IN (1, 2, 3) AND col1 > 5",
    );

    // subquery
    assert_eq!(
        Rewriter::new(&expression)
            .add_where("AND", "a > (SELECT 1 FROM x GROUP BY y)")
            .unwrap()
            .expression
            .sql(Dialect::Hive),
        "SELECT * FROM x WHERE a > (SELECT 1 FROM x GROUP BY y) AND col1 > 5",
    );

    // CASE expression
    assert_eq!(
        Rewriter::new(&expression)
            .add_where("OR", "CASE WHEN col2 = 1 THEN col1 > 100 ELSE col1 > 50 END;")
            .unwrap()
            .expression
            .sql(Dialect::Hive),
        "SELECT * FROM x WHERE CASE WHEN col2 = 1 THEN col1 > 100 ELSE col1 > 50 END OR col1 > 5",
    );

    // NOT operator
    assert_eq!(
        Rewriter::new(&expression)
            .add_where("AND", "NOT col1 = 10")
            .unwrap()
            .expression
            .sql(Dialect::Hive),
        "SELECT * FROM x WHERE NOT col1 = 10 AND col1 > 5",
    );

    // mathematical expression
    assert_eq!(
        Rewriter::new(&expression)
            .add_where("AND", "(col1 * col2) > 100")
            .unwrap()
            .expression
            .sql(Dialect::Hive),
        "SELECT * FROM x WHERE (col1 * col2) > 100 AND col1 > 5",
    );

    // IS NULL
    assert_eq!(
        Rewriter::new(&expression)
            .add_where("AND", "col1 IS NULL")
            .unwrap()
            .expression
            .sql(Dialect::Hive),
        "SELECT * FROM x WHERE col1 IS NULL AND col1 > 5",
    );

    // BETWEEN operator
    assert_eq!(
        Rewriter::new(&expression)
            .add_where("AND", "col1 BETWEEN 10 AND 100")
            .unwrap()
            .expression
            .sql(Dialect::Hive),
        "SELECT * FROM x WHERE col1 BETWEEN 10 AND 100 AND col1 > 5",
    );

    assert_eq!(
        Rewriter::new(&expression)
            .add_where("AND", "col1 RLIKE '^J'")
            .unwrap()
            .expression
            .sql(Dialect::Hive),
        "SELECT * FROM x WHERE col1 RLIKE '^J' AND col1 > 5",
    );

    // An unknown operator with an existing WHERE leaves it untouched.
    assert_eq!(
        Rewriter::new(&expression)
            .add_where("", "col2 = 1")
            .unwrap()
            .expression
            .sql(Dialect::Hive),
        "SELECT * FROM x WHERE col1 > 5",
    );
}

#[test]
fn test_add_where_tree_shape() {
    let expression = parse_one("SELECT * FROM x").unwrap();

    let rewritten = Rewriter::new(&expression)
        .add_where("AND", "col2 IN (1, 2, 3)")
        .unwrap()
        .expression;
    assert_eq!(
        rewritten.node("where").unwrap().node("this").unwrap(),
        &parse_one("col2 IN (1, 2, 3)").unwrap(),
    );

    let combined = Rewriter::new(&rewritten)
        .add_where("AND", "col1 > 5")
        .unwrap()
        .expression;
    let conjunction = combined.node("where").unwrap().node("this").unwrap();
    assert_eq!(
        conjunction.node("this").unwrap(),
        &parse_one("col1 > 5").unwrap(),
    );
    assert_eq!(
        conjunction.node("expression").unwrap(),
        &parse_one("col2 IN (1, 2, 3)").unwrap(),
    );
}

#[test]
fn test_add_join() {
    let expression = parse_one("SELECT * FROM x WHERE col1 > 5").unwrap();

    assert_eq!(
        Rewriter::new(&expression)
            .add_join("JOIN y ON x.col1 = y.col1 AND x.col2 = y.col2")
            .unwrap()
            .expression
            .sql(Dialect::Hive),
        "SELECT * FROM x JOIN y ON x.col1 = y.col1 AND x.col2 = y.col2 WHERE col1 > 5",
    );

    let expression = parse_one("SELECT * FROM x JOIN z ON x.col1 = z.col1 WHERE col1 > 5").unwrap();

    assert_eq!(
        Rewriter::new(&expression)
            .add_join(
                "JOIN y ON objects00(x.col1) = objects00(y.col1) \
                 JOIN q ON color(x.col2) = color(q.col2)",
            )
            .unwrap()
            .expression
            .sql(Dialect::Hive),
        "SELECT * FROM x JOIN z ON x.col1 = z.col1 JOIN y ON objects00(x.col1) = objects00(y.col1) \
         JOIN q ON color(x.col2) = color(q.col2) WHERE col1 > 5",
    );

    // LEFT JOIN and RIGHT JOIN
    assert_eq!(
        Rewriter::new(&expression)
            .add_join(
                "LEFT JOIN y ON objects00(x.col1) = objects00(y.col1) \
                 RIGHT JOIN q ON color(x.col2) = color(q.col2)",
            )
            .unwrap()
            .expression
            .sql(Dialect::Hive),
        "SELECT * FROM x JOIN z ON x.col1 = z.col1 LEFT JOIN y ON objects00(x.col1) = objects00(y.col1) \
         RIGHT JOIN q ON color(x.col2) = color(q.col2) WHERE col1 > 5",
    );

    // INNER JOIN
    assert_eq!(
        Rewriter::new(&expression)
            .add_join("INNER JOIN y ON x.col1 = y.col1")
            .unwrap()
            .expression
            .sql(Dialect::Hive),
        "SELECT * FROM x JOIN z ON x.col1 = z.col1 INNER JOIN y ON x.col1 = y.col1 WHERE col1 > 5",
    );

    // FULL OUTER JOIN
    assert_eq!(
        Rewriter::new(&expression)
            .add_join("FULL OUTER JOIN y ON x.col1 = y.col1")
            .unwrap()
            .expression
            .sql(Dialect::Hive),
        "SELECT * FROM x JOIN z ON x.col1 = z.col1 FULL OUTER JOIN y ON x.col1 = y.col1 WHERE col1 > 5",
    );

    // CROSS JOIN
    assert_eq!(
        Rewriter::new(&expression)
            .add_join("CROSS JOIN y ON x.col1 = y.col1")
            .unwrap()
            .expression
            .sql(Dialect::Hive),
        "SELECT * FROM x JOIN z ON x.col1 = z.col1 CROSS JOIN y ON x.col1 = y.col1 WHERE col1 > 5",
    );
}

#[test]
fn test_chained_rewrites() {
    let expression = parse_one("SELECT * FROM x").unwrap();

    let rewritten = Rewriter::new(&expression)
        .add_join("JOIN y ON x.a = y.a")
        .unwrap()
        .add_where("AND", "y.b > 1")
        .unwrap()
        .ctas("t", Some("db"), &[])
        .unwrap();
    assert_eq!(
        rewritten.expression.sql(Dialect::Generic),
        "CREATE TABLE db.t AS SELECT * FROM x JOIN y ON x.a = y.a WHERE y.b > 1",
    );

    // Chained façades are independent trees.
    assert_eq!(expression.sql(Dialect::Generic), "SELECT * FROM x");
}
