//! Integration tests for the qb module.

use crate::expr::{alias, and, or, Equal, Greater, Less, NotEqual};
use crate::fragment::{Expr, Fragment, SetValue};
use crate::placeholder::{placeholders, Dialect};
use crate::qb::{case, case_on, delete, insert, select, update, SelectBuilder, SqlQb};
use crate::typed::{TypedValue, YqlType};
use crate::value::Value;
use crate::StatementBuilder;

#[test]
fn test_select_full() {
    let list = Value::list([201, 202, 203]);
    let sub = select(["aa", "bb"]).from("dd");

    let qb = select(["a", "b"])
        .prefix(Expr::new("WITH prefix AS ?", [0]))
        .distinct()
        .columns(["c"])
        .column(Expr::new(
            format!("IF(d IN ({}), 1, 0) as stat_column", placeholders(3)),
            [1, 2, 3],
        ))
        .column(Expr::new("a > ?", [100]))
        .column(alias(Equal::new().with("b", vec![101, 102, 103]), "b_alias"))
        .column(alias(Equal::new().with("c", list.clone()), "c_alias"))
        .column(alias(sub, "subq"))
        .from("e")
        .index("nameIndex")
        .with(Equal::new().with("FORCE_INFER_SCHEMA", 42))
        .flatten_optional("name")
        .join_clause("CROSS JOIN j1")
        .join("j2")
        .left_join("j3")
        .right_join("j4")
        .inner_join("j5")
        .cross_join("j6")
        .where_(Expr::new("f = ?", [4]))
        .where_(Equal::new().with("g", 5))
        .where_(Equal::new().with("h", 6))
        .where_(Equal::new().with("i", vec![7, 8, 9]))
        .where_(or([
            Fragment::from(Expr::new("j = ?", [10])),
            and([
                Fragment::from(Equal::new().with("k", 11)),
                Fragment::from(Expr::raw("true")),
            ]),
        ]))
        .group_by(["l"])
        .having("m = n")
        .assume_order_by()
        .order_by_clause(Expr::new("? DESC", [1]))
        .order_by(["o ASC", "p DESC"])
        .limit(12)
        .offset(13)
        .suffix(Expr::new("FETCH FIRST ? ROWS ONLY", [14]))
        .dialect(Dialect::DollarP);

    let built = qb.to_sql().unwrap();
    assert_eq!(
        built.sql,
        "WITH prefix AS $p1 \
         SELECT DISTINCT a, b, c, IF(d IN ($p2,$p3,$p4), 1, 0) as stat_column, a > $p5, \
         (b IN ($p6,$p7,$p8)) AS b_alias, \
         (c IN $p9) AS c_alias, \
         (SELECT aa, bb FROM dd) AS subq \
         FROM e VIEW nameIndex \
         WITH FORCE_INFER_SCHEMA = $p10 FLATTEN OPTIONAL BY name \
         CROSS JOIN j1 JOIN j2 LEFT JOIN j3 RIGHT JOIN j4 INNER JOIN j5 CROSS JOIN j6 \
         WHERE f = $p11 AND g = $p12 AND h = $p13 AND i IN ($p14,$p15,$p16) AND (j = $p17 OR (k = $p18 AND true)) \
         GROUP BY l HAVING m = n ASSUME ORDER BY $p19 DESC, o ASC, p DESC LIMIT 12 OFFSET 13 \
         FETCH FIRST $p20 ROWS ONLY"
    );

    let expected: Vec<Value> = vec![
        0.into(),
        1.into(),
        2.into(),
        3.into(),
        100.into(),
        101.into(),
        102.into(),
        103.into(),
        list,
        42.into(),
        4.into(),
        5.into(),
        6.into(),
        7.into(),
        8.into(),
        9.into(),
        10.into(),
        11.into(),
        1.into(),
        14.into(),
    ];
    assert_eq!(built.args, expected);
}

#[test]
fn test_select_from_select() {
    let sub = select(["c"]).from("d").where_(Equal::new().with("i", 1));
    let built = select(["a", "b"])
        .where_(Equal::new().with("m", 2))
        .from_select(sub, "subq")
        .dialect(Dialect::DollarP)
        .to_sql()
        .unwrap();
    assert_eq!(
        built.sql,
        "SELECT a, b FROM (SELECT c FROM d WHERE i = $p1) AS subq WHERE m = $p2"
    );
    assert_eq!(built.args, vec![Value::Int32(1), Value::Int32(2)]);
}

#[test]
fn test_list_value_binds_one_placeholder() {
    let list = Value::list([201, 202, 203]);
    let built = select(["c"])
        .from("d")
        .where_(Equal::new().with("m", list.clone()))
        .dialect(Dialect::DollarP)
        .to_sql()
        .unwrap();
    assert_eq!(built.sql, "SELECT c FROM d WHERE m IN $p1");
    assert_eq!(built.args, vec![list]);
}

#[test]
fn test_nested_dollar_numbering() {
    // The inner dialect is ignored; numbering runs once over the whole text.
    let sub = select(["c"])
        .from("t")
        .where_(Greater::new().with("c", 1))
        .dialect(Dialect::Dollar);
    let built = select(["c"])
        .from_select(sub, "subq")
        .where_(Less::new().with("c", 2))
        .dialect(Dialect::Dollar)
        .to_sql()
        .unwrap();
    assert_eq!(
        built.sql,
        "SELECT c FROM (SELECT c FROM t WHERE c > $1) AS subq WHERE c < $2"
    );
    assert_eq!(built.args, vec![Value::Int32(1), Value::Int32(2)]);
}

#[test]
fn test_select_placeholder_dialects() {
    let qb = select(["test"]).where_(Expr::raw("x = ? AND y = ?"));
    assert_eq!(
        qb.clone().dialect(Dialect::Question).to_sql().unwrap().sql,
        "SELECT test WHERE x = ? AND y = ?"
    );
    assert_eq!(
        qb.clone().dialect(Dialect::Dollar).to_sql().unwrap().sql,
        "SELECT test WHERE x = $1 AND y = $2"
    );
    assert_eq!(
        qb.clone().dialect(Dialect::DollarP).to_sql().unwrap().sql,
        "SELECT test WHERE x = $p1 AND y = $p2"
    );
    assert_eq!(
        qb.clone().dialect(Dialect::Colon).to_sql().unwrap().sql,
        "SELECT test WHERE x = :1 AND y = :2"
    );
    assert_eq!(
        qb.dialect(Dialect::AtP).to_sql().unwrap().sql,
        "SELECT test WHERE x = @p1 AND y = @p2"
    );
}

#[test]
fn test_nested_select_join() {
    let nested = select(["*"])
        .from("baz")
        .where_(Expr::new("foo = ?", [42]));
    let built = select(["*"])
        .from("bar")
        .join_clause(nested.prefix("JOIN (").suffix(") r ON bar.foo = r.foo"))
        .dialect(Dialect::DollarP)
        .to_sql()
        .unwrap();
    assert_eq!(
        built.sql,
        "SELECT * FROM bar JOIN ( SELECT * FROM baz WHERE foo = $p1 ) r ON bar.foo = r.foo"
    );
    assert_eq!(built.args, vec![Value::Int32(42)]);
}

#[test]
fn test_nested_select_in_where() {
    let sb = StatementBuilder::new().dialect(Dialect::Dollar);
    let nested = sb
        .select(["*"])
        .prefix("NOT EXISTS (")
        .from("bar")
        .where_(Expr::new("y = ?", [42]))
        .suffix(")");
    let sql = sb
        .select(["*"])
        .from("foo")
        .where_(Expr::raw("x = ?"))
        .where_(nested)
        .to_sql()
        .unwrap()
        .sql;
    assert_eq!(
        sql,
        "SELECT * FROM foo WHERE x = $1 AND NOT EXISTS ( SELECT * FROM bar WHERE y = $2 )"
    );
}

#[test]
fn test_subquery_numbering_in_prefix_and_from() {
    let sub = select(["a"])
        .where_(Expr::new("b = ?", [1]))
        .dialect(Dialect::Dollar);
    let with = sub.clone().prefix("WITH a AS (").suffix(")");

    let built = select(["*"])
        .prefix(with)
        .from_select(sub, "q")
        .where_(Expr::new("c = ?", [2]))
        .dialect(Dialect::Dollar)
        .to_sql()
        .unwrap();
    assert_eq!(
        built.sql,
        "WITH a AS ( SELECT a WHERE b = $1 ) SELECT * FROM (SELECT a WHERE b = $2) AS q WHERE c = $3"
    );
    assert_eq!(
        built.args,
        vec![Value::Int32(1), Value::Int32(1), Value::Int32(2)]
    );
}

#[test]
fn test_subquery_in_disjunction() {
    let sub = select(["a"])
        .where_(Equal::new().with("b", 1))
        .prefix("EXISTS(")
        .suffix(")")
        .dialect(Dialect::Dollar);
    let built = select(["*"])
        .where_(or([sub]))
        .where_(Expr::new("c = ?", [2]))
        .dialect(Dialect::Dollar)
        .to_sql()
        .unwrap();
    assert_eq!(
        built.sql,
        "SELECT * WHERE (EXISTS( SELECT a WHERE b = $1 )) AND c = $2"
    );
    assert_eq!(built.args, vec![Value::Int32(1), Value::Int32(2)]);
}

#[test]
fn test_join_clause_numbering() {
    let sub = select(["a"])
        .where_(Equal::new().with("b", 2))
        .dialect(Dialect::Dollar);
    let built = select(["t1.a"])
        .from("t1")
        .where_(Equal::new().with("a", 1))
        .join_clause(sub.prefix("JOIN (").suffix(") t2 ON (t1.a = t2.a)"))
        .dialect(Dialect::Dollar)
        .to_sql()
        .unwrap();
    assert_eq!(
        built.sql,
        "SELECT t1.a FROM t1 JOIN ( SELECT a WHERE b = $1 ) t2 ON (t1.a = t2.a) WHERE a = $2"
    );
    assert_eq!(built.args, vec![Value::Int32(2), Value::Int32(1)]);
}

#[test]
fn test_escaped_question_mark() {
    let built = select(["*"])
        .from("docs")
        .where_(Expr::new("meta ?? 'key' AND id = ?", [5]))
        .dialect(Dialect::Dollar)
        .to_sql()
        .unwrap();
    assert_eq!(built.sql, "SELECT * FROM docs WHERE meta ? 'key' AND id = $1");
    assert_eq!(built.args.len(), 1);
}

#[test]
fn test_pre_finalized_block_keeps_its_numbering() {
    let inner = select(["a"])
        .from("t")
        .where_(Expr::new("b = ?", [1]))
        .dialect(Dialect::DollarP);
    let block = Fragment::finalized(&inner).unwrap();

    let built = select(["*"])
        .prefix(block)
        .where_(Expr::new("c = ?", [2]))
        .dialect(Dialect::Dollar)
        .to_sql()
        .unwrap();
    assert_eq!(built.sql, "SELECT a FROM t WHERE b = $p1 SELECT * WHERE c = $2");
    assert_eq!(built.args, vec![Value::Int32(1), Value::Int32(2)]);
}

#[test]
fn test_pre_finalized_block_in_question_dialect() {
    let inner = select(["a"]).from("t").where_(Expr::new("b = ? AND c ?? d", [1]));
    let block = Fragment::finalized(&inner).unwrap();

    let built = select(["*"])
        .from("u")
        .where_(block)
        .where_(Expr::new("e = ?", [2]))
        .to_sql()
        .unwrap();
    assert_eq!(
        built.sql,
        "SELECT * FROM u WHERE SELECT a FROM t WHERE b = ? AND c ?? d AND e = ?"
    );
    assert_eq!(built.args.len(), 2);
    assert_eq!(built.placeholder_count(), 2);
}

#[test]
fn test_pre_finalized_block_in_typed_output() {
    let inner = select(["a"])
        .from("t")
        .where_(Expr::new("b = ?", [1i64]))
        .dialect(Dialect::DollarP);
    let block = Fragment::finalized(&inner).unwrap();

    let typed = select(["*"])
        .prefix(block)
        .where_(Expr::new("c = ?", ["x"]))
        .to_typed_sql()
        .unwrap();
    assert_eq!(
        typed.sql,
        "DECLARE $p1 AS Int64;\nDECLARE $p2 AS Utf8;\nSELECT a FROM t WHERE b = $p1 SELECT * WHERE c = $p2"
    );
    let names: Vec<_> = typed.params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["$p1", "$p2"]);
}

#[test]
fn test_update_full_typed() {
    let qb = update("")
        .prefix(Expr::new("WITH prefix AS ?", [0i64]))
        .table("a")
        .set("b", Expr::new("? + 1", [1i64]))
        .set_map([("c", 2i64)])
        .set("c1", case_on("status").when("1", "2").when("2", "1"))
        .set(
            "c2",
            case()
                .when("a = 2", Expr::new("?", ["foo"]))
                .when("a = 3", Expr::new("?", ["bar"])),
        )
        .set("c3", select(["a"]).from("b"))
        .where_(Expr::new("d = ?", [3i64]))
        .order_by(["e"])
        .limit(4)
        .offset(5)
        .suffix(Expr::new("RETURNING ?", [6i64]));

    let typed = qb.to_typed_sql().unwrap();
    assert_eq!(
        typed.sql,
        "DECLARE $p1 AS Int64;\nDECLARE $p2 AS Int64;\nDECLARE $p3 AS Int64;\n\
         DECLARE $p4 AS Utf8;\nDECLARE $p5 AS Utf8;\nDECLARE $p6 AS Int64;\nDECLARE $p7 AS Int64;\n\
         WITH prefix AS $p1 \
         UPDATE a SET b = $p2 + 1, c = $p3, \
         c1 = CASE status WHEN 1 THEN 2 WHEN 2 THEN 1 END, \
         c2 = CASE WHEN a = 2 THEN $p4 WHEN a = 3 THEN $p5 END, \
         c3 = (SELECT a FROM b) \
         WHERE d = $p6 \
         ORDER BY e LIMIT 4 OFFSET 5 \
         RETURNING $p7"
    );

    let names: Vec<&str> = typed.params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["$p1", "$p2", "$p3", "$p4", "$p5", "$p6", "$p7"]);
    assert_eq!(typed.params[3].value, TypedValue::Utf8("foo".into()));
    assert_eq!(typed.params[6].value, TypedValue::Int64(6));
}

#[test]
fn test_update_placeholders() {
    let qb = update("test").set_map([("y", 2), ("x", 1)]);
    assert_eq!(qb.to_sql().unwrap().sql, "UPDATE test SET x = ?, y = ?");
    assert_eq!(
        qb.dialect(Dialect::Dollar).to_sql().unwrap().sql,
        "UPDATE test SET x = $1, y = $2"
    );
}

#[test]
fn test_typed_update_needs_set() {
    assert!(update("x").to_typed_sql().is_err());
}

#[test]
fn test_typed_optional_and_list() {
    let none: Option<i64> = None;
    let typed = delete("t")
        .where_(Equal::new().with("ids", Value::list([1, 2])))
        .where_(Expr::new("deleted_at = ?", [Value::from(none)]))
        .to_typed_sql()
        .unwrap();
    assert_eq!(
        typed.sql,
        "DECLARE $p1 AS List<Int32>;\nDECLARE $p2 AS Optional<Int64>;\n\
         DELETE FROM t WHERE ids IN $p1 AND deleted_at = $p2"
    );
    assert_eq!(
        typed.params[1].value.yql_type(),
        YqlType::Optional(Box::new(YqlType::Int64))
    );
}

#[test]
fn test_typed_rejects_untyped_null() {
    let err = insert("t")
        .values([Value::Null])
        .to_typed_sql()
        .unwrap_err();
    assert!(err.to_string().starts_with("unsupported type `null`"));
}

#[test]
fn test_case_in_select_columns() {
    let built = SelectBuilder::default()
        .column(
            case_on("number")
                .when("1", "one")
                .when("2", "two")
                .else_(Expr::new("?", ["big number"])),
        )
        .from("table")
        .dialect(Dialect::DollarP)
        .to_sql()
        .unwrap();
    assert_eq!(
        built.sql,
        "SELECT CASE number WHEN 1 THEN one WHEN 2 THEN two ELSE $p1 END FROM table"
    );
    assert_eq!(built.args, vec![Value::from("big number")]);
}

#[test]
fn test_case_with_predicates() {
    let built = SelectBuilder::default()
        .column(
            case()
                .when(Equal::new().with("x", 0), "x is zero")
                .when(
                    Greater::new().with("x", 1),
                    Expr::new("CONCAT('x is greater than ', ?)", [2]),
                ),
        )
        .from("table")
        .dialect(Dialect::DollarP)
        .to_sql()
        .unwrap();
    assert_eq!(
        built.sql,
        "SELECT CASE WHEN x = $p1 THEN x is zero WHEN x > $p2 THEN CONCAT('x is greater than ', $p3) END FROM table"
    );
    assert_eq!(built.args.len(), 3);
}

#[test]
fn test_multiple_cases_number_in_order() {
    let first = case_on("n").when(Expr::new("?", [1]), "one");
    let second = case_on("m").when(Expr::new("?", [2]), "two");
    let built = SelectBuilder::default()
        .column(alias(first, "a"))
        .column(alias(second, "b"))
        .from("t")
        .dialect(Dialect::Dollar)
        .to_sql()
        .unwrap();
    assert_eq!(
        built.sql,
        "SELECT (CASE n WHEN $1 THEN one END) AS a, (CASE m WHEN $2 THEN two END) AS b FROM t"
    );
}

#[test]
fn test_case_error_propagates() {
    let err = SelectBuilder::default()
        .column(case_on("x"))
        .from("t")
        .to_sql()
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "case expression must contain at least one WHEN clause"
    );
}

#[test]
fn test_render_is_idempotent() {
    let qb = select(["a"])
        .from("t")
        .where_(NotEqual::new().with("b", vec![1, 2]))
        .dialect(Dialect::Dollar);
    assert_eq!(qb.to_sql().unwrap(), qb.to_sql().unwrap());
}

#[test]
fn test_placeholder_count_matches_args() {
    let qb = insert("t")
        .columns(["a", "b"])
        .values([1, 2])
        .values([SetValue::from(Expr::new("? + 1", [3])), SetValue::from(4)]);
    let raw = qb.render_raw().unwrap();
    assert_eq!(raw.placeholder_count(), raw.args.len());
    assert_eq!(raw.sql, "INSERT INTO t (a,b) VALUES (?,?),(? + 1,?)");
}
