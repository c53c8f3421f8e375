use std::sync::Arc;

use query_engine_criteria::criteria::predicate::contains_pattern;
use query_engine_criteria::criteria::select::{translate_field, translate_scalar, TargetError};
use query_engine_criteria::criteria::{
    ComparisonOperator, CriteriaDefinition, CriteriaSpec, ParameterBag, QualifiedField,
    Resolution, Sanitizer, Scalar,
};
use query_engine_sql::sql::{ast, convert::select_to_sql, helpers, string};
use serde_json::json;
use similar_asserts::assert_eq;

fn users() -> ast::Select {
    helpers::star_select(ast::From::Table {
        reference: helpers::db_table(Some("public".to_string()), "users".to_string()),
        alias: helpers::make_table_alias("users".to_string()),
    })
}

fn users_spec() -> CriteriaSpec {
    CriteriaSpec::builder()
        .field("status")
        .like("name")
        .field("age")
        .build()
        .unwrap()
}

fn bag(value: serde_json::Value) -> ParameterBag {
    ParameterBag::try_from(value).unwrap()
}

fn string_params(sql: &string::SQL) -> Vec<&str> {
    sql.params
        .iter()
        .map(|string::Param::String(s)| s.as_str())
        .collect()
}

#[test]
fn it_filters_by_membership_and_pattern() {
    let definition = CriteriaDefinition::<ast::Select>::builder(users_spec())
        .build()
        .unwrap();
    let mut select = users();
    definition
        .apply(
            &bag(json!({"status": [1, 3], "name": "Reishou", "age": 30})),
            &mut select,
        )
        .unwrap();

    let sql = select_to_sql(&select);
    assert_eq!(
        sql.sql,
        "SELECT * FROM \"public\".\"users\" AS \"users\" WHERE (((\"users\".\"status\" IN (1, 3)) AND (\"users\".\"name\" ILIKE $1)) AND (\"users\".\"age\" IN (30)))"
    );
    assert_eq!(string_params(&sql), vec!["%Reishou%"]);
}

#[test]
fn it_skips_null_and_empty_values_but_keeps_zero() {
    let definition = CriteriaDefinition::<ast::Select>::builder(users_spec())
        .build()
        .unwrap();
    let mut select = users();
    definition
        .apply(
            &bag(json!({"status": null, "name": [], "age": 0})),
            &mut select,
        )
        .unwrap();

    insta::assert_snapshot!(
        select_to_sql(&select).sql,
        @r#"SELECT * FROM "public"."users" AS "users" WHERE ("users"."age" IN (0))"#
    );
}

#[test]
fn it_leaves_the_query_alone_without_usable_parameters() {
    let definition = CriteriaDefinition::<ast::Select>::builder(users_spec())
        .build()
        .unwrap();
    let mut select = users();
    let applied = definition
        .apply(&bag(json!({"unknown": 1, "status": null})), &mut select)
        .unwrap();

    assert_eq!(select, users());
    assert_eq!(applied.resolution("unknown"), Some(&Resolution::Ignored));
    assert_eq!(applied.resolution("status"), None);
}

#[test]
fn it_applies_parameters_in_the_order_they_were_supplied() {
    let definition = CriteriaDefinition::<ast::Select>::builder(users_spec())
        .rule("min_age", |target, value| {
            for scalar in value.scalars() {
                target.where_("age", ComparisonOperator::GreaterThanOrEqualTo, scalar)?;
            }
            Ok(())
        })
        .build()
        .unwrap();
    let mut select = users();
    let applied = definition
        .apply(&bag(json!({"min_age": 18, "status": 2})), &mut select)
        .unwrap();

    assert_eq!(
        select_to_sql(&select).sql,
        "SELECT * FROM \"public\".\"users\" AS \"users\" WHERE ((\"users\".\"age\" >= 18) AND (\"users\".\"status\" IN (2)))"
    );
    assert_eq!(
        applied.fields,
        vec![
            (
                "min_age".to_string(),
                Resolution::Custom("criteriaMinAge".to_string())
            ),
            (
                "status".to_string(),
                Resolution::Generic(query_engine_criteria::criteria::Operator::ExactOrIn)
            ),
        ]
    );
}

fn ilike(field: QualifiedField, pattern: &Scalar) -> ast::Expression {
    ast::Expression::BinaryOperation {
        left: Box::new(translate_field(field)),
        operator: ast::BinaryOperator::CaseInsensitiveLike,
        right: Box::new(ast::Expression::Value(translate_scalar(pattern.clone()))),
    }
}

#[test]
fn it_lets_custom_rules_build_their_own_predicates() {
    let definition = CriteriaDefinition::<ast::Select>::builder(users_spec())
        .rule("search", |target, value| {
            let Some(term) = value.scalars().into_iter().next() else {
                return Ok(());
            };
            let pattern = Scalar::String(contains_pattern(&term.to_string()));
            let either = helpers::or_expr(
                ilike(target.qualify("name"), &pattern),
                ilike(target.qualify("email"), &pattern),
            );
            let select = target.builder();
            let ast::Where(current) = select.where_.clone();
            select.where_ = ast::Where(helpers::and_expr(current, either));
            Ok(())
        })
        .build()
        .unwrap();
    let mut select = users();
    definition
        .apply(&bag(json!({"status": 1, "search": "rei"})), &mut select)
        .unwrap();

    let sql = select_to_sql(&select);
    assert_eq!(
        sql.sql,
        "SELECT * FROM \"public\".\"users\" AS \"users\" WHERE ((\"users\".\"status\" IN (1)) AND ((\"users\".\"name\" ILIKE $1) OR (\"users\".\"email\" ILIKE $2)))"
    );
    assert_eq!(string_params(&sql), vec!["%rei%", "%rei%"]);
}

#[test]
fn it_matches_nothing_when_a_rule_keeps_no_operands() {
    let definition = CriteriaDefinition::<ast::Select>::builder(users_spec())
        .rule("ids", |target, value| {
            let ids = value
                .scalars()
                .into_iter()
                .filter(|scalar| matches!(scalar, Scalar::Int(_)))
                .collect();
            target.where_in("id", ids)
        })
        .build()
        .unwrap();
    let mut select = users();
    definition
        .apply(&bag(json!({"ids": ["x"]})), &mut select)
        .unwrap();

    assert_eq!(
        select_to_sql(&select).sql,
        "SELECT * FROM \"public\".\"users\" AS \"users\" WHERE false"
    );
}

#[test]
fn it_escapes_pattern_metacharacters() {
    let definition = CriteriaDefinition::<ast::Select>::builder(users_spec())
        .build()
        .unwrap();
    let mut select = users();
    definition
        .apply(&bag(json!({"name": "50%_off"})), &mut select)
        .unwrap();

    assert_eq!(string_params(&select_to_sql(&select)), vec!["%50\\%\\_off%"]);
}

#[test]
fn it_narrows_parameters_with_a_custom_sanitizer() {
    let definition = CriteriaDefinition::<ast::Select>::builder(users_spec())
        .sanitizer(Sanitizer::new(|field, _| field != "status"))
        .build()
        .unwrap();
    let mut select = users();
    definition
        .apply(&bag(json!({"status": 1, "age": 2})), &mut select)
        .unwrap();

    assert_eq!(
        select_to_sql(&select).sql,
        "SELECT * FROM \"public\".\"users\" AS \"users\" WHERE (\"users\".\"age\" IN (2))"
    );
}

#[test]
fn it_qualifies_fields_with_the_subquery_alias() {
    let definition = CriteriaDefinition::<ast::Select>::builder(users_spec())
        .build()
        .unwrap();
    let mut select = helpers::star_select(ast::From::Select {
        select: Box::new(users()),
        alias: helpers::make_table_alias("u".to_string()),
    });
    definition
        .apply(&bag(json!({"status": 1})), &mut select)
        .unwrap();

    assert_eq!(
        select_to_sql(&select).sql,
        "SELECT * FROM (SELECT * FROM \"public\".\"users\" AS \"users\") AS \"u\" WHERE (\"u\".\"status\" IN (1))"
    );
}

#[test]
fn it_fails_without_a_from_clause() {
    let definition = CriteriaDefinition::<ast::Select>::builder(users_spec())
        .build()
        .unwrap();
    let mut select = helpers::simple_select(vec![]);
    let err = definition
        .apply(&bag(json!({"status": 1})), &mut select)
        .unwrap_err();

    assert_eq!(err, TargetError::MissingFrom);
    assert_eq!(select, helpers::simple_select(vec![]));
}

#[test]
fn it_propagates_custom_rule_errors() {
    let definition = CriteriaDefinition::<ast::Select>::builder(users_spec())
        .rule("status", |_, _| Err(TargetError::MissingFrom))
        .build()
        .unwrap();
    let mut select = users();
    let err = definition
        .apply(&bag(json!({"age": 1, "status": 1, "name": "x"})), &mut select)
        .unwrap_err();

    assert_eq!(err, TargetError::MissingFrom);
    assert_eq!(
        select_to_sql(&select).sql,
        "SELECT * FROM \"public\".\"users\" AS \"users\" WHERE (\"users\".\"age\" IN (1))"
    );
}

#[test]
fn it_shares_one_definition_between_threads() {
    let definition = Arc::new(
        CriteriaDefinition::<ast::Select>::builder(users_spec())
            .build()
            .unwrap(),
    );

    let rendered: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|status| {
                let definition = Arc::clone(&definition);
                scope.spawn(move || {
                    let mut select = users();
                    definition
                        .apply(&bag(json!({ "status": status })), &mut select)
                        .unwrap();
                    select_to_sql(&select).sql
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    for (status, sql) in rendered.iter().enumerate() {
        assert!(sql.ends_with(&format!("WHERE (\"users\".\"status\" IN ({status}))")));
    }
}
