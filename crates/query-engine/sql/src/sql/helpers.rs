//! Helpers for building sql::ast types in certain shapes and patterns.

use super::ast::*;

// Empty clauses //

/// An empty `WHERE` clause.
pub fn empty_where() -> Expression {
    true_expr()
}

/// A `true` expression.
pub fn true_expr() -> Expression {
    Expression::Value(Value::Bool(true))
}

/// A `false` expression.
pub fn false_expr() -> Expression {
    Expression::Value(Value::Bool(false))
}

// Expressions //

/// Conjunction of two expressions. A literal `true` on either side is dropped.
pub fn and_expr(left: Expression, right: Expression) -> Expression {
    if left == true_expr() {
        right
    } else if right == true_expr() {
        left
    } else {
        Expression::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

/// Disjunction of two expressions. A literal `false` on either side is dropped.
pub fn or_expr(left: Expression, right: Expression) -> Expression {
    if left == false_expr() {
        right
    } else if right == false_expr() {
        left
    } else {
        Expression::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

// Aliasing //

/// Create table aliases using this function so we build everything in one place.
pub fn make_table_alias(name: String) -> TableAlias {
    TableAlias { name }
}

/// Create column aliases using this function so we build everything in one place.
pub fn make_column_alias(name: String) -> ColumnAlias {
    ColumnAlias { name }
}

/// Reference a database table, optionally qualified by its schema.
pub fn db_table(schema: Option<String>, table: String) -> TableReference {
    TableReference::DBTable {
        schema: schema.map(SchemaName),
        table: TableName(table),
    }
}

/// Generate a column expression referring to a column of an aliased table.
pub fn make_column(table: &TableAlias, name: String) -> Expression {
    Expression::ColumnReference(ColumnReference::TableColumn {
        table: TableReference::AliasedTable(table.clone()),
        name: ColumnName(name),
    })
}

// SELECTs //

/// Build a simple select with a select list and the rest are empty.
pub fn simple_select(select_list: Vec<(ColumnAlias, Expression)>) -> Select {
    Select {
        select_list: SelectList::SelectList(select_list),
        from: None,
        joins: vec![],
        where_: Where(empty_where()),
    }
}

/// Build a simple select *
pub fn star_select(from: From) -> Select {
    Select {
        select_list: SelectList::SelectStar,
        from: Some(from),
        joins: vec![],
        where_: Where(empty_where()),
    }
}
