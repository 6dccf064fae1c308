//! Filter compiler that renders a parsed expression tree into the search
//! engine's filter-string syntax.
//!
//! The engine understands `AND`, `OR`, `NOT`, parentheses, the comparison
//! operators `= < > <= >=`, double-quoted string literals with
//! backslash-escaped embedded quotes, bare `true`/`false`, and bare decimal
//! integers (millisecond timestamps). The caller is expected to `AND` the
//! produced string with any additional clauses (access control, structured
//! filters from a request body) before handing it to the executor.

use crate::ast::{Filter, FilterExpression, FilterValue};

/// Render a filter expression tree into the target filter syntax.
///
/// `OR` groups are always parenthesized so the grouping survives regardless
/// of the target engine's own precedence rules; `AND` chains are left bare.
/// `NOT` always parenthesizes its operand. The parser guarantees the tree is
/// well formed, so this is a total function with no failure path.
pub fn compile_expression(expression: &FilterExpression) -> String {
    match expression {
        FilterExpression::Leaf(filter) => compile_leaf(filter),
        FilterExpression::And(left, right) => {
            format!("{} AND {}", compile_expression(left), compile_expression(right))
        }
        FilterExpression::Or(left, right) => {
            format!("({} OR {})", compile_expression(left), compile_expression(right))
        }
        FilterExpression::Not(operand) => {
            format!("NOT ({})", compile_expression(operand))
        }
    }
}

/// Render a flat filter list joined with `AND`.
///
/// Compatibility entry point for callers that still pass structured filters
/// without boolean structure. Returns an empty string for an empty list.
pub fn compile_filters(filters: &[Filter]) -> String {
    filters.iter().map(compile_leaf).collect::<Vec<_>>().join(" AND ")
}

/// Render a single `{field, operator, value}` leaf.
pub fn compile_leaf(filter: &Filter) -> String {
    format!(
        "{} {} {}",
        filter.field.as_str(),
        filter.operator.as_str(),
        render_value(&filter.value)
    )
}

fn render_value(value: &FilterValue) -> String {
    match value {
        FilterValue::String(text) => format!("\"{}\"", text.replace('"', "\\\"")),
        FilterValue::Number(number) => number.to_string(),
        FilterValue::Bool(flag) => flag.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{FilterField, FilterOperator};
    use crate::parser::parse;

    fn string_filter(field: FilterField, value: &str) -> Filter {
        Filter {
            field,
            operator: FilterOperator::Eq,
            value: FilterValue::String(value.to_string()),
        }
    }

    #[test]
    fn test_leaf_rendering() {
        assert_eq!(
            compile_leaf(&string_filter(FilterField::From, "john")),
            r#"from = "john""#
        );
        assert_eq!(
            compile_leaf(&Filter {
                field: FilterField::HasAttachments,
                operator: FilterOperator::Eq,
                value: FilterValue::Bool(true),
            }),
            "hasAttachments = true"
        );
        assert_eq!(
            compile_leaf(&Filter {
                field: FilterField::Timestamp,
                operator: FilterOperator::Lt,
                value: FilterValue::Number(1_704_067_200_000),
            }),
            "timestamp < 1704067200000"
        );
    }

    #[test]
    fn test_embedded_quotes_are_escaped() {
        assert_eq!(
            compile_leaf(&string_filter(FilterField::Subject, r#"say "hello""#)),
            r#"subject = "say \"hello\"""#
        );
    }

    #[test]
    fn test_and_is_not_parenthesized() {
        let expression = FilterExpression::And(
            Box::new(FilterExpression::Leaf(string_filter(FilterField::From, "a"))),
            Box::new(FilterExpression::Leaf(string_filter(FilterField::To, "b"))),
        );
        assert_eq!(compile_expression(&expression), r#"from = "a" AND to = "b""#);
    }

    #[test]
    fn test_or_is_always_parenthesized() {
        let inner = FilterExpression::Or(
            Box::new(FilterExpression::Leaf(string_filter(FilterField::From, "a"))),
            Box::new(FilterExpression::Leaf(string_filter(FilterField::From, "b"))),
        );
        assert_eq!(
            compile_expression(&inner),
            r#"(from = "a" OR from = "b")"#
        );

        // 嵌套位置同样加括号
        let nested = FilterExpression::And(
            Box::new(inner),
            Box::new(FilterExpression::Leaf(string_filter(FilterField::To, "c"))),
        );
        assert_eq!(
            compile_expression(&nested),
            r#"(from = "a" OR from = "b") AND to = "c""#
        );
    }

    #[test]
    fn test_not_is_always_parenthesized() {
        let expression = FilterExpression::Not(Box::new(FilterExpression::Leaf(
            string_filter(FilterField::From, "spam"),
        )));
        assert_eq!(compile_expression(&expression), r#"NOT (from = "spam")"#);
    }

    #[test]
    fn test_flat_list() {
        assert_eq!(compile_filters(&[]), "");

        let first = string_filter(FilterField::From, "john");
        let second = Filter {
            field: FilterField::HasAttachments,
            operator: FilterOperator::Eq,
            value: FilterValue::Bool(true),
        };
        let joined = compile_filters(&[first.clone(), second.clone()]);
        assert_eq!(
            joined,
            format!("{} AND {}", compile_leaf(&first), compile_leaf(&second))
        );
    }

    #[test]
    fn test_parse_and_compile_examples() {
        let cases = [
            ("from:john OR from:jane", r#"(from = "john" OR from = "jane")"#),
            ("NOT from:spam", r#"NOT (from = "spam")"#),
            (
                "(from:john OR to:john) AND has:attachment",
                r#"(from = "john" OR to = "john") AND hasAttachments = true"#,
            ),
            (
                "from:john before:2024-01-01",
                r#"from = "john" AND timestamp < 1704067200000"#,
            ),
        ];
        for (input, expected) in cases {
            let parsed = parse(input);
            let expression = parsed.expression.as_ref().unwrap();
            assert_eq!(compile_expression(expression), expected, "input {:?}", input);
        }
    }
}
