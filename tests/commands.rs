mod common;

use common::{command_names, parse_cleanly, parse_cleanly_with, preview};
use esql_parser::ast::{
    CommandKind, Expression, IdentifierKind, LiteralKind, NullsOrder, SortDirection,
};

#[test]
fn source_commands() {
    let query = parse_cleanly("FROM logs-*, archive");
    assert_eq!(command_names(&query), ["FROM"]);

    let query = parse_cleanly("ROW a = 1, b = \"two\", c");
    let CommandKind::Row(fields) = &query.commands[0].kind else {
        panic!("expected ROW");
    };
    assert_eq!(fields.len(), 3);
    assert_eq!(fields[0].name.as_ref().map(|n| n.name()).as_deref(), Some("a"));
    assert!(fields[2].name.is_none());

    assert!(matches!(parse_cleanly("SHOW INFO").commands[0].kind, CommandKind::Show));
    assert!(matches!(parse_cleanly("meta functions").commands[0].kind, CommandKind::Meta));
}

#[test]
fn full_pipeline() {
    let query = parse_cleanly(
        "FROM employees \
         | WHERE salary > 1000 AND dept IN (\"eng\", \"ops\") \
         | EVAL bonus = salary * 0.1 \
         | STATS avg_bonus = avg(bonus) BY dept \
         | SORT avg_bonus DESC NULLS LAST \
         | KEEP dept, avg_bonus \
         | LIMIT 5",
    );
    assert_eq!(
        command_names(&query),
        ["FROM", "WHERE", "EVAL", "STATS", "SORT", "KEEP", "LIMIT"]
    );
    assert!(!query.has_incomplete_commands());

    let CommandKind::Stats(stats) = &query.commands[3].kind else {
        panic!("expected STATS");
    };
    assert_eq!(stats.aggregates.len(), 1);
    assert_eq!(stats.grouping.len(), 1);

    let CommandKind::Sort(orders) = &query.commands[4].kind else {
        panic!("expected SORT");
    };
    assert_eq!(orders[0].direction.as_ref().map(|d| d.node), Some(SortDirection::Desc));
    assert_eq!(orders[0].nulls.as_ref().map(|n| n.node), Some(NullsOrder::Last));

    let CommandKind::Limit(Some(limit)) = &query.commands[6].kind else {
        panic!("expected LIMIT");
    };
    assert_eq!(limit.kind, LiteralKind::Integer);
    assert_eq!(limit.text, "5");
}

#[test]
fn keep_drop_patterns() {
    let query = parse_cleanly("FROM a | KEEP host.*, `odd name` | DROP *_tmp");
    let CommandKind::Keep(columns) = &query.commands[1].kind else {
        panic!("expected KEEP");
    };
    assert!(columns[0].is_pattern());
    assert_eq!(columns[1].parts[0].kind, IdentifierKind::Quoted);
    assert_eq!(columns[1].name(), "odd name");

    let CommandKind::Drop(columns) = &query.commands[2].kind else {
        panic!("expected DROP");
    };
    assert_eq!(columns[0].name(), "*_tmp");
}

#[test]
fn rename_clauses() {
    let query = parse_cleanly("FROM a | RENAME old AS new, x.y AS z");
    let CommandKind::Rename(clauses) = &query.commands[1].kind else {
        panic!("expected RENAME");
    };
    assert_eq!(clauses.len(), 2);
    assert_eq!(clauses[1].old.name(), "x.y");
    assert_eq!(clauses[1].new.name(), "z");
}

#[test]
fn grok_and_dissect() {
    let query = parse_cleanly("FROM a | GROK msg \"%{IP:ip} %{WORD:verb}\" | DISSECT msg \"%{a}-%{b}\"");
    let CommandKind::Grok(grok) = &query.commands[1].kind else {
        panic!("expected GROK");
    };
    assert!(matches!(grok.input, Some(Expression::Column(_))));
    assert_eq!(
        grok.pattern.as_ref().and_then(|p| p.string_value()).as_deref(),
        Some("%{IP:ip} %{WORD:verb}")
    );
    let CommandKind::Dissect(dissect) = &query.commands[2].kind else {
        panic!("expected DISSECT");
    };
    assert!(dissect.options.is_empty());
}

#[test]
fn mv_expand_column() {
    let query = parse_cleanly("FROM a | MV_EXPAND tags.values");
    let CommandKind::MvExpand(Some(column)) = &query.commands[1].kind else {
        panic!("expected MV_EXPAND");
    };
    assert_eq!(column.name(), "tags.values");
}

#[test]
fn enrich_without_clauses() {
    let query = parse_cleanly("FROM a | ENRICH languages");
    let CommandKind::Enrich(enrich) = &query.commands[1].kind else {
        panic!("expected ENRICH");
    };
    assert_eq!(enrich.policy.as_ref().map(|p| p.name.as_str()), Some("languages"));
    assert!(enrich.on.is_none());
    assert!(enrich.with.is_empty());
}

#[test]
fn explain_nested_query() {
    let query = parse_cleanly("EXPLAIN [FROM a | WHERE b | LIMIT 1] | LIMIT 2");
    assert_eq!(command_names(&query), ["EXPLAIN", "LIMIT"]);
    let CommandKind::Explain(explain) = &query.commands[0].kind else {
        panic!("expected EXPLAIN");
    };
    assert_eq!(command_names(&explain.query), ["FROM", "WHERE", "LIMIT"]);
}

#[test]
fn preview_commands() {
    let query = parse_cleanly_with(
        "METRICS k8s, remote:pods max(cpu) BY cluster | INLINESTATS c = count(*) | LOOKUP t ON id",
        &preview(),
    );
    assert_eq!(command_names(&query), ["METRICS", "INLINESTATS", "LOOKUP"]);

    let CommandKind::Metrics(metrics) = &query.commands[0].kind else {
        panic!("expected METRICS");
    };
    assert_eq!(metrics.sources.len(), 2);
    assert_eq!(metrics.sources[1].cluster.as_deref(), Some("remote"));
    assert_eq!(metrics.aggregates.len(), 1);
    assert_eq!(metrics.grouping.len(), 1);
}

#[test]
fn identifier_params_in_keep() {
    let query = parse_cleanly_with("FROM a | KEEP ?field, b", &preview());
    let CommandKind::Keep(columns) = &query.commands[1].kind else {
        panic!("expected KEEP");
    };
    assert_eq!(columns[0].parts[0].kind, IdentifierKind::Parameter);
}

#[test]
fn keywords_are_case_insensitive() {
    let query = parse_cleanly("from logs | where a is not null | sort a asc");
    assert_eq!(command_names(&query), ["FROM", "WHERE", "SORT"]);
    assert!(matches!(
        &query.commands[1].kind,
        CommandKind::Where(Some(Expression::IsNull(_, true, _)))
    ));
}
