use std::collections::HashMap;

use cqfill_polyfill::{
    evaluate_container_condition, transpile_style_sheet, CompareOp, ContainerCondition, Error,
    LengthUnit, QueryContext, SizeFeature, TranspileConfig, Transpiler, Value,
};
use test_case::test_case;

fn compare(op: CompareOp, left: ContainerCondition, right: ContainerCondition) -> ContainerCondition {
    ContainerCondition::Compare {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn px(value: f32) -> ContainerCondition {
    ContainerCondition::Literal(Value::Dimension {
        value,
        unit: LengthUnit::Px,
    })
}

#[test]
fn basic_min_width() {
    let _ = simple_logger::SimpleLogger::new().init();

    let result = transpile_style_sheet(
        "@container (min-width: 200px) { .a { color: red; } }",
        None,
    );

    assert_eq!(
        result.source,
        "@media all { .a:where([data-cq-match~=\"cq-0-0\"]) { color: red; } }"
    );

    assert_eq!(result.descriptors.len(), 1);
    let descriptor = &result.descriptors[0];
    assert_eq!(descriptor.uid, "cq-0-0");
    assert_eq!(descriptor.selector.as_deref(), Some(".a"));
    assert_eq!(descriptor.parent, None);
    assert_eq!(descriptor.rule.name, None);
    assert_eq!(
        descriptor.rule.condition,
        compare(
            CompareOp::Ge,
            ContainerCondition::Feature(SizeFeature::Width),
            px(200.0)
        )
    );
    assert!(descriptor.rule.features.contains(&SizeFeature::Width));
}

#[test]
fn range_form() {
    let result = transpile_style_sheet(
        "@container (100px < width <= 400px) { .a { color: red; } }",
        None,
    );

    assert_eq!(result.descriptors.len(), 1);
    assert_eq!(
        result.descriptors[0].rule.condition,
        ContainerCondition::And(
            Box::new(compare(
                CompareOp::Lt,
                px(100.0),
                ContainerCondition::Feature(SizeFeature::Width)
            )),
            Box::new(compare(
                CompareOp::Le,
                ContainerCondition::Feature(SizeFeature::Width),
                px(400.0)
            )),
        )
    );
}

#[test]
fn named_container() {
    let result = transpile_style_sheet(
        "@container card (min-width: 200px) { .a { color: red; } }",
        None,
    );

    assert_eq!(result.descriptors[0].rule.name.as_deref(), Some("card"));
}

#[test]
fn container_shorthand_splits() {
    let result = transpile_style_sheet(".c { container: card / size; }", None);

    assert_eq!(
        result.source,
        ".c { --cq-container-name-0: card; --cq-container-type-0: size; }"
    );
}

#[test]
fn css_wide_keyword_is_prefixed() {
    let result = transpile_style_sheet(".c { container-type: inherit; }", None);

    assert_eq!(result.source, ".c { --cq-container-type-0: cq-inherit; }");
}

#[test]
fn container_name_none_is_prefixed() {
    let result = transpile_style_sheet(".c { container-name: none; }", None);

    assert_eq!(result.source, ".c { --cq-container-name-0: cq-none; }");
}

#[test]
fn invalid_container_declaration_is_left_alone() {
    let result = transpile_style_sheet(".c { container-type: solid; }", None);

    assert_eq!(result.source, ".c { container-type: solid; }");
}

#[test_case("50cqw", "calc(50 * var(--cq-w-0))")]
#[test_case("50cqh", "calc(50 * var(--cq-h-0))")]
#[test_case("50cqi", "calc(50 * var(--cq-i-0))")]
#[test_case("50cqb", "calc(50 * var(--cq-b-0))")]
#[test_case("50cqmin", "calc(50 * min(var(--cq-i-0), var(--cq-b-0)))")]
#[test_case("50cqmax", "calc(50 * max(var(--cq-i-0), var(--cq-b-0)))")]
#[test_case("1.5cqw", "calc(1.5 * var(--cq-w-0))")]
fn container_units_in_declarations(input: &str, expected: &str) {
    let result = transpile_style_sheet(&format!(".a {{ width: {input}; }}"), None);

    assert_eq!(result.source, format!(".a {{ width: {expected}; }}"));
}

#[test]
fn container_units_inside_functions() {
    let result = transpile_style_sheet(".a { width: max(10px, 50cqw); }", None);

    assert_eq!(
        result.source,
        ".a { width: max(10px, calc(50 * var(--cq-w-0))); }"
    );
}

#[test]
fn important_flag_survives() {
    let result = transpile_style_sheet(".a { width: 50cqw !important; }", None);

    assert_eq!(
        result.source,
        ".a { width: calc(50 * var(--cq-w-0)) !important; }"
    );
}

#[test]
fn malformed_declaration_recovery() {
    let result = transpile_style_sheet(".x { color: ; } .y { color: blue; }", None);

    assert_eq!(result.source, ".x {}\n.y { color: blue; }");
}

#[test]
fn stylesheet_without_queries_is_preserved() {
    let result = transpile_style_sheet(".a { color: red; }", None);

    assert_eq!(result.source, ".a { color: red; }");
    assert!(result.descriptors.is_empty());
    assert!(result.diagnostics.is_empty());
}

#[test]
fn descriptor_uids_are_unique() {
    let result = transpile_style_sheet(
        "@container (width > 100px) { .a { color: red; } }\
         @container (width > 200px) { .b { color: blue; } }",
        None,
    );

    assert_eq!(result.descriptors.len(), 2);
    assert_ne!(result.descriptors[0].uid, result.descriptors[1].uid);
    assert!(result.source.contains(&result.descriptors[0].uid));
    assert!(result.source.contains(&result.descriptors[1].uid));
}

#[test]
fn nested_containers_link_their_parent() {
    let result = transpile_style_sheet(
        "@container (width > 100px) { @container (height > 50px) { .a { color: red; } } }",
        None,
    );

    assert_eq!(result.descriptors.len(), 2);
    assert_eq!(result.descriptors[0].parent, None);
    assert_eq!(result.descriptors[1].parent, Some(0));
    // the style rule belongs to the inner descriptor
    assert_eq!(result.descriptors[0].selector, None);
    assert_eq!(result.descriptors[1].selector.as_deref(), Some(".a"));
    assert_eq!(
        result.source,
        format!(
            "@media all {{ @media all {{ .a:where([data-cq-match~=\"{}\"]) {{ color: red; }} }} }}",
            result.descriptors[1].uid
        )
    );
}

#[test]
fn container_inside_media_is_found() {
    let result = transpile_style_sheet(
        "@media screen { @container (width > 100px) { .a { color: red; } } }",
        None,
    );

    assert_eq!(result.descriptors.len(), 1);
    assert!(result.source.starts_with("@media screen { @media all {"));
}

#[test]
fn pseudo_element_stays_outside_the_attribute_check() {
    let result = transpile_style_sheet(
        "@container (min-width: 200px) { .a::before { content: \"x\"; } }",
        None,
    );

    let descriptor = &result.descriptors[0];
    assert_eq!(descriptor.selector.as_deref(), Some(".a"));
    assert!(result
        .source
        .contains(".a:where([data-cq-match~=\"cq-0-0\"])::before"));
}

#[test]
fn legacy_pseudo_element_partitions() {
    let result = transpile_style_sheet(
        "@container (min-width: 200px) { .a:before { content: \"x\"; } }",
        None,
    );

    assert!(result
        .source
        .contains(".a:where([data-cq-match~=\"cq-0-0\"]):before"));
}

#[test]
fn selector_list_components_are_collected_and_deduplicated() {
    let result = transpile_style_sheet(
        "@container (min-width: 200px) { .a, .b { color: red; } .a:hover { color: blue; } }",
        None,
    );

    let descriptor = &result.descriptors[0];
    assert_eq!(descriptor.selector.as_deref(), Some(".a, .b, .a:hover"));
    assert!(result.source.contains(
        ".a:where([data-cq-match~=\"cq-0-0\"]), .b:where([data-cq-match~=\"cq-0-0\"])"
    ));
}

#[test]
fn empty_prefix_becomes_universal() {
    let result = transpile_style_sheet(
        "@container (min-width: 200px) { ::before { content: \"x\"; } }",
        None,
    );

    assert_eq!(result.descriptors[0].selector.as_deref(), Some("*"));
    assert!(result
        .source
        .contains("*:where([data-cq-match~=\"cq-0-0\"])::before"));
}

#[test]
fn invalid_container_prelude_is_left_unchanged() {
    let input = "@container none (width > 100px) { .a { color: red; } }";
    let result = transpile_style_sheet(input, None);

    assert!(result.descriptors.is_empty());
    assert!(result.source.starts_with("@container none"));
}

#[test]
fn supports_condition_goes_through_the_declaration_rewriter() {
    let result = transpile_style_sheet(
        "@supports (container-type: size) { .a { color: red; } }",
        None,
    );

    assert_eq!(
        result.source,
        "@supports (--cq-container-type-0: size) { .a { color: red; } }"
    );
}

#[test]
fn supports_shorthand_becomes_a_conjunction() {
    let result = transpile_style_sheet(
        "@supports (container: card / size) { .a { color: red; } }",
        None,
    );

    assert_eq!(
        result.source,
        "@supports ((--cq-container-name-0: card) and (--cq-container-type-0: size)) \
         { .a { color: red; } }"
    );
}

#[test]
fn keyframes_units_are_rewritten() {
    let result = transpile_style_sheet(
        "@keyframes grow { from { width: 10cqh; } to { width: 20cqh; } }",
        None,
    );

    assert_eq!(
        result.source,
        "@keyframes grow { from { width: calc(10 * var(--cq-h-0)); } \
         to { width: calc(20 * var(--cq-h-0)); } }"
    );
}

#[test]
fn urls_are_resolved_against_the_base() {
    let result = transpile_style_sheet(
        ".a { background: url(image.png); }",
        Some("https://example.com/styles/main.css"),
    );

    assert_eq!(
        result.source,
        ".a { background: url(\"https://example.com/styles/image.png\"); }"
    );
}

#[test]
fn quoted_urls_are_resolved_against_the_base() {
    let result = transpile_style_sheet(
        ".a { background: url(\"image.png\"); }",
        Some("https://example.com/styles/main.css"),
    );

    assert_eq!(
        result.source,
        ".a { background: url(\"https://example.com/styles/image.png\"); }"
    );
}

#[test]
fn absolute_urls_stay_put() {
    let result = transpile_style_sheet(
        ".a { background: url(https://other.test/x.png); }",
        Some("https://example.com/styles/main.css"),
    );

    assert_eq!(
        result.source,
        ".a { background: url(\"https://other.test/x.png\"); }"
    );
}

#[test]
fn comments_collapse_in_the_round_trip() {
    let result = transpile_style_sheet(
        "@container card /* note */ (width > 100px) { .a /* x */ { color: red; } }",
        None,
    );

    assert_eq!(result.descriptors[0].rule.name.as_deref(), Some("card"));
    assert!(!result.source.contains("note"));
    assert!(!result.source.contains("/*"));
}

#[test]
fn where_fallback_replaces_the_sentinel() {
    let config = TranspileConfig {
        supports_where: false,
        ..Default::default()
    };
    let result = Transpiler::new(config).transpile(
        "@container (min-width: 200px) { .a:not(.container-query-polyfill) { color: red; } }",
    );

    assert!(result
        .source
        .contains(".a[data-cq-match~=\"cq-0-0\"] { color: red; }"));
    assert!(result.diagnostics.is_empty());
}

#[test]
fn unguarded_selector_is_reported_without_where() {
    let config = TranspileConfig {
        supports_where: false,
        ..Default::default()
    };
    let result = Transpiler::new(config)
        .transpile("@container (min-width: 200px) { .a { color: red; } }");

    assert_eq!(
        result.diagnostics,
        vec![Error::UnguardedSelector(".a".to_string())]
    );
    // the selector is reported, not dropped
    assert!(result.source.contains(".a { color: red; }"));
}

#[test]
fn salt_flows_into_generated_names() {
    let config = TranspileConfig {
        salt: "x7".to_string(),
        ..Default::default()
    };
    let result = Transpiler::new(config)
        .transpile("@container (min-width: 200px) { .a { width: 50cqw; } }");

    assert_eq!(result.descriptors[0].uid, "cq-x7-0");
    assert!(result.source.contains("var(--cq-w-x7)"));
    assert!(result.source.contains("[data-cq-match~=\"cq-x7-0\"]"));
}

#[test]
fn transpiled_descriptor_evaluates() {
    let result = transpile_style_sheet(
        "@container (min-width: 200px) { .a { color: red; } }",
        None,
    );
    let rule = &result.descriptors[0].rule;

    let mut size_features = HashMap::new();
    size_features.insert(
        SizeFeature::Width,
        Value::Dimension {
            value: 300.0,
            unit: LengthUnit::Px,
        },
    );
    let ctx = QueryContext {
        size_features,
        ..Default::default()
    };

    assert_eq!(evaluate_container_condition(rule, &ctx), Some(true));

    let empty = QueryContext::default();
    assert_eq!(evaluate_container_condition(rule, &empty), None);
}
