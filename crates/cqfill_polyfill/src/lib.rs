//! Container query polyfill core
//!
//! This crate rewrites stylesheets that use `@container` rules and the
//! `container` properties into plain CSS a native engine can apply, and
//! evaluates the extracted conditions against a container's measured size.
//! The DOM side (observers, attribute application, custom property
//! plumbing) is the host's job; it drives the two entry points below.

pub mod condition;
pub mod container;
pub mod cursor;
pub mod errors;
pub mod evaluate;
pub mod feature;
mod selector;
pub mod transform;

pub use condition::{
    CompareOp, ContainerCondition, LengthUnit, Orientation, SizeFeature, Value,
};
pub use container::{
    parse_container_name_property, parse_container_rule, parse_container_shorthand,
    parse_container_type_property, ContainerRule,
};
pub use errors::Error;
pub use evaluate::{
    evaluate_container_condition, QueryContext, Ternary, TreeContext, WritingAxis,
};
pub use transform::{
    ContainerQueryDescriptor, TranspileConfig, TranspileResult, Transpiler, SELF_ATTRIBUTE,
};

/// Transpiles a stylesheet with the default configuration. Always returns a
/// usable result; a sheet that cannot be processed comes back unchanged with
/// an empty descriptor list.
pub fn transpile_style_sheet(source: &str, base_url: Option<&str>) -> TranspileResult {
    let config = TranspileConfig {
        base_url: base_url.map(String::from),
        ..Default::default()
    };

    Transpiler::new(config).transpile(source)
}
