use crate::condition::{
    CompareOp, ContainerCondition, LengthUnit, Orientation, SizeFeature, Value,
};
use crate::cursor::NodeCursor;
use cqfill_css3::node::NodeType;
use cqfill_shared::errors::{CssError, CssResult};
use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    /// The size features a container condition can reference
    static ref SIZE_FEATURES: HashMap<&'static str, SizeFeature> = {
        let mut m = HashMap::new();
        m.insert("width", SizeFeature::Width);
        m.insert("height", SizeFeature::Height);
        m.insert("inline-size", SizeFeature::InlineSize);
        m.insert("block-size", SizeFeature::BlockSize);
        m.insert("aspect-ratio", SizeFeature::AspectRatio);
        m.insert("orientation", SizeFeature::Orientation);
        m
    };
}

fn lookup_feature(name: &str) -> CssResult<SizeFeature> {
    SIZE_FEATURES
        .get(name.to_ascii_lowercase().as_str())
        .copied()
        .ok_or_else(|| CssError::new(format!("unknown size feature '{name}'").as_str()))
}

/// Parses the contents of a feature block. Three shapes are accepted:
///
/// 1. boolean:  `(width)`
/// 2. plain:    `(min-width: 200px)`
/// 3. range:    `(width > 200px)`, `(100px < width <= 400px)`
pub fn parse_query_feature(cursor: &mut NodeCursor) -> CssResult<ContainerCondition> {
    log::trace!("parse_query_feature");

    let Some(first) = cursor.peek() else {
        return Err(CssError::new("expected size feature"));
    };

    let condition = if let NodeType::Ident { value } = &*first.node_type {
        let name = value.clone();
        cursor.next();

        match cursor.peek() {
            // boolean form
            None => ContainerCondition::Feature(lookup_feature(&name)?),
            // plain form, with an optional min-/max- prefix
            Some(node) if node.is_colon() => {
                cursor.next();
                let (feature, op) = plain_feature(&name)?;
                let value = parse_feature_value(cursor)?;
                compare(
                    op,
                    ContainerCondition::Feature(feature),
                    ContainerCondition::Literal(value),
                )
            }
            // single-sided range with the feature on the left
            Some(_) => {
                let feature = lookup_feature(&name)?;
                let op = parse_operator(cursor)?;
                let value = parse_feature_value(cursor)?;
                compare(
                    op,
                    ContainerCondition::Feature(feature),
                    ContainerCondition::Literal(value),
                )
            }
        }
    } else {
        // range with the value on the left, single or double sided
        let left = parse_feature_value(cursor)?;
        let op_left = parse_operator(cursor)?;

        let name = match cursor.next().map(|n| &*n.node_type) {
            Some(NodeType::Ident { value }) => value.clone(),
            _ => return Err(CssError::new("expected size feature in range")),
        };
        let feature = lookup_feature(&name)?;

        if cursor.at_end() {
            compare(
                op_left,
                ContainerCondition::Literal(left),
                ContainerCondition::Feature(feature),
            )
        } else {
            let op_right = parse_operator(cursor)?;
            if !same_direction(op_left, op_right) {
                return Err(CssError::new(
                    "range operators must point in the same direction",
                ));
            }
            let right = parse_feature_value(cursor)?;

            ContainerCondition::And(
                Box::new(compare(
                    op_left,
                    ContainerCondition::Literal(left),
                    ContainerCondition::Feature(feature),
                )),
                Box::new(compare(
                    op_right,
                    ContainerCondition::Feature(feature),
                    ContainerCondition::Literal(right),
                )),
            )
        }
    };

    if !cursor.at_end() {
        return Err(CssError::new("unexpected content after size feature"));
    }

    Ok(condition)
}

fn compare(
    op: CompareOp,
    left: ContainerCondition,
    right: ContainerCondition,
) -> ContainerCondition {
    ContainerCondition::Compare {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

/// Resolves a plain-form feature name: a `min-` prefix turns into `>=`, a
/// `max-` prefix into `<=`. The orientation feature takes no prefix.
fn plain_feature(name: &str) -> CssResult<(SizeFeature, CompareOp)> {
    let lower = name.to_ascii_lowercase();

    if let Some(base) = lower.strip_prefix("min-") {
        let feature = lookup_feature(base)?;
        if feature == SizeFeature::Orientation {
            return Err(CssError::new("orientation is not a range feature"));
        }
        return Ok((feature, CompareOp::Ge));
    }

    if let Some(base) = lower.strip_prefix("max-") {
        let feature = lookup_feature(base)?;
        if feature == SizeFeature::Orientation {
            return Err(CssError::new("orientation is not a range feature"));
        }
        return Ok((feature, CompareOp::Le));
    }

    Ok((lookup_feature(&lower)?, CompareOp::Eq))
}

fn same_direction(a: CompareOp, b: CompareOp) -> bool {
    let less = |op| matches!(op, CompareOp::Lt | CompareOp::Le);
    let greater = |op| matches!(op, CompareOp::Gt | CompareOp::Ge);

    (less(a) && less(b)) || (greater(a) && greater(b))
}

/// Parses a comparison operator. The `=` half of `<=` and `>=` must follow
/// without intervening whitespace.
fn parse_operator(cursor: &mut NodeCursor) -> CssResult<CompareOp> {
    let Some(node) = cursor.next() else {
        return Err(CssError::new("expected comparison operator"));
    };

    let op = match &*node.node_type {
        NodeType::Delim { value: '=' } => return Ok(CompareOp::Eq),
        NodeType::Delim { value: '<' } => CompareOp::Lt,
        NodeType::Delim { value: '>' } => CompareOp::Gt,
        _ => return Err(CssError::new("expected comparison operator")),
    };

    if cursor.peek_raw().map_or(false, |n| n.is_delim('=')) {
        cursor.next();
        return Ok(match op {
            CompareOp::Lt => CompareOp::Le,
            _ => CompareOp::Ge,
        });
    }

    Ok(op)
}

/// Parses a feature value: a number, a ratio of two numbers (stored as the
/// quotient), a dimension with a known unit, or an orientation keyword.
fn parse_feature_value(cursor: &mut NodeCursor) -> CssResult<Value> {
    let Some(node) = cursor.next() else {
        return Err(CssError::new("expected value"));
    };

    match &*node.node_type {
        NodeType::Number { value, .. } => {
            if cursor.peek().map_or(false, |n| n.is_delim('/')) {
                cursor.next();
                let denominator = match cursor.next().map(|n| &*n.node_type) {
                    Some(NodeType::Number { value, .. }) => *value,
                    _ => return Err(CssError::new("expected ratio denominator")),
                };
                if denominator == 0.0 {
                    return Err(CssError::new("ratio denominator cannot be zero"));
                }
                return Ok(Value::Number(value / denominator));
            }

            Ok(Value::Number(*value))
        }
        NodeType::Dimension { value, unit, .. } => match LengthUnit::parse(unit) {
            Some(unit) => Ok(Value::Dimension {
                value: *value,
                unit,
            }),
            None => Err(CssError::new(format!("unknown unit '{unit}'").as_str())),
        },
        NodeType::Ident { value } if value.eq_ignore_ascii_case("portrait") => {
            Ok(Value::Orientation(Orientation::Portrait))
        }
        NodeType::Ident { value } if value.eq_ignore_ascii_case("landscape") => {
            Ok(Value::Orientation(Orientation::Landscape))
        }
        _ => Err(CssError::new("expected number, dimension, or orientation")),
    }
}
