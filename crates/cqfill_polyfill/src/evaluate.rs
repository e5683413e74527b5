use crate::condition::{CompareOp, ContainerCondition, LengthUnit, Orientation, SizeFeature, Value};
use crate::container::ContainerRule;
use cqfill_css3::tokenizer::Number;
use std::collections::HashMap;

/// Three-valued evaluation result. Unknown means the condition could not be
/// resolved against the given context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ternary {
    True,
    False,
    Unknown,
}

impl Ternary {
    fn from_bool(value: bool) -> Self {
        if value {
            Ternary::True
        } else {
            Ternary::False
        }
    }

    fn negate(self) -> Self {
        match self {
            Ternary::True => Ternary::False,
            Ternary::False => Ternary::True,
            Ternary::Unknown => Ternary::Unknown,
        }
    }

    pub fn to_option(self) -> Option<bool> {
        match self {
            Ternary::True => Some(true),
            Ternary::False => Some(false),
            Ternary::Unknown => None,
        }
    }
}

/// Direction of the inline axis, derived from the container's writing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritingAxis {
    Horizontal,
    Vertical,
}

/// Environment needed to resolve relative units in condition operands
#[derive(Debug, Clone)]
pub struct TreeContext {
    /// Scale of one cqw, when the width scale is known
    pub cqw: Option<Number>,
    /// Scale of one cqh, when the height scale is known
    pub cqh: Option<Number>,
    pub font_size: Number,
    pub root_font_size: Number,
    pub writing_axis: WritingAxis,
}

impl Default for TreeContext {
    fn default() -> Self {
        Self {
            cqw: None,
            cqh: None,
            font_size: 16.0,
            root_font_size: 16.0,
            writing_axis: WritingAxis::Horizontal,
        }
    }
}

/// Everything the evaluator reads: the candidate container's size snapshot
/// plus the unit resolution context
#[derive(Debug, Clone, Default)]
pub struct QueryContext {
    /// Physical and writing-axis-mapped lengths of the candidate container.
    /// Aspect ratio and orientation are derived, not supplied.
    pub size_features: HashMap<SizeFeature, Value>,
    pub tree_context: TreeContext,
}

/// Evaluates a container rule against a context. The public boundary exposes
/// the three-valued result as a nullable boolean.
pub fn evaluate_container_condition(rule: &ContainerRule, ctx: &QueryContext) -> Option<bool> {
    evaluate(rule, ctx).to_option()
}

pub fn evaluate(rule: &ContainerRule, ctx: &QueryContext) -> Ternary {
    let Some(features) = compute_features(rule, ctx) else {
        return Ternary::Unknown;
    };

    evaluate_condition(&rule.condition, &features, &ctx.tree_context)
}

/// Resolves every feature the rule references up front. When any of them is
/// unknown the whole rule is unknown, whatever the condition shape.
fn compute_features(
    rule: &ContainerRule,
    ctx: &QueryContext,
) -> Option<HashMap<SizeFeature, Value>> {
    let mut resolved = HashMap::new();

    for feature in &rule.features {
        let value = resolve_feature(*feature, ctx);
        if value == Value::Unknown {
            return None;
        }
        resolved.insert(*feature, value);
    }

    Some(resolved)
}

fn resolve_feature(feature: SizeFeature, ctx: &QueryContext) -> Value {
    match feature {
        SizeFeature::Width
        | SizeFeature::Height
        | SizeFeature::InlineSize
        | SizeFeature::BlockSize => ctx
            .size_features
            .get(&feature)
            .cloned()
            .unwrap_or(Value::Unknown),
        SizeFeature::AspectRatio => {
            match (length_of(ctx, SizeFeature::Width), length_of(ctx, SizeFeature::Height)) {
                (Some(width), Some(height)) if height > 0.0 => Value::Number(width / height),
                _ => Value::Unknown,
            }
        }
        SizeFeature::Orientation => {
            match (length_of(ctx, SizeFeature::Width), length_of(ctx, SizeFeature::Height)) {
                (Some(width), Some(height)) => {
                    if height >= width {
                        Value::Orientation(Orientation::Portrait)
                    } else {
                        Value::Orientation(Orientation::Landscape)
                    }
                }
                _ => Value::Unknown,
            }
        }
    }
}

/// Reads a snapshot length in pixels
fn length_of(ctx: &QueryContext, feature: SizeFeature) -> Option<Number> {
    match ctx.size_features.get(&feature) {
        Some(Value::Dimension {
            value,
            unit: LengthUnit::Px,
        }) => Some(*value),
        Some(Value::Number(value)) => Some(*value),
        _ => None,
    }
}

fn evaluate_condition(
    condition: &ContainerCondition,
    features: &HashMap<SizeFeature, Value>,
    tree: &TreeContext,
) -> Ternary {
    match condition {
        ContainerCondition::Not(inner) => evaluate_condition(inner, features, tree).negate(),
        ContainerCondition::And(left, right) => {
            let left = evaluate_condition(left, features, tree);
            if left != Ternary::True {
                return left;
            }
            evaluate_condition(right, features, tree)
        }
        ContainerCondition::Or(left, right) => {
            let left = evaluate_condition(left, features, tree);
            if left == Ternary::True {
                return left;
            }
            evaluate_condition(right, features, tree)
        }
        ContainerCondition::Compare { op, left, right } => compare(
            *op,
            operand_value(left, features),
            operand_value(right, features),
            tree,
        ),
        ContainerCondition::Feature(feature) => {
            truthy(features.get(feature).unwrap_or(&Value::Unknown))
        }
        ContainerCondition::Literal(value) => truthy(value),
    }
}

/// Comparison operands are features or literals by construction
fn operand_value(condition: &ContainerCondition, features: &HashMap<SizeFeature, Value>) -> Value {
    match condition {
        ContainerCondition::Feature(feature) => {
            features.get(feature).cloned().unwrap_or(Value::Unknown)
        }
        ContainerCondition::Literal(value) => value.clone(),
        _ => Value::Unknown,
    }
}

fn compare(op: CompareOp, left: Value, right: Value, tree: &TreeContext) -> Ternary {
    match (&left, &right) {
        // only equality is defined for orientations and booleans
        (Value::Orientation(a), Value::Orientation(b)) => {
            if op == CompareOp::Eq {
                Ternary::from_bool(a == b)
            } else {
                Ternary::Unknown
            }
        }
        (Value::Boolean(a), Value::Boolean(b)) => {
            if op == CompareOp::Eq {
                Ternary::from_bool(a == b)
            } else {
                Ternary::Unknown
            }
        }
        (Value::Dimension { .. }, _) | (_, Value::Dimension { .. }) => {
            match (coerce_to_px(&left, tree), coerce_to_px(&right, tree)) {
                (Some(left), Some(right)) => Ternary::from_bool(compare_numbers(op, left, right)),
                _ => Ternary::Unknown,
            }
        }
        (Value::Number(left), Value::Number(right)) => {
            Ternary::from_bool(compare_numbers(op, *left, *right))
        }
        _ => Ternary::Unknown,
    }
}

fn compare_numbers(op: CompareOp, left: Number, right: Number) -> bool {
    match op {
        CompareOp::Eq => left == right,
        CompareOp::Lt => left < right,
        CompareOp::Le => left <= right,
        CompareOp::Gt => left > right,
        CompareOp::Ge => left >= right,
    }
}

/// Coerces a value to pixels. A bare zero counts as a zero length; any other
/// bare number does not. A relative unit whose scale is absent collapses to
/// unknown (None).
fn coerce_to_px(value: &Value, tree: &TreeContext) -> Option<Number> {
    match value {
        Value::Dimension { value, unit } => Some(value * unit_scale(*unit, tree)?),
        Value::Number(value) if *value == 0.0 => Some(0.0),
        _ => None,
    }
}

fn unit_scale(unit: LengthUnit, tree: &TreeContext) -> Option<Number> {
    let (cqi, cqb) = match tree.writing_axis {
        WritingAxis::Horizontal => (tree.cqw, tree.cqh),
        WritingAxis::Vertical => (tree.cqh, tree.cqw),
    };

    match unit {
        LengthUnit::Px => Some(1.0),
        LengthUnit::Em => Some(tree.font_size),
        LengthUnit::Rem => Some(tree.root_font_size),
        LengthUnit::Cqw => tree.cqw,
        LengthUnit::Cqh => tree.cqh,
        LengthUnit::Cqi => cqi,
        LengthUnit::Cqb => cqb,
        LengthUnit::Cqmin => match (cqi, cqb) {
            (Some(i), Some(b)) => Some(i.min(b)),
            _ => None,
        },
        LengthUnit::Cqmax => match (cqi, cqb) {
            (Some(i), Some(b)) => Some(i.max(b)),
            _ => None,
        },
    }
}

/// Truthiness of a value in boolean context: zero lengths and numbers are
/// false, orientations are always true
fn truthy(value: &Value) -> Ternary {
    match value {
        Value::Unknown => Ternary::Unknown,
        Value::Number(value) => Ternary::from_bool(*value != 0.0),
        Value::Dimension { value, .. } => Ternary::from_bool(*value != 0.0),
        Value::Orientation(_) => Ternary::True,
        Value::Boolean(value) => Ternary::from_bool(*value),
    }
}
