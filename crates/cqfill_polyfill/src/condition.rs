use crate::cursor::NodeCursor;
use crate::feature::parse_query_feature;
use cqfill_css3::node::{Node, NodeType};
use cqfill_css3::tokenizer::Number;
use cqfill_shared::errors::{CssError, CssResult};

/// A size feature a container condition can query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeFeature {
    Width,
    Height,
    InlineSize,
    BlockSize,
    AspectRatio,
    Orientation,
}

/// Length units accepted inside a container condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
    Px,
    Em,
    Rem,
    Cqw,
    Cqh,
    Cqi,
    Cqb,
    Cqmin,
    Cqmax,
}

impl LengthUnit {
    pub fn parse(unit: &str) -> Option<Self> {
        match unit.to_ascii_lowercase().as_str() {
            "px" => Some(LengthUnit::Px),
            "em" => Some(LengthUnit::Em),
            "rem" => Some(LengthUnit::Rem),
            "cqw" => Some(LengthUnit::Cqw),
            "cqh" => Some(LengthUnit::Cqh),
            "cqi" => Some(LengthUnit::Cqi),
            "cqb" => Some(LengthUnit::Cqb),
            "cqmin" => Some(LengthUnit::Cqmin),
            "cqmax" => Some(LengthUnit::Cqmax),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// An operand or evaluation result inside a condition
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Unknown,
    Number(Number),
    Dimension { value: Number, unit: LengthUnit },
    Orientation(Orientation),
    Boolean(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Condition expression of a container rule. A plain tagged sum; the
/// evaluator walks it with pattern matching.
#[derive(Debug, Clone, PartialEq)]
pub enum ContainerCondition {
    Not(Box<ContainerCondition>),
    And(Box<ContainerCondition>, Box<ContainerCondition>),
    Or(Box<ContainerCondition>, Box<ContainerCondition>),
    Compare {
        op: CompareOp,
        left: Box<ContainerCondition>,
        right: Box<ContainerCondition>,
    },
    Feature(SizeFeature),
    Literal(Value),
}

fn is_keyword(node: &Node, keyword: &str) -> bool {
    matches!(&*node.node_type, NodeType::Ident { value } if value.eq_ignore_ascii_case(keyword))
}

/// Parses the generic condition grammar:
///
/// ```text
/// <condition> = <not> | <in-parens> [ (<and> <in-parens>)* | (<or> <in-parens>)* ]
/// <not>       = "not" <in-parens>
/// ```
///
/// Mixing `and` and `or` at the same level is a parse error.
pub fn parse_condition(cursor: &mut NodeCursor) -> CssResult<ContainerCondition> {
    log::trace!("parse_condition");

    if let Some(node) = cursor.peek() {
        if is_keyword(node, "not") {
            cursor.next();
            let operand = parse_in_parens(cursor)?;
            return Ok(ContainerCondition::Not(Box::new(operand)));
        }
    }

    let mut condition = parse_in_parens(cursor)?;
    let mut combinator: Option<bool> = None; // true = and, false = or

    loop {
        let Some(node) = cursor.peek() else { break };

        let is_and = if is_keyword(node, "and") {
            true
        } else if is_keyword(node, "or") {
            false
        } else {
            break;
        };

        if combinator.is_some() && combinator != Some(is_and) {
            return Err(CssError::new("cannot mix 'and' and 'or' in a condition"));
        }
        combinator = Some(is_and);

        cursor.next();
        let right = parse_in_parens(cursor)?;

        condition = if is_and {
            ContainerCondition::And(Box::new(condition), Box::new(right))
        } else {
            ContainerCondition::Or(Box::new(condition), Box::new(right))
        };
    }

    Ok(condition)
}

/// `<in-parens>` is a parenthesised block or a function call. Functions are
/// future syntax and evaluate as unknown.
fn parse_in_parens(cursor: &mut NodeCursor) -> CssResult<ContainerCondition> {
    let Some(node) = cursor.next() else {
        return Err(CssError::new("expected condition"));
    };

    match &*node.node_type {
        NodeType::Block { children, .. } if node.is_paren_block() => {
            Ok(parse_block_contents(children))
        }
        NodeType::Function { .. } => Ok(ContainerCondition::Literal(Value::Unknown)),
        _ => Err(CssError::new("expected parenthesised condition")),
    }
}

/// The content of a parenthesised block is a nested condition, a size
/// feature, or unknown future syntax.
fn parse_block_contents(children: &[Node]) -> ContainerCondition {
    let mut inner = NodeCursor::new(children);
    if let Ok(condition) = parse_condition(&mut inner) {
        if inner.at_end() {
            return condition;
        }
    }

    let mut inner = NodeCursor::new(children);
    if let Ok(feature) = parse_query_feature(&mut inner) {
        if inner.at_end() {
            return feature;
        }
    }

    ContainerCondition::Literal(Value::Unknown)
}
