//! Parser for AgentSpeak terms, triggers, context formulas, bodies and plans.
//!
//! ```text
//! plan     := ["@" pred] trigger [":" formula] ["<-" body] "."
//! plan_term:= "{" ["@" pred] trigger [":" formula] ["<-" body] "}"
//! trigger  := ("+" | "-") ["!" | "?"] pred
//! formula  := and ("|" and)*
//! and      := unary ("&" unary)*
//! unary    := "not" unary | "(" formula ")" | term [relop term]
//! body     := step (";" step)*
//! step     := ["!!" | "!" | "?" | "-+" | "+" | "-"] term
//! ```
//!
//! `//` and `/* */` comments are accepted wherever whitespace is.

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag, take_until, take_while},
    character::complete::{char, digit1, multispace1, satisfy},
    combinator::{all_consuming, cut, map, map_res, not, opt, recognize, success, value},
    error::{context, convert_error, ErrorKind, ParseError, VerboseError},
    multi::{many0, separated_list0, separated_list1},
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use crate::body::{BodyLiteral, BodyType, PlanBody};
use crate::formula::{LogicalFormula, RelOp};
use crate::plan::Plan;
use crate::source::SourceInfo;
use crate::term::{ListTerm, Pred, Term};
use crate::trigger::{Trigger, TriggerOp, TriggerType};
use crate::{Result, SyntaxError};

type Res<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

/// Knobs for plan parsing
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Fail the plan when a `conflict` annotation holds an unparseable
    /// trigger pattern, instead of logging it
    pub strict_annotations: bool,
}

struct PlanParts {
    label: Option<Pred>,
    trigger: Trigger,
    context: Option<LogicalFormula>,
    body: Option<PlanBody>,
}

impl PlanParts {
    fn build(self, options: ParseOptions) -> Result<Plan> {
        if options.strict_annotations {
            Plan::try_new(self.label, self.trigger, self.context, self.body)
        } else {
            Ok(Plan::new(self.label, self.trigger, self.context, self.body))
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

pub fn parse_term(input: &str) -> Result<Term> {
    complete("term", input, term)
}

pub fn parse_trigger(input: &str) -> Result<Trigger> {
    complete("trigger", input, trigger)
}

pub fn parse_formula(input: &str) -> Result<LogicalFormula> {
    complete("formula", input, formula)
}

pub fn parse_body(input: &str) -> Result<PlanBody> {
    complete("body", input, body)
}

/// Parse one plan, either `... .` or the term form `{ ... }`
pub fn parse_plan(input: &str) -> Result<Plan> {
    parse_plan_with(input, ParseOptions::default())
}

pub fn parse_plan_with(input: &str, options: ParseOptions) -> Result<Plan> {
    let (parts, is_term) = complete(
        "plan",
        input,
        alt((map(plan_term, |p| (p, true)), map(plan_sentence, |p| (p, false)))),
    )?;
    let mut plan = parts.build(options)?;
    plan.set_as_term(is_term);
    Ok(plan)
}

/// Parse a sequence of `.`-terminated plans with default options
pub fn parse_plans(input: &str) -> Result<Vec<Plan>> {
    parse_source(input, None, ParseOptions::default())
}

/// Parse a plan library, tagging each plan with its source name and line
pub fn parse_source(input: &str, source: Option<&str>, options: ParseOptions) -> Result<Vec<Plan>> {
    let mut plans = Vec::new();
    let mut rest = input;
    loop {
        let (start, _) = ws(rest).map_err(|e| parse_error("plan", input, e))?;
        if start.is_empty() {
            break;
        }
        let offset = input.len() - start.len();
        let (next, parts) = plan_sentence(start).map_err(|e| parse_error("plan", input, e))?;
        let line = input[..offset].matches('\n').count() + 1;

        let mut plan = parts.build(options)?;
        plan.set_src_info(Some(SourceInfo::new(source.map(str::to_string), line)));
        plans.push(plan);
        rest = next;
    }
    tracing::debug!(source = source.unwrap_or("<input>"), plans = plans.len(), "Parsed plan source");
    Ok(plans)
}

fn complete<'a, O>(
    what: &'static str,
    input: &'a str,
    parser: impl FnMut(&'a str) -> Res<'a, O>,
) -> Result<O> {
    all_consuming(terminated(parser, ws))(input)
        .map(|(_, out)| out)
        .map_err(|e| parse_error(what, input, e))
}

fn parse_error<'a>(
    what: &'static str,
    input: &'a str,
    err: nom::Err<VerboseError<&'a str>>,
) -> SyntaxError {
    let message = match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => convert_error(input, e),
        nom::Err::Incomplete(_) => "incomplete input".to_string(),
    };
    SyntaxError::Parse { what, message }
}

// ============================================================================
// Lexical
// ============================================================================

fn ws(input: &str) -> Res<'_, ()> {
    value((), many0(alt((multispace1, line_comment, block_comment))))(input)
}

fn line_comment(input: &str) -> Res<'_, &str> {
    recognize(pair(tag("//"), take_while(|c: char| c != '\n')))(input)
}

fn block_comment(input: &str) -> Res<'_, &str> {
    recognize(tuple((tag("/*"), take_until("*/"), tag("*/"))))(input)
}

fn sym<'a>(s: &'static str) -> impl FnMut(&'a str) -> Res<'a, &'a str> {
    preceded(ws, tag(s))
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn atom_name(input: &str) -> Res<'_, &str> {
    recognize(pair(satisfy(|c| c.is_ascii_lowercase()), take_while(is_name_char)))(input)
}

/// `.print`, `.my_lib.act`
fn internal_name(input: &str) -> Res<'_, &str> {
    recognize(pair(char('.'), separated_list1(char('.'), atom_name)))(input)
}

fn var_name(input: &str) -> Res<'_, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_uppercase() || c == '_'),
        take_while(is_name_char),
    ))(input)
}

// ============================================================================
// Terms
// ============================================================================

fn term(input: &str) -> Res<'_, Term> {
    preceded(
        ws,
        alt((
            map(string_lit, Term::Str),
            map(number, Term::Number),
            map(list, Term::List),
            variable,
            map(pred, Term::from),
        )),
    )(input)
}

fn string_lit(input: &str) -> Res<'_, String> {
    delimited(
        char('"'),
        map(
            opt(escaped_transform(
                is_not("\\\""),
                '\\',
                alt((
                    value("\\", char('\\')),
                    value("\"", char('"')),
                    value("\n", char('n')),
                    value("\t", char('t')),
                )),
            )),
            Option::unwrap_or_default,
        ),
        cut(char('"')),
    )(input)
}

fn number(input: &str) -> Res<'_, f64> {
    map_res(
        recognize(tuple((opt(char('-')), digit1, opt(pair(char('.'), digit1))))),
        |s: &str| s.parse::<f64>(),
    )(input)
}

fn variable(input: &str) -> Res<'_, Term> {
    map(var_name, |name| {
        if name == "_" {
            Term::Unnamed
        } else {
            Term::var(name)
        }
    })(input)
}

fn list(input: &str) -> Res<'_, ListTerm> {
    let (input, _) = char('[')(input)?;
    let (input, items) = separated_list0(sym(","), term)(input)?;
    let (input, tail) = opt(preceded(sym("|"), cut(term)))(input)?;
    let (input, _) = cut(sym("]"))(input)?;
    Ok((
        input,
        ListTerm {
            items,
            tail: tail.map(Box::new),
        },
    ))
}

fn pred(input: &str) -> Res<'_, Pred> {
    let (input, negated) = map(opt(char('~')), |n| n.is_some())(input)?;
    let (input, functor) = alt((internal_name, atom_name))(input)?;
    let (input, args) = opt(delimited(
        char('('),
        cut(separated_list1(sym(","), term)),
        cut(sym(")")),
    ))(input)?;
    let (input, annots) = opt(annotations)(input)?;

    let pred = Pred::new(functor)
        .with_args(args.unwrap_or_default())
        .with_annots(annots.unwrap_or_default());
    Ok((input, if negated { pred.negated() } else { pred }))
}

fn annotations(input: &str) -> Res<'_, Vec<Term>> {
    delimited(char('['), separated_list0(sym(","), term), cut(sym("]")))(input)
}

// ============================================================================
// Triggers
// ============================================================================

fn trigger(input: &str) -> Res<'_, Trigger> {
    let (input, _) = ws(input)?;
    let (input, operator) = alt((
        value(TriggerOp::Add, char('+')),
        value(TriggerOp::Del, char('-')),
    ))(input)?;
    let (input, kind) = alt((
        value(TriggerType::Achieve, char('!')),
        value(TriggerType::Test, char('?')),
        success(TriggerType::Belief),
    ))(input)?;
    let (input, literal) = context("trigger literal", cut(pred))(input)?;
    Ok((input, Trigger::new(operator, kind, literal)))
}

// ============================================================================
// Context formulas
// ============================================================================

fn formula(input: &str) -> Res<'_, LogicalFormula> {
    let (input, first) = and_expr(input)?;
    let (input, rest) = many0(preceded(sym("|"), cut(and_expr)))(input)?;
    Ok((input, rest.into_iter().fold(first, LogicalFormula::or)))
}

fn and_expr(input: &str) -> Res<'_, LogicalFormula> {
    let (input, first) = unary(input)?;
    let (input, rest) = many0(preceded(sym("&"), cut(unary)))(input)?;
    Ok((input, rest.into_iter().fold(first, LogicalFormula::and)))
}

fn unary(input: &str) -> Res<'_, LogicalFormula> {
    preceded(
        ws,
        alt((
            map(
                preceded(terminated(tag("not"), not(satisfy(is_name_char))), cut(unary)),
                LogicalFormula::not,
            ),
            delimited(char('('), cut(formula), cut(sym(")"))),
            rel_or_literal,
        )),
    )(input)
}

fn rel_or_literal(input: &str) -> Res<'_, LogicalFormula> {
    let start = input;
    let (input, left) = term(input)?;
    let (input, rel) = opt(pair(preceded(ws, rel_op), cut(term)))(input)?;
    if let Some((op, right)) = rel {
        return Ok((input, LogicalFormula::rel(op, left, right)));
    }
    match left.atom_name() {
        Some("true") => return Ok((input, LogicalFormula::True)),
        Some("false") => return Ok((input, LogicalFormula::False)),
        _ => {}
    }
    match Pred::from_term(left) {
        Some(pred) => Ok((input, LogicalFormula::Literal(pred))),
        None => Err(nom::Err::Error(VerboseError::from_error_kind(start, ErrorKind::Verify))),
    }
}

fn rel_op(input: &str) -> Res<'_, RelOp> {
    alt((
        value(RelOp::Ne, tag("\\==")),
        value(RelOp::Eq, tag("==")),
        value(RelOp::Le, tag("<=")),
        value(RelOp::Ge, tag(">=")),
        value(RelOp::Lt, terminated(tag("<"), not(char('-')))),
        value(RelOp::Gt, tag(">")),
        value(RelOp::Unify, tag("=")),
    ))(input)
}

// ============================================================================
// Bodies
// ============================================================================

fn prefixed<'a>(
    prefix: &'static str,
    kind: BodyType,
) -> impl FnMut(&'a str) -> Res<'a, BodyLiteral> {
    map(preceded(tag(prefix), cut(term)), move |t| BodyLiteral::new(kind, t))
}

fn body_literal(input: &str) -> Res<'_, BodyLiteral> {
    preceded(
        ws,
        alt((
            prefixed("!!", BodyType::AchieveNewFocus),
            prefixed("!", BodyType::Achieve),
            prefixed("?", BodyType::Test),
            prefixed("-+", BodyType::DelAddBel),
            prefixed("+", BodyType::AddBel),
            prefixed("-", BodyType::DelBel),
            map(term, BodyLiteral::action),
        )),
    )(input)
}

fn body(input: &str) -> Res<'_, PlanBody> {
    map(separated_list1(sym(";"), body_literal), PlanBody::from_steps)(input)
}

// ============================================================================
// Plans
// ============================================================================

fn plan_parts(input: &str) -> Res<'_, PlanParts> {
    let (input, label) = opt(preceded(sym("@"), cut(pred)))(input)?;
    let (input, trigger) = context("plan trigger", trigger)(input)?;
    let (input, ctx) = opt(preceded(sym(":"), cut(formula)))(input)?;
    let (input, body) = opt(preceded(sym("<-"), cut(body)))(input)?;
    Ok((
        input,
        PlanParts {
            label,
            trigger,
            context: ctx,
            body,
        },
    ))
}

fn plan_sentence(input: &str) -> Res<'_, PlanParts> {
    terminated(plan_parts, context("plan terminator", cut(sym("."))))(input)
}

fn plan_term(input: &str) -> Res<'_, PlanParts> {
    delimited(sym("{"), plan_parts, cut(sym("}")))(input)
}
