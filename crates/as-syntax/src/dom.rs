//! Structured document form of plans and their parts.
//!
//! A plan becomes
//!
//! ```xml
//! <plan>
//!   <label><literal>...</literal></label>   (only when labelled)
//!   <trigger operator="+" type="!">...</trigger>
//!   <context>...</context>                  (only with a context)
//!   <body>...</body>                        (only for non-empty bodies)
//! </plan>
//! ```

use std::io::Cursor;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::body::{BodyLiteral, BodyType, PlanBody};
use crate::formula::LogicalFormula;
use crate::plan::Plan;
use crate::term::{format_number, ListTerm, Pred, Term};
use crate::trigger::Trigger;
use crate::{Result, SyntaxError};

/// Document node
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// Element with ordered attributes and children
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((key.into(), value.into()));
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    /// Child elements in document order
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    pub fn find(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    /// Render as indented XML text
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        write_element(&mut writer, self)?;
        String::from_utf8(writer.into_inner().into_inner()).map_err(xml_error)
    }
}

fn xml_error(e: impl std::fmt::Display) -> SyntaxError {
    SyntaxError::Xml(e.to_string())
}

fn write_element(writer: &mut Writer<Cursor<Vec<u8>>>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attrs {
        start.push_attribute((key.as_str(), value.as_str()));
    }
    if element.children.is_empty() {
        writer.write_event(Event::Empty(start)).map_err(xml_error)?;
        return Ok(());
    }
    writer.write_event(Event::Start(start)).map_err(xml_error)?;
    for child in &element.children {
        match child {
            Node::Element(e) => write_element(writer, e)?,
            Node::Text(t) => writer
                .write_event(Event::Text(BytesText::new(t)))
                .map_err(xml_error)?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(xml_error)?;
    Ok(())
}

/// Conversion into the structured document form
pub trait ToDom {
    fn to_dom(&self) -> Element;
}

impl ToDom for Term {
    fn to_dom(&self) -> Element {
        match self {
            Self::Atom(name) => Element::new("structure").attr("functor", name),
            Self::Str(s) => Element::new("string-term").text(s),
            Self::Number(n) => Element::new("number-term").text(format_number(*n)),
            Self::Var(name) => Element::new("var-term").attr("functor", name),
            Self::Unnamed => Element::new("var-term").attr("functor", "_"),
            Self::Pred(p) => p.to_dom(),
            Self::List(l) => l.to_dom(),
        }
    }
}

impl ToDom for ListTerm {
    fn to_dom(&self) -> Element {
        let mut e = Element::new("list-term");
        for item in &self.items {
            e = e.child(item.to_dom());
        }
        if let Some(tail) = &self.tail {
            e = e.child(Element::new("tail").child(tail.to_dom()));
        }
        e
    }
}

impl ToDom for Pred {
    fn to_dom(&self) -> Element {
        let mut structure = Element::new("structure").attr("functor", &self.functor);
        if !self.args.is_empty() {
            let mut args = Element::new("arguments");
            for arg in &self.args {
                args = args.child(arg.to_dom());
            }
            structure = structure.child(args);
        }
        if self.has_annots() {
            let mut annots = Element::new("annotations");
            for annot in self.annots() {
                annots = annots.child(annot.to_dom());
            }
            structure = structure.child(annots);
        }
        let literal = Element::new("literal");
        let literal = if self.negated {
            literal.attr("negated", "true")
        } else {
            literal
        };
        literal.child(structure)
    }
}

impl ToDom for Trigger {
    fn to_dom(&self) -> Element {
        Element::new("trigger")
            .attr("operator", self.operator.to_string())
            .attr("type", self.kind.to_string())
            .child(self.literal.to_dom())
    }
}

impl ToDom for LogicalFormula {
    fn to_dom(&self) -> Element {
        let expression = |kind: &str| Element::new("expression").attr("type", kind);
        match self {
            Self::True => Element::new("structure").attr("functor", "true"),
            Self::False => Element::new("structure").attr("functor", "false"),
            Self::Literal(p) => p.to_dom(),
            Self::Not(inner) => expression("not").child(Element::new("right").child(inner.to_dom())),
            Self::And(l, r) => expression("and")
                .child(Element::new("left").child(l.to_dom()))
                .child(Element::new("right").child(r.to_dom())),
            Self::Or(l, r) => expression("or")
                .child(Element::new("left").child(l.to_dom()))
                .child(Element::new("right").child(r.to_dom())),
            Self::Rel { op, left, right } => expression("relational")
                .attr("operator", op.symbol())
                .child(Element::new("left").child(left.to_dom()))
                .child(Element::new("right").child(right.to_dom())),
        }
    }
}

impl ToDom for BodyLiteral {
    fn to_dom(&self) -> Element {
        let kind = match self.kind {
            BodyType::Action => "action",
            BodyType::InternalAction => "internal-action",
            _ => self.kind.prefix(),
        };
        Element::new("body-literal")
            .attr("type", kind)
            .child(self.term.to_dom())
    }
}

impl ToDom for PlanBody {
    fn to_dom(&self) -> Element {
        self.steps()
            .iter()
            .fold(Element::new("body"), |e, step| e.child(step.to_dom()))
    }
}

impl ToDom for Plan {
    fn to_dom(&self) -> Element {
        let mut e = Element::new("plan");
        if let Some(label) = self.label() {
            e = e.child(Element::new("label").child(label.to_dom()));
        }
        e = e.child(self.trigger().to_dom());
        if let Some(context) = self.context() {
            e = e.child(Element::new("context").child(context.to_dom()));
        }
        if !self.body().is_empty_body() {
            e = e.child(self.body().to_dom());
        }
        e
    }
}
