//! XML-RPC document encoding and decoding
//!
//! Both directions are implemented: the gateway encodes `methodCall` and
//! decodes `methodResponse`, while the mock server in [`crate::testing`]
//! does the reverse. Decoding goes through a small element tree built from
//! `quick-xml` events; documents are a few kilobytes at most.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDateTime;
use ims_core::RpcValue;
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Result, RpcError};

const WIRE_DATETIME: &str = "%Y%m%dT%H:%M:%S";

/// A decoded `methodCall`
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub method: String,
    pub params: Vec<RpcValue>,
}

/// A decoded `methodResponse`
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResponse {
    Success(RpcValue),
    Fault { code: i64, message: String },
}

impl MethodResponse {
    pub fn fault(code: i64, message: impl Into<String>) -> Self {
        Self::Fault {
            code,
            message: message.into(),
        }
    }
}

// =============================================================================
// Encoding
// =============================================================================

/// Encode a `methodCall` document
pub fn encode_call(method: &str, params: &[RpcValue]) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?>\n<methodCall><methodName>");
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        write_value(&mut out, param);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>");
    out
}

/// Encode a `methodResponse` document
pub fn encode_response(response: &MethodResponse) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?>\n<methodResponse>");
    match response {
        MethodResponse::Success(value) => {
            out.push_str("<params><param>");
            write_value(&mut out, value);
            out.push_str("</param></params>");
        }
        MethodResponse::Fault { code, message } => {
            let mut members = BTreeMap::new();
            members.insert("faultCode".to_string(), RpcValue::Int(*code));
            members.insert("faultString".to_string(), RpcValue::String(message.clone()));
            out.push_str("<fault>");
            write_value(&mut out, &RpcValue::Struct(members));
            out.push_str("</fault>");
        }
    }
    out.push_str("</methodResponse>");
    out
}

fn write_value(out: &mut String, value: &RpcValue) {
    out.push_str("<value>");
    match value {
        RpcValue::Nil => out.push_str("<nil/>"),
        RpcValue::Bool(b) => {
            let _ = write!(out, "<boolean>{}</boolean>", u8::from(*b));
        }
        RpcValue::Int(i) => {
            // <i8> is an extension; stay with <int> whenever the value fits
            if i32::try_from(*i).is_ok() {
                let _ = write!(out, "<int>{}</int>", i);
            } else {
                let _ = write!(out, "<i8>{}</i8>", i);
            }
        }
        RpcValue::Double(d) => {
            let _ = write!(out, "<double>{}</double>", d);
        }
        RpcValue::String(s) => {
            out.push_str("<string>");
            out.push_str(&escape(s.as_str()));
            out.push_str("</string>");
        }
        RpcValue::DateTime(dt) => {
            let _ = write!(
                out,
                "<dateTime.iso8601>{}</dateTime.iso8601>",
                dt.format(WIRE_DATETIME)
            );
        }
        RpcValue::Base64(bytes) => {
            out.push_str("<base64>");
            out.push_str(&STANDARD.encode(bytes));
            out.push_str("</base64>");
        }
        RpcValue::Array(items) => {
            out.push_str("<array><data>");
            for item in items {
                write_value(out, item);
            }
            out.push_str("</data></array>");
        }
        RpcValue::Struct(members) => {
            out.push_str("<struct>");
            for (name, member) in members {
                out.push_str("<member><name>");
                out.push_str(&escape(name.as_str()));
                out.push_str("</name>");
                write_value(out, member);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
    }
    out.push_str("</value>");
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode a `methodResponse` document.
///
/// A response with an empty `<params>` is treated as a nil result.
pub fn decode_response(xml: &str) -> Result<MethodResponse> {
    let root = parse_document(xml)?;
    root.expect_name("methodResponse")?;

    if let Some(fault) = root.child("fault") {
        let value = decode_value(fault.required_child("value")?)?;
        return fault_from_value(value);
    }

    let params = root.required_child("params")?;
    let first = params.children_named("param").next();
    let value = match first {
        Some(param) => decode_value(param.required_child("value")?)?,
        None => RpcValue::Nil,
    };
    Ok(MethodResponse::Success(value))
}

/// Decode a `methodCall` document
pub fn decode_call(xml: &str) -> Result<MethodCall> {
    let root = parse_document(xml)?;
    root.expect_name("methodCall")?;

    let method = root.required_child("methodName")?.text.trim().to_string();
    let params = match root.child("params") {
        Some(params) => params
            .children_named("param")
            .map(|p| decode_value(p.required_child("value")?))
            .collect::<Result<Vec<_>>>()?,
        None => Vec::new(),
    };

    Ok(MethodCall { method, params })
}

fn fault_from_value(value: RpcValue) -> Result<MethodResponse> {
    let members = match value {
        RpcValue::Struct(members) => members,
        other => return Err(RpcError::invalid("fault", format!("{:?}", other))),
    };
    let code = match members.get("faultCode") {
        Some(RpcValue::Int(code)) => *code,
        _ => 0,
    };
    let message = match members.get("faultString") {
        Some(RpcValue::String(s)) => s.clone(),
        Some(other) => format!("{:?}", other),
        None => String::new(),
    };
    Ok(MethodResponse::Fault { code, message })
}

fn decode_value(element: &Element) -> Result<RpcValue> {
    element.expect_name("value")?;

    // A <value> without a type element is a string
    let Some(typed) = element.children.first() else {
        return Ok(RpcValue::String(element.text.clone()));
    };

    let text = typed.text.as_str();
    match typed.name.as_str() {
        "int" | "i4" | "i8" => text
            .trim()
            .parse()
            .map(RpcValue::Int)
            .map_err(|_| RpcError::invalid("int", text)),
        "boolean" => match text.trim() {
            "1" | "true" => Ok(RpcValue::Bool(true)),
            "0" | "false" => Ok(RpcValue::Bool(false)),
            _ => Err(RpcError::invalid("boolean", text)),
        },
        "double" => text
            .trim()
            .parse()
            .map(RpcValue::Double)
            .map_err(|_| RpcError::invalid("double", text)),
        "string" => Ok(RpcValue::String(text.to_string())),
        "dateTime.iso8601" => parse_datetime(text.trim())
            .map(RpcValue::DateTime)
            .ok_or_else(|| RpcError::invalid("dateTime.iso8601", text)),
        "base64" => {
            let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
            STANDARD
                .decode(compact)
                .map(RpcValue::Base64)
                .map_err(|_| RpcError::invalid("base64", text))
        }
        "nil" => Ok(RpcValue::Nil),
        "array" => {
            let data = typed.required_child("data")?;
            data.children_named("value")
                .map(decode_value)
                .collect::<Result<Vec<_>>>()
                .map(RpcValue::Array)
        }
        "struct" => {
            let mut members = BTreeMap::new();
            for member in typed.children_named("member") {
                let name = member.required_child("name")?.text.clone();
                let value = decode_value(member.required_child("value")?)?;
                members.insert(name, value);
            }
            Ok(RpcValue::Struct(members))
        }
        other => Err(RpcError::UnsupportedType(other.to_string())),
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim_end_matches('Z');
    NaiveDateTime::parse_from_str(s, WIRE_DATETIME)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

// =============================================================================
// Element tree
// =============================================================================

#[derive(Debug, Default)]
struct Element {
    name: String,
    children: Vec<Element>,
    text: String,
}

impl Element {
    fn named(name: &[u8]) -> Self {
        Self {
            name: String::from_utf8_lossy(name).into_owned(),
            ..Self::default()
        }
    }

    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn required_child(&self, name: &'static str) -> Result<&Element> {
        self.child(name).ok_or(RpcError::MissingElement(name))
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    fn expect_name(&self, expected: &'static str) -> Result<()> {
        if self.name == expected {
            Ok(())
        } else {
            Err(RpcError::UnexpectedElement {
                expected,
                found: self.name.clone(),
            })
        }
    }
}

fn parse_document(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(Element::named(e.name().as_ref())),
            Ok(Event::Empty(e)) => {
                attach(&mut stack, &mut root, Element::named(e.name().as_ref()));
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| RpcError::Xml("unbalanced end tag".to_string()))?;
                attach(&mut stack, &mut root, element);
            }
            Ok(Event::Text(t)) => {
                if let Some(current) = stack.last_mut() {
                    let text = t.unescape().map_err(|e| RpcError::Xml(e.to_string()))?;
                    current.text.push_str(&text);
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(current) = stack.last_mut() {
                    let text = std::str::from_utf8(&c)
                        .map_err(|e| RpcError::Xml(e.to_string()))?;
                    current.text.push_str(text);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(RpcError::Xml(e.to_string())),
        }
    }

    if !stack.is_empty() {
        return Err(RpcError::Xml("unexpected end of document".to_string()));
    }
    root.ok_or_else(|| RpcError::Xml("empty document".to_string()))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}
