//! Resolved schema descriptors.
//!
//! These are the plain-data nodes the engine lints. They are produced by an
//! upstream schema parser (or deserialized from its JSON dump) with every
//! type reference already resolved, and are never mutated by the engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A source range (1-indexed lines and columns).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Span {
    /// First line of the range.
    pub start_line: u32,
    /// First column of the range.
    pub start_column: u32,
    /// Last line of the range.
    #[serde(default)]
    pub end_line: u32,
    /// Column just past the end of the range.
    #[serde(default)]
    pub end_column: u32,
}

impl Span {
    /// Creates a span covering a single line.
    #[must_use]
    pub fn line(line: u32, start_column: u32, end_column: u32) -> Self {
        Self {
            start_line: line,
            start_column,
            end_line: line,
            end_column,
        }
    }
}

/// Source spans recorded for the parts of one declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpans {
    /// The whole declaration.
    #[serde(default)]
    pub declaration: Span,
    /// The declared name.
    #[serde(default)]
    pub name: Option<Span>,
    /// The type of a field.
    #[serde(default, rename = "type")]
    pub ty: Option<Span>,
    /// The request type of a method.
    #[serde(default)]
    pub input_type: Option<Span>,
    /// The response type of a method.
    #[serde(default)]
    pub output_type: Option<Span>,
    /// Option annotations, keyed by option name (e.g. `google.api.http`).
    #[serde(default)]
    pub options: BTreeMap<String, Span>,
}

impl SourceSpans {
    /// Creates spans with only the declaration range set.
    #[must_use]
    pub fn at(declaration: Span) -> Self {
        Self {
            declaration,
            ..Self::default()
        }
    }
}

/// The kind of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptorKind {
    /// A schema file.
    File,
    /// A message.
    Message,
    /// A message field.
    Field,
    /// An enum.
    Enum,
    /// An enum value.
    EnumValue,
    /// A service.
    Service,
    /// A service method.
    Method,
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::File => "file",
            Self::Message => "message",
            Self::Field => "field",
            Self::Enum => "enum",
            Self::EnumValue => "enum value",
            Self::Service => "service",
            Self::Method => "method",
        };
        f.write_str(s)
    }
}

/// Scalar field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum ScalarType {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
}

/// A resolved field type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// A scalar type.
    Scalar(ScalarType),
    /// A message type, by fully-qualified name.
    Message(String),
    /// An enum type, by fully-qualified name.
    Enum(String),
    /// A map field.
    Map {
        /// Key type.
        key: ScalarType,
        /// Value type.
        value: Box<FieldType>,
    },
}

impl FieldType {
    /// Returns the fully-qualified message name if this is a message type.
    #[must_use]
    pub fn message_type(&self) -> Option<&str> {
        match self {
            Self::Message(name) => Some(name),
            _ => None,
        }
    }
}

/// Field cardinality.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    /// Singular field (proto3 default).
    #[default]
    Optional,
    /// Repeated field.
    Repeated,
    /// Proto2 required field.
    Required,
}

/// A schema file: the root of a declaration tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Path of the file, relative to the import root.
    pub path: String,
    /// Package declared by the file.
    #[serde(default)]
    pub package: String,
    /// Leading comment blocks attached to the file (syntax/package statement).
    #[serde(default)]
    pub comments: Vec<String>,
    /// Top-level messages.
    #[serde(default)]
    pub messages: Vec<MessageDescriptor>,
    /// Top-level enums.
    #[serde(default)]
    pub enums: Vec<EnumDescriptor>,
    /// Services.
    #[serde(default)]
    pub services: Vec<ServiceDescriptor>,
    /// Source spans.
    #[serde(default)]
    pub spans: SourceSpans,
}

/// A message declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDescriptor {
    /// Short name.
    pub name: String,
    /// Leading comment blocks.
    #[serde(default)]
    pub comments: Vec<String>,
    /// Fields in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    /// Nested messages.
    #[serde(default)]
    pub messages: Vec<MessageDescriptor>,
    /// Nested enums.
    #[serde(default)]
    pub enums: Vec<EnumDescriptor>,
    /// Source spans.
    #[serde(default)]
    pub spans: SourceSpans,
}

impl MessageDescriptor {
    /// Finds a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A field declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Short name.
    pub name: String,
    /// Field number.
    #[serde(default)]
    pub number: i32,
    /// Cardinality.
    #[serde(default)]
    pub label: Label,
    /// Resolved type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Leading comment blocks.
    #[serde(default)]
    pub comments: Vec<String>,
    /// Source spans.
    #[serde(default)]
    pub spans: SourceSpans,
}

impl FieldDescriptor {
    /// Returns true for repeated fields. Map fields are not considered repeated.
    #[must_use]
    pub fn is_repeated(&self) -> bool {
        self.label == Label::Repeated
    }

    /// Returns the value type if this is a map field.
    #[must_use]
    pub fn map_value_type(&self) -> Option<&FieldType> {
        match &self.field_type {
            FieldType::Map { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// An enum declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDescriptor {
    /// Short name.
    pub name: String,
    /// Leading comment blocks.
    #[serde(default)]
    pub comments: Vec<String>,
    /// Values in declaration order.
    #[serde(default)]
    pub values: Vec<EnumValueDescriptor>,
    /// Source spans.
    #[serde(default)]
    pub spans: SourceSpans,
}

/// An enum value declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValueDescriptor {
    /// Name (conventionally `UPPER_SNAKE_CASE`).
    pub name: String,
    /// Numeric value.
    #[serde(default)]
    pub number: i32,
    /// Leading comment blocks.
    #[serde(default)]
    pub comments: Vec<String>,
    /// Source spans.
    #[serde(default)]
    pub spans: SourceSpans,
}

/// A service declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    /// Short name.
    pub name: String,
    /// Leading comment blocks.
    #[serde(default)]
    pub comments: Vec<String>,
    /// Methods in declaration order.
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
    /// Source spans.
    #[serde(default)]
    pub spans: SourceSpans,
}

/// One `google.api.http` binding of a method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRule {
    /// HTTP verb, upper case (`GET`, `POST`, ...).
    pub method: String,
    /// URI template.
    pub path: String,
    /// Body field; empty for no body, `*` for the whole request.
    #[serde(default)]
    pub body: String,
}

/// A service method declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    /// Short name.
    pub name: String,
    /// Fully-qualified request message name.
    pub input_type: String,
    /// Fully-qualified response message name.
    pub output_type: String,
    /// Whether the client streams requests.
    #[serde(default)]
    pub client_streaming: bool,
    /// Whether the server streams responses.
    #[serde(default)]
    pub server_streaming: bool,
    /// HTTP bindings, primary first then additional bindings.
    #[serde(default)]
    pub http_rules: Vec<HttpRule>,
    /// Leading comment blocks.
    #[serde(default)]
    pub comments: Vec<String>,
    /// Source spans.
    #[serde(default)]
    pub spans: SourceSpans,
}

impl MethodDescriptor {
    /// Short name of the request message.
    #[must_use]
    pub fn input_name(&self) -> &str {
        short_name(&self.input_type)
    }

    /// Short name of the response message.
    #[must_use]
    pub fn output_name(&self) -> &str {
        short_name(&self.output_type)
    }
}

fn short_name(full_name: &str) -> &str {
    full_name.rsplit('.').next().unwrap_or(full_name)
}

/// A borrowed reference to any declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descriptor<'a> {
    /// A file.
    File(&'a FileDescriptor),
    /// A message.
    Message(&'a MessageDescriptor),
    /// A field.
    Field(&'a FieldDescriptor),
    /// An enum.
    Enum(&'a EnumDescriptor),
    /// An enum value.
    EnumValue(&'a EnumValueDescriptor),
    /// A service.
    Service(&'a ServiceDescriptor),
    /// A method.
    Method(&'a MethodDescriptor),
}

impl<'a> Descriptor<'a> {
    /// Returns the declaration kind.
    #[must_use]
    pub fn kind(self) -> DescriptorKind {
        match self {
            Self::File(_) => DescriptorKind::File,
            Self::Message(_) => DescriptorKind::Message,
            Self::Field(_) => DescriptorKind::Field,
            Self::Enum(_) => DescriptorKind::Enum,
            Self::EnumValue(_) => DescriptorKind::EnumValue,
            Self::Service(_) => DescriptorKind::Service,
            Self::Method(_) => DescriptorKind::Method,
        }
    }

    /// Returns the short name (the path, for files).
    #[must_use]
    pub fn name(self) -> &'a str {
        match self {
            Self::File(d) => &d.path,
            Self::Message(d) => &d.name,
            Self::Field(d) => &d.name,
            Self::Enum(d) => &d.name,
            Self::EnumValue(d) => &d.name,
            Self::Service(d) => &d.name,
            Self::Method(d) => &d.name,
        }
    }

    /// Returns the leading comment blocks.
    #[must_use]
    pub fn comments(self) -> &'a [String] {
        match self {
            Self::File(d) => &d.comments,
            Self::Message(d) => &d.comments,
            Self::Field(d) => &d.comments,
            Self::Enum(d) => &d.comments,
            Self::EnumValue(d) => &d.comments,
            Self::Service(d) => &d.comments,
            Self::Method(d) => &d.comments,
        }
    }

    /// Returns the source spans.
    #[must_use]
    pub fn spans(self) -> &'a SourceSpans {
        match self {
            Self::File(d) => &d.spans,
            Self::Message(d) => &d.spans,
            Self::Field(d) => &d.spans,
            Self::Enum(d) => &d.spans,
            Self::EnumValue(d) => &d.spans,
            Self::Service(d) => &d.spans,
            Self::Method(d) => &d.spans,
        }
    }

    /// Returns true if both refer to the same declaration (identity, not
    /// structural equality).
    #[must_use]
    pub fn is_same(self, other: Descriptor<'_>) -> bool {
        match (self, other) {
            (Self::File(a), Descriptor::File(b)) => std::ptr::eq(a, b),
            (Self::Message(a), Descriptor::Message(b)) => std::ptr::eq(a, b),
            (Self::Field(a), Descriptor::Field(b)) => std::ptr::eq(a, b),
            (Self::Enum(a), Descriptor::Enum(b)) => std::ptr::eq(a, b),
            (Self::EnumValue(a), Descriptor::EnumValue(b)) => std::ptr::eq(a, b),
            (Self::Service(a), Descriptor::Service(b)) => std::ptr::eq(a, b),
            (Self::Method(a), Descriptor::Method(b)) => std::ptr::eq(a, b),
            _ => false,
        }
    }

    /// Returns the direct children in declaration order.
    ///
    /// Messages yield fields, then nested messages, then nested enums.
    /// Files yield messages, then enums, then services.
    #[must_use]
    pub fn children(self) -> Vec<Descriptor<'a>> {
        match self {
            Self::File(d) => d
                .messages
                .iter()
                .map(Descriptor::Message)
                .chain(d.enums.iter().map(Descriptor::Enum))
                .chain(d.services.iter().map(Descriptor::Service))
                .collect(),
            Self::Message(d) => d
                .fields
                .iter()
                .map(Descriptor::Field)
                .chain(d.messages.iter().map(Descriptor::Message))
                .chain(d.enums.iter().map(Descriptor::Enum))
                .collect(),
            Self::Enum(d) => d.values.iter().map(Descriptor::EnumValue).collect(),
            Self::Service(d) => d.methods.iter().map(Descriptor::Method).collect(),
            Self::Field(_) | Self::EnumValue(_) | Self::Method(_) => Vec::new(),
        }
    }
}

/// A descriptor type that a rule can be bound to.
///
/// Implemented for each of the seven declaration types; rules generic over
/// `D: DescriptorNode` are only ever handed declarations of `D::KIND`.
pub trait DescriptorNode: fmt::Debug + Sync + 'static {
    /// The declaration kind of this type.
    const KIND: DescriptorKind;

    /// Narrows a borrowed descriptor to this type.
    fn downcast(descriptor: Descriptor<'_>) -> Option<&Self>;
}

macro_rules! descriptor_node {
    ($ty:ty, $variant:ident) => {
        impl DescriptorNode for $ty {
            const KIND: DescriptorKind = DescriptorKind::$variant;

            fn downcast(descriptor: Descriptor<'_>) -> Option<&Self> {
                match descriptor {
                    Descriptor::$variant(d) => Some(d),
                    _ => None,
                }
            }
        }

        impl<'a> From<&'a $ty> for Descriptor<'a> {
            fn from(d: &'a $ty) -> Self {
                Descriptor::$variant(d)
            }
        }
    };
}

descriptor_node!(FileDescriptor, File);
descriptor_node!(MessageDescriptor, Message);
descriptor_node!(FieldDescriptor, Field);
descriptor_node!(EnumDescriptor, Enum);
descriptor_node!(EnumValueDescriptor, EnumValue);
descriptor_node!(ServiceDescriptor, Service);
descriptor_node!(MethodDescriptor, Method);
