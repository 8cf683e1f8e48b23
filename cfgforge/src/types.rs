//! Declared field types and their classification.
//!
//! The vocabulary is deliberately small: primitives, optionals, unions,
//! homogeneous lists and nested config classes. [`FieldType::classify`]
//! sorts a declared type into the [`TypeShape`] the coercer dispatches on.
//!
//! A union that contains a config class resolves mappings and variant-name
//! strings through the config branch only. Its scalar members are reachable
//! solely by plain non-string scalars (for example `8` for `Model | int`).

use std::fmt;
use std::sync::Arc;

use crate::class::ConfigClass;
use crate::error::{Error, Result};

/// The declared type of a config field.
///
/// # Examples
///
/// ```
/// use cfgforge::FieldType;
///
/// let layers = FieldType::union(vec![FieldType::Int, FieldType::list(FieldType::Int)]);
/// assert_eq!(layers.to_string(), "int | list[int]");
///
/// let parsed = FieldType::parse("optional[float]", |_| None).unwrap();
/// assert_eq!(parsed, FieldType::optional(FieldType::Float));
/// ```
#[derive(Debug, Clone)]
pub enum FieldType {
    /// Accepts any value unchanged.
    Any,
    /// `true`/`false`.
    Bool,
    /// 64-bit signed integer.
    Int,
    /// 64-bit float.
    Float,
    /// UTF-8 string.
    Str,
    /// The inner type or null.
    Optional(Box<FieldType>),
    /// Any one of the members, tried in order.
    Union(Vec<FieldType>),
    /// A list whose elements all have the inner type.
    List(Box<FieldType>),
    /// An instance of the class or one of its variants.
    Config(Arc<ConfigClass>),
}

/// Classification of a [`FieldType`] used to pick a coercion strategy.
#[derive(Debug, Clone, Copy)]
pub enum TypeShape<'a> {
    /// A primitive or `any`.
    Scalar,
    /// An optional whose inner type is not a bare config class.
    Optional(&'a FieldType),
    /// A union; `config` is its first config-class member, if any.
    Union {
        /// All union members in declaration order.
        members: &'a [FieldType],
        /// The config branch of the union.
        config: Option<&'a Arc<ConfigClass>>,
    },
    /// A homogeneous list.
    List(&'a FieldType),
    /// A config class.
    ConfigType(&'a Arc<ConfigClass>),
    /// An optional config class.
    OptionalConfigType(&'a Arc<ConfigClass>),
}

impl FieldType {
    /// `optional[inner]`.
    #[must_use]
    pub fn optional(inner: FieldType) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// `list[element]`.
    #[must_use]
    pub fn list(element: FieldType) -> Self {
        Self::List(Box::new(element))
    }

    /// A union of the given members.
    #[must_use]
    pub fn union(members: Vec<FieldType>) -> Self {
        Self::Union(members)
    }

    /// A nested config class.
    #[must_use]
    pub fn config(class: &Arc<ConfigClass>) -> Self {
        Self::Config(Arc::clone(class))
    }

    /// Classifies this type for coercion.
    #[must_use]
    pub fn classify(&self) -> TypeShape<'_> {
        match self {
            Self::Any | Self::Bool | Self::Int | Self::Float | Self::Str => TypeShape::Scalar,
            Self::Config(class) => TypeShape::ConfigType(class),
            Self::Optional(inner) => match inner.as_ref() {
                Self::Config(class) => TypeShape::OptionalConfigType(class),
                other => TypeShape::Optional(other),
            },
            Self::Union(members) => TypeShape::Union {
                members,
                config: members.iter().find_map(FieldType::config_member),
            },
            Self::List(element) => TypeShape::List(element),
        }
    }

    /// Returns true if this is a config class, or an optional/union holding one.
    #[must_use]
    pub fn is_config_type(&self) -> bool {
        self.config_member().is_some()
    }

    /// The config class reachable through this type without entering a list.
    #[must_use]
    pub fn config_member(&self) -> Option<&Arc<ConfigClass>> {
        match self {
            Self::Config(class) => Some(class),
            Self::Optional(inner) => inner.config_member(),
            Self::Union(members) => members.iter().find_map(FieldType::config_member),
            _ => None,
        }
    }

    /// Returns true if the type is a list whose elements are config-typed.
    #[must_use]
    pub fn is_config_list(&self) -> bool {
        match self {
            Self::List(element) => element.is_config_type(),
            Self::Optional(inner) => inner.is_config_list(),
            _ => false,
        }
    }

    /// Returns true if an already-resolved value conforms to this type.
    ///
    /// Unlike coercion this never converts; it is the check run on values
    /// that were produced by coercion or declared as defaults.
    #[must_use]
    pub fn admits(&self, value: &crate::Value) -> bool {
        use crate::Value;
        match (self, value) {
            (Self::Any, _)
            | (Self::Bool, Value::Bool(_))
            | (Self::Int, Value::Int(_))
            | (Self::Float, Value::Float(_))
            | (Self::Str, Value::Str(_))
            | (Self::Optional(_), Value::Null) => true,
            (Self::Optional(inner), other) => inner.admits(other),
            (Self::Union(members), other) => members.iter().any(|m| m.admits(other)),
            (Self::List(element), Value::List(items)) => items.iter().all(|i| element.admits(i)),
            (Self::Config(class), Value::Config(instance)) => {
                instance.class().is_subclass_of(class)
            }
            _ => false,
        }
    }

    /// Parses a type expression such as `int | list[int]` or `optional[Model]`.
    ///
    /// Keywords (`int`, `float`, `str`, `bool`, `any`, `none`, `optional`,
    /// `list`, `union`) are case-insensitive; any other identifier is handed
    /// to `resolve_class`. A union containing `none` becomes an optional.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTypeExpression`] for malformed expressions or
    /// class names `resolve_class` does not know.
    pub fn parse<F>(expression: &str, resolve_class: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<Arc<ConfigClass>>,
    {
        let tokens = tokenize(expression)?;
        let mut parser = TypeParser {
            expression,
            tokens,
            pos: 0,
            resolve_class: &resolve_class,
        };
        let parsed = parser.parse_union()?;
        if parser.pos != parser.tokens.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        parsed.ok_or_else(|| parser.error("`none` is not a type on its own"))
    }
}

impl PartialEq for FieldType {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Any, Self::Any)
            | (Self::Bool, Self::Bool)
            | (Self::Int, Self::Int)
            | (Self::Float, Self::Float)
            | (Self::Str, Self::Str) => true,
            (Self::Optional(a), Self::Optional(b)) | (Self::List(a), Self::List(b)) => a == b,
            (Self::Union(a), Self::Union(b)) => a == b,
            (Self::Config(a), Self::Config(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Str => write!(f, "str"),
            Self::Optional(inner) => write!(f, "optional[{inner}]"),
            Self::List(element) => write!(f, "list[{element}]"),
            Self::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{member}")?;
                }
                Ok(())
            }
            Self::Config(class) => write!(f, "{}", class.name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Open,
    Close,
    Comma,
    Pipe,
}

fn tokenize(expression: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = expression.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        match c {
            '[' => tokens.push(Token::Open),
            ']' => tokens.push(Token::Close),
            ',' => tokens.push(Token::Comma),
            '|' => tokens.push(Token::Pipe),
            c if c.is_whitespace() => {}
            c if c.is_alphanumeric() || c == '_' => {
                let mut end = start + c.len_utf8();
                while let Some(&(i, next)) = chars.peek() {
                    if next.is_alphanumeric() || next == '_' {
                        end = i + next.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(expression[start..end].to_string()));
            }
            other => {
                return Err(Error::InvalidTypeExpression {
                    expression: expression.to_string(),
                    reason: format!("unexpected character '{other}'"),
                })
            }
        }
    }
    Ok(tokens)
}

fn make_optional(inner: FieldType) -> FieldType {
    match inner {
        already @ FieldType::Optional(_) => already,
        inner => FieldType::optional(inner),
    }
}

struct TypeParser<'a, F> {
    expression: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    resolve_class: &'a F,
}

impl<F> TypeParser<'_, F>
where
    F: Fn(&str) -> Option<Arc<ConfigClass>>,
{
    fn error(&self, reason: &str) -> Error {
        Error::InvalidTypeExpression {
            expression: self.expression.to_string(),
            reason: reason.to_string(),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn expect(&mut self, token: &Token, what: &str) -> Result<()> {
        if self.peek() == Some(token) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected {what}")))
        }
    }

    /// `term ('|' term)*`; `None` means the expression was only `none`.
    fn parse_union(&mut self) -> Result<Option<FieldType>> {
        let mut members = Vec::new();
        let mut nullable = false;
        loop {
            match self.parse_term()? {
                Some(member) => members.push(member),
                None => nullable = true,
            }
            if self.peek() == Some(&Token::Pipe) {
                self.pos += 1;
            } else {
                break;
            }
        }
        Ok(Self::combine(members, nullable))
    }

    /// Comma-separated members inside `union[...]`.
    fn parse_union_args(&mut self) -> Result<Option<FieldType>> {
        let mut members = Vec::new();
        let mut nullable = false;
        loop {
            match self.parse_union()? {
                Some(FieldType::Optional(inner)) => {
                    nullable = true;
                    members.push(*inner);
                }
                Some(member) => members.push(member),
                None => nullable = true,
            }
            if self.peek() == Some(&Token::Comma) {
                self.pos += 1;
            } else {
                break;
            }
        }
        Ok(Self::combine(members, nullable))
    }

    fn combine(mut members: Vec<FieldType>, nullable: bool) -> Option<FieldType> {
        let inner = match members.len() {
            0 => return None,
            1 => members.remove(0),
            _ => FieldType::Union(members),
        };
        Some(if nullable { make_optional(inner) } else { inner })
    }

    fn parse_required(&mut self) -> Result<FieldType> {
        self.parse_union()?
            .ok_or_else(|| self.error("`none` is not a type on its own"))
    }

    fn parse_term(&mut self) -> Result<Option<FieldType>> {
        let Some(Token::Ident(ident)) = self.peek().cloned() else {
            return Err(self.error("expected a type name"));
        };
        self.pos += 1;

        let keyword = ident.to_ascii_lowercase();
        let parsed = match keyword.as_str() {
            "any" => FieldType::Any,
            "bool" => FieldType::Bool,
            "int" => FieldType::Int,
            "float" => FieldType::Float,
            "str" => FieldType::Str,
            "none" => return Ok(None),
            "optional" => {
                self.expect(&Token::Open, "'[' after optional")?;
                let inner = self.parse_required()?;
                self.expect(&Token::Close, "']'")?;
                make_optional(inner)
            }
            "list" => {
                self.expect(&Token::Open, "'[' after list")?;
                let element = self.parse_required()?;
                self.expect(&Token::Close, "']'")?;
                FieldType::list(element)
            }
            "union" => {
                self.expect(&Token::Open, "'[' after union")?;
                let members = self.parse_union_args()?;
                self.expect(&Token::Close, "']'")?;
                return Ok(members);
            }
            _ => match (self.resolve_class)(&ident) {
                Some(class) => FieldType::Config(class),
                None => return Err(self.error(&format!("unknown type or class '{ident}'"))),
            },
        };
        Ok(Some(parsed))
    }
}
