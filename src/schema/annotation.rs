//! Field type annotations
//!
//! Annotations are the declared types of schema fields before
//! classification. The textual form follows common type-hint spelling:
//!
//! ```text
//! Email                  named type
//! str | None             optional (also Optional[str])
//! List[Address]          list
//! List[Optional[Date]]   list with nullable elements
//! Tuple[str, int]        parsed, but rejected when declared
//! ```

use std::fmt;
use std::str::FromStr;

use super::errors::AnnotationError;

/// A declared field type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// A scalar, token type or schema name
    Named(String),
    /// The null type (`None`)
    NoneType,
    /// `Optional[T]`
    Optional(Box<Annotation>),
    /// `List[T]`
    List(Box<Annotation>),
    /// `Tuple[A, B, ...]`
    Tuple(Vec<Annotation>),
    /// `A | B | ...` or `Union[A, B, ...]`
    Union(Vec<Annotation>),
    /// Any other parameterised type (`Dict[str, int]`, ...)
    Generic { name: String, args: Vec<Annotation> },
}

impl Annotation {
    pub fn named(name: impl Into<String>) -> Self {
        Annotation::Named(name.into())
    }

    pub fn optional(inner: Annotation) -> Self {
        Annotation::Optional(Box::new(inner))
    }

    pub fn list(inner: Annotation) -> Self {
        Annotation::List(Box::new(inner))
    }

    /// Parse the textual form
    pub fn parse(input: &str) -> Result<Self, AnnotationError> {
        let mut parser = Parser { src: input, pos: 0 };
        let annotation = parser.union()?;
        parser.skip_whitespace();
        if parser.pos != input.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(annotation)
    }
}

impl FromStr for Annotation {
    type Err = AnnotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Annotation::parse(s)
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[Annotation]) -> fmt::Result {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", arg)?;
    }
    Ok(())
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Annotation::Named(name) => f.write_str(name),
            Annotation::NoneType => f.write_str("None"),
            Annotation::Optional(inner) => write!(f, "Optional[{}]", inner),
            Annotation::List(inner) => write!(f, "List[{}]", inner),
            Annotation::Tuple(args) => {
                f.write_str("Tuple[")?;
                write_args(f, args)?;
                f.write_str("]")
            }
            Annotation::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{}", member)?;
                }
                Ok(())
            }
            Annotation::Generic { name, args } => {
                write!(f, "{}[", name)?;
                write_args(f, args)?;
                f.write_str("]")
            }
        }
    }
}

/// Recursive-descent parser:
///
/// ```text
/// union := term ('|' term)*
/// term  := IDENT ('[' union (',' union)* ']')?
/// ```
struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, reason: &str) -> AnnotationError {
        AnnotationError::new(self.src, format!("{} at offset {}", reason, self.pos))
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Result<&'a str, AnnotationError> {
        self.skip_whitespace();
        let start = self.pos;
        while let Some(c) = self.peek() {
            let valid = if self.pos == start {
                c.is_ascii_alphabetic() || c == '_'
            } else {
                c.is_ascii_alphanumeric() || c == '_' || c == '.'
            };
            if !valid {
                break;
            }
            self.pos += c.len_utf8();
        }
        if self.pos == start {
            return Err(self.error("expected a type name"));
        }
        Ok(&self.src[start..self.pos])
    }

    fn union(&mut self) -> Result<Annotation, AnnotationError> {
        let mut members = vec![self.term()?];
        while self.eat('|') {
            members.push(self.term()?);
        }
        if members.len() == 1 {
            Ok(members.remove(0))
        } else {
            Ok(Annotation::Union(members))
        }
    }

    fn term(&mut self) -> Result<Annotation, AnnotationError> {
        let name = self.ident()?;
        if !self.eat('[') {
            return Ok(match name {
                "None" | "NoneType" => Annotation::NoneType,
                _ => Annotation::named(name),
            });
        }

        let mut args = vec![self.union()?];
        while self.eat(',') {
            args.push(self.union()?);
        }
        if !self.eat(']') {
            return Err(self.error("expected ']'"));
        }

        match name {
            "Optional" | "List" | "list" if args.len() != 1 => {
                Err(self.error(&format!("{} takes exactly one type argument", name)))
            }
            "Optional" => Ok(Annotation::optional(args.remove(0))),
            "List" | "list" => Ok(Annotation::list(args.remove(0))),
            "Tuple" | "tuple" => Ok(Annotation::Tuple(args)),
            "Union" => Ok(Annotation::Union(args)),
            _ => Ok(Annotation::Generic {
                name: name.to_string(),
                args,
            }),
        }
    }
}
