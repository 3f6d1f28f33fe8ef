//! Constraint expressions over device attributes
//!
//! A constraint is `attribute <op> value`, e.g. `location=x` or
//! `description CONTAINS rack`. Attribute names resolve against a fixed
//! registry per device variant; values compare as upper-cased strings.

use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

use crate::collection::{Device, DeviceVariant};
use crate::topology::{Child, Hub};

/// Value that disables a constraint
pub const WILDCARD: &str = "*";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Invalid constraint {expression:?}: {reason}")]
    ConstraintSyntax { expression: String, reason: String },
    #[error("Unknown {variant} attribute: {name:?}")]
    UnknownAttribute { variant: DeviceVariant, name: String },
}

/// Comparison operator of a constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    /// Observed value is a substring of the expected value
    In,
    /// Expected value is a substring of the observed value
    Contains,
    /// Observed value equals one item of a comma/space separated list
    OneOf,
}

impl Operator {
    /// Operators in matching order; longer tokens come before their prefixes
    const TOKENS: [(&'static str, Operator); 9] = [
        ("CONTAINS", Operator::Contains),
        ("ONEOF", Operator::OneOf),
        ("IN", Operator::In),
        ("!=", Operator::Ne),
        ("<=", Operator::Le),
        (">=", Operator::Ge),
        ("=", Operator::Eq),
        ("<", Operator::Lt),
        (">", Operator::Gt),
    ];

    pub fn token(&self) -> &'static str {
        Self::TOKENS
            .iter()
            .find(|(_, op)| op == self)
            .map(|(token, _)| *token)
            .unwrap_or_default()
    }

    fn is_word(&self) -> bool {
        matches!(self, Operator::In | Operator::Contains | Operator::OneOf)
    }

    /// Match an operator at the start of `input`, returning it and the rest
    fn split_prefix(input: &str) -> Option<(Operator, &str)> {
        Self::TOKENS.iter().find_map(|(token, op)| {
            let head = input.get(..token.len())?;
            let matches = if op.is_word() {
                head.eq_ignore_ascii_case(token)
                    && input[token.len()..]
                        .chars()
                        .next()
                        .map_or(true, char::is_whitespace)
            } else {
                head == *token
            };
            matches.then(|| (*op, &input[token.len()..]))
        })
    }

    /// Apply to upper-cased observed and expected values
    pub fn matches(&self, observed: &str, expected: &str) -> bool {
        let ordering = observed.cmp(expected);
        match self {
            Operator::Eq => ordering == Ordering::Equal,
            Operator::Ne => ordering != Ordering::Equal,
            Operator::Lt => ordering == Ordering::Less,
            Operator::Le => ordering != Ordering::Greater,
            Operator::Gt => ordering == Ordering::Greater,
            Operator::Ge => ordering != Ordering::Less,
            Operator::In => expected.contains(observed),
            Operator::Contains => observed.contains(expected),
            Operator::OneOf => expected
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|item| !item.is_empty())
                .any(|item| item == observed),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A parsed, not yet resolved, constraint expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub attribute: String,
    pub operator: Operator,
    pub value: String,
}

impl Constraint {
    /// Parse `attribute <op> value`.
    ///
    /// Returns `Ok(None)` for an expression that filters nothing: an empty
    /// string, a lone `*`, or any constraint whose value is `*`.
    pub fn parse(expression: &str) -> Result<Option<Self>, QueryError> {
        let trimmed = expression.trim();
        if trimmed.is_empty() || trimmed == WILDCARD {
            return Ok(None);
        }

        let syntax = |reason: &str| QueryError::ConstraintSyntax {
            expression: expression.to_string(),
            reason: reason.to_string(),
        };

        let name_len = trimmed
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(trimmed.len());
        if name_len == 0 {
            return Err(syntax("missing attribute name"));
        }
        let (attribute, rest) = trimmed.split_at(name_len);

        let rest = rest.trim_start();
        let (operator, value) =
            Operator::split_prefix(rest).ok_or_else(|| syntax("no comparison operator"))?;
        let value = value.trim();

        if value == WILDCARD {
            return Ok(None);
        }

        Ok(Some(Self {
            attribute: attribute.to_string(),
            operator,
            value: value.to_string(),
        }))
    }

    /// Bind the attribute name to an accessor of `variant`
    pub fn resolve(&self, variant: DeviceVariant) -> Result<Filter, QueryError> {
        Ok(Filter {
            attribute: Attribute::lookup(variant, &self.attribute)?,
            operator: self.operator,
            expected: self.value.to_uppercase(),
        })
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.operator.is_word() {
            write!(f, "{} {} {}", self.attribute, self.operator, self.value)
        } else {
            write!(f, "{}{}{}", self.attribute, self.operator, self.value)
        }
    }
}

/// A constraint bound to a typed attribute accessor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    attribute: Attribute,
    operator: Operator,
    expected: String,
}

impl Filter {
    /// Whether `device` satisfies the constraint. Devices of the other
    /// variant never do.
    pub fn matches(&self, device: &Device<'_>) -> bool {
        self.attribute
            .extract(device)
            .is_some_and(|observed| self.operator.matches(&observed.to_uppercase(), &self.expected))
    }
}

/// Attribute accessor of either variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Hub(HubAttribute),
    Child(ChildAttribute),
}

impl Attribute {
    pub fn lookup(variant: DeviceVariant, name: &str) -> Result<Self, QueryError> {
        let found = match variant {
            DeviceVariant::Hub => HubAttribute::from_name(name).map(Attribute::Hub),
            DeviceVariant::Child => ChildAttribute::from_name(name).map(Attribute::Child),
        };
        found.ok_or_else(|| QueryError::UnknownAttribute {
            variant,
            name: name.to_string(),
        })
    }

    pub fn extract(&self, device: &Device<'_>) -> Option<String> {
        match (self, device) {
            (Attribute::Hub(attr), Device::Hub(hub)) => Some(attr.extract(hub)),
            (Attribute::Child(attr), Device::Child(child)) => Some(attr.extract(child)),
            _ => None,
        }
    }
}

/// Queryable attributes of a hub
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HubAttribute {
    Name,
    Prefix,
    Site,
    Subsystem,
    Location,
    Kind,
    Id,
    Description,
    Occupied,
}

impl HubAttribute {
    pub const ALL: [HubAttribute; 9] = [
        HubAttribute::Name,
        HubAttribute::Prefix,
        HubAttribute::Site,
        HubAttribute::Subsystem,
        HubAttribute::Location,
        HubAttribute::Kind,
        HubAttribute::Id,
        HubAttribute::Description,
        HubAttribute::Occupied,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HubAttribute::Name => "name",
            HubAttribute::Prefix => "prefix",
            HubAttribute::Site => "site",
            HubAttribute::Subsystem => "subsystem",
            HubAttribute::Location => "location",
            HubAttribute::Kind => "kind",
            HubAttribute::Id => "id",
            HubAttribute::Description => "description",
            HubAttribute::Occupied => "occupied",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|attr| attr.name() == name)
    }

    pub fn extract(&self, hub: &Hub) -> String {
        match self {
            HubAttribute::Name => hub.encode(),
            HubAttribute::Prefix => hub.prefix(),
            HubAttribute::Site => hub.site().to_string(),
            HubAttribute::Subsystem => hub.subsystem().to_string(),
            HubAttribute::Location => hub.location().to_string(),
            HubAttribute::Kind => hub.kind().to_string(),
            HubAttribute::Id => hub.id().to_string(),
            HubAttribute::Description => hub.description().to_string(),
            HubAttribute::Occupied => hub.occupied_count().to_string(),
        }
    }
}

/// Queryable attributes of a child device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildAttribute {
    Name,
    Hub,
    Site,
    Subsystem,
    Location,
    HubKind,
    HubId,
    Port,
    Kind,
    Description,
}

impl ChildAttribute {
    pub const ALL: [ChildAttribute; 10] = [
        ChildAttribute::Name,
        ChildAttribute::Hub,
        ChildAttribute::Site,
        ChildAttribute::Subsystem,
        ChildAttribute::Location,
        ChildAttribute::HubKind,
        ChildAttribute::HubId,
        ChildAttribute::Port,
        ChildAttribute::Kind,
        ChildAttribute::Description,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ChildAttribute::Name => "name",
            ChildAttribute::Hub => "hub",
            ChildAttribute::Site => "site",
            ChildAttribute::Subsystem => "subsystem",
            ChildAttribute::Location => "location",
            ChildAttribute::HubKind => "hub_kind",
            ChildAttribute::HubId => "hub_id",
            ChildAttribute::Port => "port",
            ChildAttribute::Kind => "kind",
            ChildAttribute::Description => "description",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|attr| attr.name() == name)
    }

    pub fn extract(&self, child: &Child<'_>) -> String {
        let hub = child.hub();
        match self {
            ChildAttribute::Name => child.name(),
            ChildAttribute::Hub => hub.prefix(),
            ChildAttribute::Site => hub.site().to_string(),
            ChildAttribute::Subsystem => hub.subsystem().to_string(),
            ChildAttribute::Location => hub.location().to_string(),
            ChildAttribute::HubKind => hub.kind().to_string(),
            ChildAttribute::HubId => hub.id().to_string(),
            ChildAttribute::Port => child.index().to_string(),
            ChildAttribute::Kind => child.kind().to_string(),
            ChildAttribute::Description => child.description().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn parsed(expression: &str) -> Constraint {
        Constraint::parse(expression).unwrap().unwrap()
    }

    #[test]
    fn test_parse_symbolic_operators() {
        let cases = [
            ("location=x", Operator::Eq),
            ("location!=x", Operator::Ne),
            ("port<5", Operator::Lt),
            ("port<=5", Operator::Le),
            ("port>5", Operator::Gt),
            ("port>=5", Operator::Ge),
        ];
        for (expression, operator) in cases {
            let c = parsed(expression);
            assert_eq!(c.operator, operator, "{}", expression);
            assert_eq!(c.value, if c.attribute == "port" { "5" } else { "x" });
        }
    }

    #[test]
    fn test_parse_word_operators() {
        let c = parsed("description CONTAINS test stand");
        assert_eq!(c.attribute, "description");
        assert_eq!(c.operator, Operator::Contains);
        assert_eq!(c.value, "test stand");

        let c = parsed("kind in IRIGB,CFC");
        assert_eq!(c.operator, Operator::In);
        assert_eq!(c.value, "IRIGB,CFC");

        let c = parsed("kind ONEOF irigb cfc");
        assert_eq!(c.operator, Operator::OneOf);
    }

    #[test]
    fn test_parse_spacing_and_value_with_operator_chars() {
        let c = parsed("  description = a=b  ");
        assert_eq!(c.attribute, "description");
        assert_eq!(c.operator, Operator::Eq);
        assert_eq!(c.value, "a=b");

        // Word operators need a boundary, so this is an attribute named "kindIN"
        let err = Constraint::parse("kindINx").unwrap_err();
        assert!(matches!(err, QueryError::ConstraintSyntax { .. }));
    }

    #[test]
    fn test_parse_wildcards() {
        assert_eq!(Constraint::parse("").unwrap(), None);
        assert_eq!(Constraint::parse("   ").unwrap(), None);
        assert_eq!(Constraint::parse("*").unwrap(), None);
        assert_eq!(Constraint::parse("location=*").unwrap(), None);
        assert_eq!(Constraint::parse("nonsense = *").unwrap(), None);
    }

    #[test]
    fn test_parse_syntax_errors() {
        for expression in ["location", "location ~ x", "=x", "location x", "-port=3"] {
            assert!(
                matches!(
                    Constraint::parse(expression),
                    Err(QueryError::ConstraintSyntax { .. })
                ),
                "{}",
                expression
            );
        }
    }

    #[test]
    fn test_resolve_unknown_attribute() {
        let err = parsed("port=3").resolve(DeviceVariant::Hub).unwrap_err();
        assert_eq!(
            err,
            QueryError::UnknownAttribute {
                variant: DeviceVariant::Hub,
                name: "port".to_string()
            }
        );
        assert!(parsed("port=3").resolve(DeviceVariant::Child).is_ok());
    }

    #[test]
    fn test_operator_semantics() {
        assert!(Operator::Eq.matches("X", "X"));
        assert!(Operator::Lt.matches("10", "5"));
        assert!(Operator::Ge.matches("C", "C"));
        assert!(Operator::Contains.matches("IRIG-B", "IRIG"));
        assert!(!Operator::Contains.matches("IRIG", "IRIG-B"));
        assert!(Operator::In.matches("IRIG", "IRIG-B"));
        assert!(Operator::In.matches("CFC", "IRIGB,CFC"));
        // substring, not membership
        assert!(Operator::In.matches("FAN", "FANOUT"));
        assert!(!Operator::OneOf.matches("FAN", "FANOUT"));
        assert!(Operator::OneOf.matches("CFC", "IRIGB, CFC"));
    }

    #[test]
    fn test_display_reparses() {
        for expression in ["location=X", "port>=3", "kind IN IRIGB,CFC"] {
            let c = parsed(expression);
            assert_eq!(c.to_string(), expression);
            assert_eq!(parsed(&c.to_string()), c);
        }
    }

    #[test]
    fn test_registry_names_unique() {
        let hub: HashSet<_> = HubAttribute::ALL.iter().map(|a| a.name()).collect();
        assert_eq!(hub.len(), HubAttribute::ALL.len());
        let child: HashSet<_> = ChildAttribute::ALL.iter().map(|a| a.name()).collect();
        assert_eq!(child.len(), ChildAttribute::ALL.len());
    }
}
