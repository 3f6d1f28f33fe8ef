//! Translation of command-line filters into constraint expressions

use anyhow::Result;
use geco_core::DeviceKind;

/// Attribute filters given on the command line
#[derive(Debug, Clone, Default)]
pub struct Filters {
    pub site: Option<String>,
    pub subsystem: Option<String>,
    pub location: Option<String>,
    pub hub_kind: Option<String>,
    pub hub_id: Option<String>,
    pub port: Option<u8>,
    pub device_kind: Option<String>,
    /// Raw expressions for the hub selection
    pub hub_where: Vec<String>,
    /// Raw expressions for the child selection
    pub child_where: Vec<String>,
}

impl Filters {
    /// Expressions selecting hubs
    pub fn hub_constraints(&self) -> Vec<String> {
        let mut constraints = self.shared_constraints();
        push_eq(&mut constraints, "kind", self.hub_kind.as_deref());
        push_eq(&mut constraints, "id", self.hub_id.as_deref());
        constraints.extend(self.hub_where.iter().cloned());
        constraints
    }

    /// Expressions selecting children
    pub fn child_constraints(&self) -> Result<Vec<String>> {
        let mut constraints = self.shared_constraints();
        push_eq(&mut constraints, "hub_kind", self.hub_kind.as_deref());
        push_eq(&mut constraints, "hub_id", self.hub_id.as_deref());
        if let Some(port) = self.port {
            constraints.push(format!("port={}", port));
        }
        if let Some(kind) = &self.device_kind {
            let kind: DeviceKind = kind.parse()?;
            constraints.push(format!("kind={}", kind));
        }
        constraints.extend(self.child_where.iter().cloned());
        Ok(constraints)
    }

    fn shared_constraints(&self) -> Vec<String> {
        let mut constraints = Vec::new();
        push_eq(&mut constraints, "site", self.site.as_deref());
        push_eq(&mut constraints, "subsystem", self.subsystem.as_deref());
        push_eq(&mut constraints, "location", self.location.as_deref());
        constraints
    }
}

fn push_eq(constraints: &mut Vec<String>, attribute: &str, value: Option<&str>) {
    if let Some(value) = value {
        constraints.push(format!("{}={}", attribute, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filters() {
        let filters = Filters::default();
        assert!(filters.hub_constraints().is_empty());
        assert!(filters.child_constraints().unwrap().is_empty());
    }

    #[test]
    fn test_translation() {
        let filters = Filters {
            site: Some("h1".to_string()),
            location: Some("x".to_string()),
            hub_kind: Some("f".to_string()),
            port: Some(4),
            device_kind: Some("i".to_string()),
            child_where: vec!["description CONTAINS ex".to_string()],
            ..Default::default()
        };
        assert_eq!(
            filters.hub_constraints(),
            vec!["site=h1", "location=x", "kind=f"]
        );
        assert_eq!(
            filters.child_constraints().unwrap(),
            vec![
                "site=h1",
                "location=x",
                "hub_kind=f",
                "port=4",
                "kind=IRIGB",
                "description CONTAINS ex"
            ]
        );
    }

    #[test]
    fn test_unknown_device_kind() {
        let filters = Filters {
            device_kind: Some("q".to_string()),
            ..Default::default()
        };
        assert!(filters.child_constraints().is_err());
    }
}
