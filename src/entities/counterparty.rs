use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};
use uuid::Uuid;

/// Role tags a counterparty may carry. A counterparty can be both a client
/// and a vendor; it must carry at least one role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum CounterpartyRole {
    Client,
    Vendor,
}

const ROLE_DELIMITER: char = ',';

/// A client or vendor. Roles are persisted as a comma-delimited tag string
/// (e.g. `"CLIENT,VENDOR"`) and consumed as an enum set by the processors.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "counterparties")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub roles: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Parses the stored tag string into a role set. Unknown tags are
    /// ignored; a row written by this crate always contains at least one
    /// valid tag.
    pub fn roles(&self) -> Vec<CounterpartyRole> {
        parse_roles(&self.roles)
    }

    pub fn has_role(&self, role: CounterpartyRole) -> bool {
        self.roles().contains(&role)
    }
}

pub fn parse_roles(raw: &str) -> Vec<CounterpartyRole> {
    let mut roles = Vec::new();
    for tag in raw.split(ROLE_DELIMITER) {
        if let Ok(role) = CounterpartyRole::from_str(tag.trim()) {
            if !roles.contains(&role) {
                roles.push(role);
            }
        }
    }
    roles
}

pub fn render_roles(roles: &[CounterpartyRole]) -> String {
    roles
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(&ROLE_DELIMITER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_delimited_role_tags() {
        assert_eq!(
            parse_roles("CLIENT,VENDOR"),
            vec![CounterpartyRole::Client, CounterpartyRole::Vendor]
        );
        assert_eq!(parse_roles(" VENDOR "), vec![CounterpartyRole::Vendor]);
    }

    #[test]
    fn ignores_unknown_and_duplicate_tags() {
        assert_eq!(
            parse_roles("CLIENT,SUPPLIER,CLIENT"),
            vec![CounterpartyRole::Client]
        );
        assert!(parse_roles("").is_empty());
    }

    #[test]
    fn renders_role_set_back_to_tags() {
        let tags = render_roles(&[CounterpartyRole::Client, CounterpartyRole::Vendor]);
        assert_eq!(tags, "CLIENT,VENDOR");
        assert_eq!(parse_roles(&tags).len(), 2);
    }

    #[test]
    fn has_role_checks_membership() {
        let model = Model {
            id: Uuid::new_v4(),
            name: "Acme Supplies".to_string(),
            email: None,
            phone: None,
            address: None,
            roles: "VENDOR".to_string(),
            created_at: Utc::now(),
            updated_at: None,
        };
        assert!(model.has_role(CounterpartyRole::Vendor));
        assert!(!model.has_role(CounterpartyRole::Client));
    }
}
