//! Principals and personas

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A capacity a user can act under. Claiming a persona is only honored when a
/// linked account record of the matching kind exists for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Persona {
    Lawyer,
    Customer,
}

impl Persona {
    pub fn as_str(&self) -> &'static str {
        match self {
            Persona::Lawyer => "LAWYER",
            Persona::Customer => "CUSTOMER",
        }
    }

    /// Parse an attribute code from storage. Unknown codes are not personas.
    pub fn from_code(code: &str) -> Option<Persona> {
        match code {
            "LAWYER" => Some(Persona::Lawyer),
            "CUSTOMER" => Some(Persona::Customer),
            _ => None,
        }
    }
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute row from the `attributes` table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Attribute {
    pub id: Uuid,
    pub code: String,
}

impl Attribute {
    pub fn persona(&self) -> Option<Persona> {
        Persona::from_code(&self.code)
    }
}

/// The principal's active persona, resolved from its attribute id at
/// authentication time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonaAttribute {
    pub attribute_id: Uuid,
    pub persona: Persona,
}

/// The acting identity for one request. Constructed per request, never
/// persisted. When `attribute` is absent only persona-agnostic grants apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub role_id: Uuid,
    pub attribute: Option<PersonaAttribute>,
}

impl Principal {
    pub fn new(user_id: Uuid, role_id: Uuid) -> Self {
        Self {
            user_id,
            role_id,
            attribute: None,
        }
    }

    pub fn with_persona(user_id: Uuid, role_id: Uuid, attribute_id: Uuid, persona: Persona) -> Self {
        Self {
            user_id,
            role_id,
            attribute: Some(PersonaAttribute {
                attribute_id,
                persona,
            }),
        }
    }

    pub fn attribute_id(&self) -> Option<Uuid> {
        self.attribute.as_ref().map(|a| a.attribute_id)
    }

    pub fn persona(&self) -> Option<Persona> {
        self.attribute.as_ref().map(|a| a.persona)
    }
}
