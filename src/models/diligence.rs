use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use super::user::UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
pub enum Priority {
    Haute,
    #[default]
    Moyenne,
    Basse,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Haute, Priority::Moyenne, Priority::Basse];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Haute => "Haute",
            Priority::Moyenne => "Moyenne",
            Priority::Basse => "Basse",
        }
    }
}

impl TryFrom<String> for Priority {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str() == value)
            .ok_or(UnknownVariant { kind: "priority", value })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
pub enum Status {
    #[default]
    #[serde(rename = "Planifié")]
    Planifie,
    #[serde(rename = "En cours")]
    EnCours,
    #[serde(rename = "Terminé")]
    Termine,
    #[serde(rename = "En retard")]
    EnRetard,
}

impl Status {
    pub const ALL: [Status; 4] = [
        Status::Planifie,
        Status::EnCours,
        Status::Termine,
        Status::EnRetard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Planifie => "Planifié",
            Status::EnCours => "En cours",
            Status::Termine => "Terminé",
            Status::EnRetard => "En retard",
        }
    }
}

impl TryFrom<String> for Status {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Status::ALL
            .into_iter()
            .find(|s| s.as_str() == value)
            .ok_or(UnknownVariant { kind: "status", value })
    }
}

/// A `diligences` row joined with the names of its creator and assignee.
///
/// `destinataire` and `pieces_jointes` hold JSON arrays as text.
#[derive(Debug, Clone, FromRow)]
pub struct Diligence {
    pub id: i64,
    pub titre: String,
    pub direction_destinataire: String,
    pub date_debut: NaiveDate,
    pub date_fin: NaiveDate,
    pub description: String,
    #[sqlx(try_from = "String")]
    pub priorite: Priority,
    #[sqlx(try_from = "String")]
    pub statut: Status,
    pub destinataire: String,
    pub pieces_jointes: String,
    pub progression: i64,
    pub created_by: Option<i64>,
    pub assigned_to: Option<i64>,
    pub created_by_name: Option<String>,
    pub assigned_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Decodes a stored JSON array of strings. Rows written before recipients
/// were stored as arrays hold a bare string, which becomes a one-element
/// list.
pub fn decode_string_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<String>>(trimmed) {
        Ok(items) => items,
        Err(_) => vec![trimmed.to_string()],
    }
}

pub fn encode_string_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}
