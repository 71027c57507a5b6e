use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::diligence::{decode_string_list, Diligence, Priority, Status};

/// One recipient or several; both shapes are sent by clients.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Recipients {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Recipients::One(single) if single.trim().is_empty() => Vec::new(),
            Recipients::One(single) => vec![single],
            Recipients::Many(many) => many,
        }
    }
}

/// Full diligence record as sent on create and on replace.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiligencePayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "Le titre est requis"))]
    pub titre: String,
    #[serde(default, alias = "directiondestinataire", alias = "direction")]
    #[validate(length(min = 1, message = "La direction destinataire est requise"))]
    pub direction_destinataire: String,
    #[serde(alias = "datedebut")]
    #[validate(required(message = "La date de début est requise"))]
    pub date_debut: Option<NaiveDate>,
    #[serde(alias = "datefin")]
    #[validate(required(message = "La date de fin est requise"))]
    pub date_fin: Option<NaiveDate>,
    #[serde(default)]
    #[validate(length(min = 1, message = "La description est requise"))]
    pub description: String,
    pub priorite: Option<Priority>,
    pub statut: Option<Status>,
    #[schema(value_type = Option<Vec<String>>)]
    pub destinataire: Option<Recipients>,
    #[serde(alias = "piecesjointes")]
    pub pieces_jointes: Option<Vec<String>>,
    #[validate(range(min = 0, max = 100, message = "La progression doit être comprise entre 0 et 100"))]
    pub progression: Option<i64>,
    #[serde(alias = "created_by")]
    pub created_by: Option<i64>,
    #[serde(alias = "assigned_to")]
    pub assigned_to: Option<i64>,
}

/// A payload that passed validation, with defaults filled in.
#[derive(Debug, Clone)]
pub struct DiligenceRecord {
    pub titre: String,
    pub direction_destinataire: String,
    pub date_debut: NaiveDate,
    pub date_fin: NaiveDate,
    pub description: String,
    pub priorite: Priority,
    pub statut: Status,
    pub destinataire: Vec<String>,
    pub pieces_jointes: Vec<String>,
    pub progression: i64,
    pub created_by: Option<i64>,
    pub assigned_to: Option<i64>,
}

impl DiligencePayload {
    pub fn into_record(self) -> crate::error::Result<DiligenceRecord> {
        self.validate()?;
        let (Some(date_debut), Some(date_fin)) = (self.date_debut, self.date_fin) else {
            return Err(crate::error::Error::BadRequest(
                "Tous les champs obligatoires sont requis".to_string(),
            ));
        };
        Ok(DiligenceRecord {
            titre: self.titre,
            direction_destinataire: self.direction_destinataire,
            date_debut,
            date_fin,
            description: self.description,
            priorite: self.priorite.unwrap_or_default(),
            statut: self.statut.unwrap_or_default(),
            destinataire: self.destinataire.map(Recipients::into_vec).unwrap_or_default(),
            pieces_jointes: self.pieces_jointes.unwrap_or_default(),
            progression: self.progression.unwrap_or(0),
            created_by: self.created_by,
            assigned_to: self.assigned_to,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DiligenceResponse {
    pub id: i64,
    pub titre: String,
    pub direction_destinataire: String,
    pub date_debut: NaiveDate,
    pub date_fin: NaiveDate,
    pub description: String,
    pub priorite: Priority,
    pub statut: Status,
    pub destinataire: Vec<String>,
    pub pieces_jointes: Vec<String>,
    pub progression: i64,
    pub created_by: Option<i64>,
    pub assigned_to: Option<i64>,
    pub created_by_name: Option<String>,
    pub assigned_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Diligence> for DiligenceResponse {
    fn from(value: Diligence) -> Self {
        Self {
            id: value.id,
            titre: value.titre,
            direction_destinataire: value.direction_destinataire,
            date_debut: value.date_debut,
            date_fin: value.date_fin,
            description: value.description,
            priorite: value.priorite,
            statut: value.statut,
            destinataire: decode_string_list(&value.destinataire),
            pieces_jointes: decode_string_list(&value.pieces_jointes),
            progression: value.progression,
            created_by: value.created_by,
            assigned_to: value.assigned_to,
            created_by_name: value.created_by_name,
            assigned_name: value.assigned_name,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct DiligenceListQuery {
    /// Case-insensitive match on title, direction or recipients.
    pub search: Option<String>,
    #[param(value_type = Option<String>)]
    pub statut: Option<Status>,
    #[param(value_type = Option<String>)]
    pub priorite: Option<Priority>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total: i64,
    pub by_status: BTreeMap<String, i64>,
    pub by_priority: BTreeMap<String, i64>,
    pub average_progression: f64,
}
