use std::collections::BTreeMap;

use chrono::Utc;

use crate::database::{delete_by_id, Database, Deletable, DeletionPolicy};
use crate::dto::diligence_dto::{DashboardStats, DiligenceListQuery, DiligenceRecord};
use crate::error::{Error, Result};
use crate::models::diligence::{decode_string_list, encode_string_list, Diligence, Priority, Status};

const DEFAULT_PER_PAGE: i64 = 20;
const MAX_PER_PAGE: i64 = 100;

const SELECT_DILIGENCE: &str = r#"
    SELECT d.id, d.titre,
           d.directiondestinataire AS direction_destinataire,
           d.datedebut AS date_debut,
           d.datefin AS date_fin,
           d.description, d.priorite, d.statut, d.destinataire,
           d.piecesjointes AS pieces_jointes,
           d.progression, d.created_by, d.assigned_to,
           creator.name AS created_by_name,
           assignee.name AS assigned_name,
           d.created_at, d.updated_at
    FROM diligences d
    LEFT JOIN users assignee ON d.assigned_to = assignee.id
    LEFT JOIN users creator ON d.created_by = creator.id
"#;

impl Deletable for Diligence {
    const TABLE: &'static str = "diligences";
    const POLICY: DeletionPolicy = DeletionPolicy::Hard;
    const NOT_FOUND: &'static str = "Diligence non trouvée";
}

fn diligence_not_found() -> Error {
    Error::NotFound(<Diligence as Deletable>::NOT_FOUND.to_string())
}

/// `(limit, offset)` when the query asks for a page. `per_page` is clamped
/// to 1..=100 and the offset saturates instead of overflowing.
fn page_window(query: &DiligenceListQuery) -> Option<(i64, i64)> {
    if query.page.is_none() && query.per_page.is_none() {
        return None;
    }
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
    Some((per_page, (page - 1).saturating_mul(per_page)))
}

/// `needle` is already lowercased. Matches title, direction or any recipient.
fn matches_search(diligence: &Diligence, needle: &str) -> bool {
    diligence.titre.to_lowercase().contains(needle)
        || diligence.direction_destinataire.to_lowercase().contains(needle)
        || decode_string_list(&diligence.destinataire)
            .iter()
            .any(|r| r.to_lowercase().contains(needle))
}

#[derive(Clone)]
pub struct DiligenceService {
    db: Database,
}

impl DiligenceService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn list_all(&self) -> Result<Vec<Diligence>> {
        self.list(DiligenceListQuery::default()).await
    }

    /// Newest first. Pagination applies only when `page` or `per_page` is
    /// given.
    ///
    /// `statut` and `priorite` filter in SQL. `search` is matched here with
    /// Unicode case folding, since SQLite's `LOWER` and `LIKE` fold ASCII
    /// only; pagination then runs over the matches.
    pub async fn list(&self, query: DiligenceListQuery) -> Result<Vec<Diligence>> {
        let mut filters = Vec::new();
        let mut args: Vec<&'static str> = Vec::new();

        if let Some(statut) = query.statut {
            filters.push("d.statut = ?");
            args.push(statut.as_str());
        }
        if let Some(priorite) = query.priorite {
            filters.push("d.priorite = ?");
            args.push(priorite.as_str());
        }

        let where_clause = if filters.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", filters.join(" AND "))
        };

        let needle = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);
        let window = page_window(&query);

        let mut sql = format!(
            "{} {} ORDER BY d.created_at DESC, d.id DESC",
            SELECT_DILIGENCE, where_clause
        );
        let sql_window = window.filter(|_| needle.is_none());
        if sql_window.is_some() {
            sql.push_str(" LIMIT ? OFFSET ?");
        }

        let mut statement = sqlx::query_as::<_, Diligence>(&sql);
        for value in args {
            statement = statement.bind(value);
        }
        if let Some((limit, offset)) = sql_window {
            statement = statement.bind(limit).bind(offset);
        }

        let pool = self.db.pool().await?;
        let items = statement.fetch_all(pool).await?;

        let Some(needle) = needle else {
            return Ok(items);
        };
        let matches = items.into_iter().filter(|d| matches_search(d, &needle));
        Ok(match window {
            Some((limit, offset)) => matches
                .skip(usize::try_from(offset).unwrap_or(usize::MAX))
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .collect(),
            None => matches.collect(),
        })
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Diligence> {
        let pool = self.db.pool().await?;
        sqlx::query_as::<_, Diligence>(&format!("{} WHERE d.id = ?", SELECT_DILIGENCE))
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or_else(diligence_not_found)
    }

    pub async fn create(&self, record: DiligenceRecord) -> Result<i64> {
        let pool = self.db.pool().await?;
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO diligences (
                titre, directiondestinataire, datedebut, datefin, description,
                priorite, statut, destinataire, piecesjointes, progression,
                created_by, assigned_to, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.titre)
        .bind(&record.direction_destinataire)
        .bind(record.date_debut)
        .bind(record.date_fin)
        .bind(&record.description)
        .bind(record.priorite.as_str())
        .bind(record.statut.as_str())
        .bind(encode_string_list(&record.destinataire))
        .bind(encode_string_list(&record.pieces_jointes))
        .bind(record.progression)
        .bind(record.created_by)
        .bind(record.assigned_to)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await?;

        let id = result.last_insert_rowid();
        tracing::info!(diligence_id = id, "diligence created");
        Ok(id)
    }

    /// Replaces every editable field of the diligence. A missing id leaves
    /// the table untouched.
    pub async fn replace(&self, id: i64, record: DiligenceRecord) -> Result<()> {
        let pool = self.db.pool().await?;
        let result = sqlx::query(
            r#"
            UPDATE diligences
            SET titre = ?, directiondestinataire = ?, datedebut = ?, datefin = ?, description = ?,
                priorite = ?, statut = ?, destinataire = ?, piecesjointes = ?, progression = ?,
                created_by = ?, assigned_to = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&record.titre)
        .bind(&record.direction_destinataire)
        .bind(record.date_debut)
        .bind(record.date_fin)
        .bind(&record.description)
        .bind(record.priorite.as_str())
        .bind(record.statut.as_str())
        .bind(encode_string_list(&record.destinataire))
        .bind(encode_string_list(&record.pieces_jointes))
        .bind(record.progression)
        .bind(record.created_by)
        .bind(record.assigned_to)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(diligence_not_found());
        }
        tracing::info!(diligence_id = id, "diligence updated");
        Ok(())
    }

    /// Removes the row permanently.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let pool = self.db.pool().await?;
        let mut tx = pool.begin().await?;
        delete_by_id::<Diligence>(&mut tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn stats(&self) -> Result<DashboardStats> {
        let pool = self.db.pool().await?;

        let status_rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT statut, COUNT(*) FROM diligences GROUP BY statut")
                .fetch_all(pool)
                .await?;
        let priority_rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT priorite, COUNT(*) FROM diligences GROUP BY priorite")
                .fetch_all(pool)
                .await?;
        let (total, average): (i64, Option<f64>) =
            sqlx::query_as("SELECT COUNT(*), AVG(progression) FROM diligences")
                .fetch_one(pool)
                .await?;

        let mut by_status: BTreeMap<String, i64> = Status::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();
        by_status.extend(status_rows);

        let mut by_priority: BTreeMap<String, i64> = Priority::ALL
            .iter()
            .map(|p| (p.as_str().to_string(), 0))
            .collect();
        by_priority.extend(priority_rows);

        Ok(DashboardStats {
            total,
            by_status,
            by_priority,
            average_progression: average.unwrap_or(0.0),
        })
    }
}
