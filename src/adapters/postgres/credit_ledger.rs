//! PostgreSQL credit ledger.
//!
//! Exactly-once semantics live in two places here:
//!
//! - Issuance relies on the unique index on `source_transaction_id`; the
//!   constraint violation is translated to `DuplicateIssuance` so callers
//!   can treat redelivered payment confirmations as no-ops.
//! - Consumption is a single conditional UPDATE whose subselect locks one
//!   available row with `FOR UPDATE SKIP LOCKED`. Concurrent claims for the
//!   same last credit do not block each other; exactly one gets the row and
//!   the rest see no match, which surfaces as `NoCreditAvailable`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::billing::{Credit, CreditStatus, LedgerError};
use crate::domain::catalog::ProductCode;
use crate::domain::foundation::{
    CreditId, ResourceId, Timestamp, TransactionId, UserId,
};
use crate::ports::CreditLedger;

const SOURCE_TRANSACTION_UNIQUE: &str = "credits_source_transaction_id_key";

pub struct PostgresCreditLedger {
    pool: PgPool,
}

impl PostgresCreditLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CreditRow {
    id: Uuid,
    user_id: Uuid,
    credit_code: String,
    source_transaction_id: Uuid,
    status: String,
    consumed_resource_id: Option<Uuid>,
    consumed_at: Option<DateTime<Utc>>,
    issued_at: DateTime<Utc>,
}

impl TryFrom<CreditRow> for Credit {
    type Error = LedgerError;

    fn try_from(row: CreditRow) -> Result<Self, Self::Error> {
        let status = match row.status.as_str() {
            "available" => CreditStatus::Available,
            "consumed" => CreditStatus::Consumed,
            other => {
                return Err(LedgerError::infrastructure(format!(
                    "credit {} has unknown status '{}'",
                    row.id, other
                )))
            }
        };
        let credit_code = ProductCode::new(row.credit_code)
            .map_err(|e| LedgerError::infrastructure(format!("stored credit code: {}", e)))?;

        Ok(Credit {
            id: CreditId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            credit_code,
            source_transaction_id: TransactionId::from_uuid(row.source_transaction_id),
            status,
            consumed_resource_id: row.consumed_resource_id.map(ResourceId::from_uuid),
            consumed_at: row.consumed_at.map(Timestamp::from_datetime),
            issued_at: Timestamp::from_datetime(row.issued_at),
        })
    }
}

fn map_sqlx_err(err: sqlx::Error) -> LedgerError {
    LedgerError::infrastructure(format!("database error: {}", err))
}

#[async_trait]
impl CreditLedger for PostgresCreditLedger {
    async fn issue(
        &self,
        user_id: UserId,
        credit_code: &ProductCode,
        source_transaction_id: TransactionId,
    ) -> Result<Credit, LedgerError> {
        let row = sqlx::query_as::<_, CreditRow>(
            r#"
            INSERT INTO credits (id, user_id, credit_code, source_transaction_id, status, issued_at)
            VALUES ($1, $2, $3, $4, 'available', now())
            RETURNING id, user_id, credit_code, source_transaction_id, status,
                      consumed_resource_id, consumed_at, issued_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id.as_uuid())
        .bind(credit_code.as_str())
        .bind(source_transaction_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db_err)
                if db_err.constraint() == Some(SOURCE_TRANSACTION_UNIQUE) =>
            {
                LedgerError::duplicate_issuance(source_transaction_id)
            }
            _ => map_sqlx_err(err),
        })?;

        row.try_into()
    }

    async fn has_available(
        &self,
        user_id: UserId,
        credit_code: &ProductCode,
    ) -> Result<bool, LedgerError> {
        let exists: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM credits
                WHERE user_id = $1 AND credit_code = $2 AND status = 'available'
            )
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(credit_code.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        Ok(exists.0)
    }

    async fn list_available(
        &self,
        user_id: UserId,
        credit_code: &ProductCode,
    ) -> Result<Vec<Credit>, LedgerError> {
        let rows = sqlx::query_as::<_, CreditRow>(
            r#"
            SELECT id, user_id, credit_code, source_transaction_id, status,
                   consumed_resource_id, consumed_at, issued_at
            FROM credits
            WHERE user_id = $1 AND credit_code = $2 AND status = 'available'
            ORDER BY issued_at ASC
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(credit_code.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        rows.into_iter().map(Credit::try_from).collect()
    }

    async fn consume(
        &self,
        user_id: UserId,
        credit_code: &ProductCode,
        resource_id: ResourceId,
    ) -> Result<Credit, LedgerError> {
        if resource_id.is_nil() {
            return Err(LedgerError::MissingConsumedResource);
        }

        let row = sqlx::query_as::<_, CreditRow>(
            r#"
            UPDATE credits
            SET status = 'consumed', consumed_resource_id = $3, consumed_at = now()
            WHERE id = (
                SELECT id FROM credits
                WHERE user_id = $1 AND credit_code = $2 AND status = 'available'
                ORDER BY issued_at ASC
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING id, user_id, credit_code, source_transaction_id, status,
                      consumed_resource_id, consumed_at, issued_at
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(credit_code.as_str())
        .bind(resource_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        match row {
            Some(row) => row.try_into(),
            None => Err(LedgerError::no_credit_available(credit_code.clone())),
        }
    }

    async fn find_consumed_for_resource(
        &self,
        resource_id: ResourceId,
    ) -> Result<Option<Credit>, LedgerError> {
        let row = sqlx::query_as::<_, CreditRow>(
            r#"
            SELECT id, user_id, credit_code, source_transaction_id, status,
                   consumed_resource_id, consumed_at, issued_at
            FROM credits
            WHERE consumed_resource_id = $1
            "#,
        )
        .bind(resource_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_err)?;

        row.map(Credit::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str) -> CreditRow {
        CreditRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            credit_code: "EVENT_UPGRADE_500".to_string(),
            source_transaction_id: Uuid::new_v4(),
            status: status.to_string(),
            consumed_resource_id: None,
            consumed_at: None,
            issued_at: Utc::now(),
        }
    }

    #[test]
    fn row_maps_available_status() {
        let credit = Credit::try_from(row("available")).unwrap();
        assert_eq!(credit.status, CreditStatus::Available);
        assert!(credit.consumed_resource_id.is_none());
    }

    #[test]
    fn row_maps_consumed_binding() {
        let mut raw = row("consumed");
        let resource = Uuid::new_v4();
        raw.consumed_resource_id = Some(resource);
        raw.consumed_at = Some(Utc::now());

        let credit = Credit::try_from(raw).unwrap();

        assert_eq!(credit.status, CreditStatus::Consumed);
        assert_eq!(
            credit.consumed_resource_id,
            Some(ResourceId::from_uuid(resource))
        );
        assert!(credit.consumed_at.is_some());
    }

    #[test]
    fn unknown_status_is_an_infrastructure_error() {
        let err = Credit::try_from(row("refunded")).unwrap_err();
        assert!(matches!(err, LedgerError::Infrastructure(_)));
    }
}
