//! PostgreSQL product catalog.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::catalog::{CurrencyCode, Price, Product, ProductCode, ProductConstraints};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::ProductCatalog;

pub struct PostgresProductCatalog {
    pool: PgPool,
}

impl PostgresProductCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    code: String,
    price_amount_minor: i64,
    currency_code: String,
    max_participants: Option<i32>,
    max_club_members: Option<i32>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DomainError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let code = ProductCode::new(row.code)
            .map_err(|e| DomainError::new(ErrorCode::ValidationFailed, e.to_string()))?;
        let currency_code = CurrencyCode::parse(&row.currency_code)
            .map_err(|e| DomainError::new(ErrorCode::ValidationFailed, e.to_string()))?;

        Ok(Product {
            code,
            price: Price::new(row.price_amount_minor, currency_code),
            constraints: ProductConstraints {
                max_participants: row.max_participants.map(|v| v as u32),
                max_club_members: row.max_club_members.map(|v| v as u32),
            },
        })
    }
}

#[async_trait]
impl ProductCatalog for PostgresProductCatalog {
    async fn get_product(&self, code: &ProductCode) -> Result<Option<Product>, DomainError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT code, price_amount_minor, currency_code, max_participants, max_club_members
            FROM products
            WHERE code = $1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::new(ErrorCode::DatabaseError, format!("database error: {}", e)))?;

        row.map(Product::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_maps_to_product() {
        let row = ProductRow {
            code: "EVENT_UPGRADE_500".to_string(),
            price_amount_minor: 49_00,
            currency_code: "EUR".to_string(),
            max_participants: Some(500),
            max_club_members: None,
        };

        let product = Product::try_from(row).unwrap();

        assert_eq!(product.code.as_str(), "EVENT_UPGRADE_500");
        assert_eq!(product.price.currency_code, CurrencyCode::Eur);
        assert_eq!(product.max_participants(), Some(500));
    }

    #[test]
    fn unknown_currency_fails_validation() {
        let row = ProductRow {
            code: "EVENT_UPGRADE_500".to_string(),
            price_amount_minor: 49_00,
            currency_code: "XXX".to_string(),
            max_participants: None,
            max_club_members: None,
        };

        let err = Product::try_from(row).unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }
}
