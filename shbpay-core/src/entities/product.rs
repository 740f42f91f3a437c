//! Catalog lookup. The `products` table belongs to the storefront; this
//! core only ever reads a single row by id to snapshot title and price.

use kanau::processor::Processor;
use uuid::Uuid;

use crate::framework::DatabaseProcessor;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub title: String,
    pub price: rust_decimal::Decimal,
}

#[derive(Debug, Clone)]
pub struct GetProductById {
    pub product_id: Uuid,
}

impl Processor<GetProductById> for DatabaseProcessor {
    type Output = Option<Product>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetProductById")]
    async fn process(&self, query: GetProductById) -> Result<Option<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>("SELECT id, title, price FROM products WHERE id = $1")
            .bind(query.product_id)
            .fetch_optional(&self.pool)
            .await
    }
}
