use sqlx::PgPool;

/// Processing target for the database-backed [`kanau::processor::Processor`]
/// messages defined in [`crate::entities`].
pub struct DatabaseProcessor {
    pub pool: PgPool,
}
