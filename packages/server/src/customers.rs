use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};

use crate::entity::customer;

/// Resolves customer identifiers to display names.
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    /// Return the names of the customers whose ids are in `ids`.
    ///
    /// Ids with no matching customer are simply absent from the map.
    async fn names_by_ids(&self, ids: &[i32]) -> Result<HashMap<i32, String>, DbErr>;
}

/// Customer lookup against the relational `customer` table.
#[derive(Clone)]
pub struct SeaOrmCustomerDirectory {
    db: DatabaseConnection,
}

impl SeaOrmCustomerDirectory {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CustomerDirectory for SeaOrmCustomerDirectory {
    async fn names_by_ids(&self, ids: &[i32]) -> Result<HashMap<i32, String>, DbErr> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let customers = customer::Entity::find()
            .filter(customer::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await?;

        Ok(customers.into_iter().map(|c| (c.id, c.name)).collect())
    }
}
