//! Order Repository
//!
//! Status changes use compare-and-set queries so that concurrent payment
//! notifications cannot double-apply a transition. Orders are keyed by their
//! UUID; reads project `record::id(id)` back to a plain string, or use an
//! id-less row struct and re-attach the known key.

use super::{BaseRepository, RepoError, RepoResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{Order, OrderStatus};
use shared::util::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

// `order` is a reserved word in SurrealQL
const TABLE: &str = "purchase_order";

/// Order fields as stored in the table, without the record id
#[derive(Debug, Serialize, Deserialize)]
struct OrderData {
    photo_ids: Vec<String>,
    total_amount: Decimal,
    buyer_email: Option<String>,
    status: OrderStatus,
    provider_reference: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl OrderData {
    fn into_order(self, id: String) -> Order {
        Order {
            id,
            photo_ids: self.photo_ids,
            total_amount: self.total_amount,
            buyer_email: self.buyer_email,
            status: self.status,
            provider_reference: self.provider_reference,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<&Order> for OrderData {
    fn from(order: &Order) -> Self {
        Self {
            photo_ids: order.photo_ids.clone(),
            total_amount: order.total_amount,
            buyer_email: order.buyer_email.clone(),
            status: order.status,
            provider_reference: order.provider_reference.clone(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let id = order.id.clone();
        let data = OrderData::from(&order);
        let created: Option<OrderData> = self
            .base
            .db()
            .create((TABLE, id.as_str()))
            .content(data)
            .await?;
        created
            .map(|d| d.into_order(id.clone()))
            .ok_or_else(|| RepoError::Duplicate(format!("Order {} already exists", id)))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let data: Option<OrderData> = self.base.db().select((TABLE, id)).await?;
        Ok(data.map(|d| d.into_order(id.to_string())))
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Order>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT *, record::id(id) AS id FROM type::table($table) \
                 ORDER BY created_at DESC",
            )
            .bind(("table", TABLE))
            .await?;
        Ok(result.take(0)?)
    }

    /// Look up an order by the payment provider's reference
    pub async fn find_by_provider_reference(&self, reference: &str) -> RepoResult<Option<Order>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT *, record::id(id) AS id FROM type::table($table) \
                 WHERE provider_reference = $reference",
            )
            .bind(("table", TABLE))
            .bind(("reference", reference.to_string()))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders.into_iter().next())
    }

    /// Atomically move an order from `from` to `to`
    ///
    /// Returns the updated order, or `None` when the stored status no longer
    /// matches `from` (someone else got there first).
    pub async fn transition(
        &self,
        id: &str,
        from: OrderStatus,
        to: OrderStatus,
    ) -> RepoResult<Option<Order>> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE type::thing($table, $id) \
                 SET status = $to, updated_at = $now \
                 WHERE status = $from RETURN AFTER",
            )
            .bind(("table", TABLE))
            .bind(("id", id.to_string()))
            .bind(("from", from))
            .bind(("to", to))
            .bind(("now", now_millis()))
            .await?;
        let rows: Vec<OrderData> = result.take(0)?;
        Ok(rows.into_iter().next().map(|d| d.into_order(id.to_string())))
    }

    /// Atomically attach the provider's reference
    ///
    /// Succeeds when no reference is set yet, or when the same reference is
    /// re-attached. Returns `None` when a different reference is present.
    pub async fn attach_provider_reference(
        &self,
        id: &str,
        reference: &str,
    ) -> RepoResult<Option<Order>> {
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE type::thing($table, $id) \
                 SET provider_reference = $reference, updated_at = $now \
                 WHERE provider_reference IS NONE OR provider_reference = $reference \
                 RETURN AFTER",
            )
            .bind(("table", TABLE))
            .bind(("id", id.to_string()))
            .bind(("reference", reference.to_string()))
            .bind(("now", now_millis()))
            .await?;
        let rows: Vec<OrderData> = result.take(0)?;
        Ok(rows.into_iter().next().map(|d| d.into_order(id.to_string())))
    }
}
