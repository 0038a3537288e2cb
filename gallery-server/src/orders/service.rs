use crate::db::repository::{OrderRepository, PhotoRepository};
use crate::utils::validation::validate_email;
use rust_decimal::Decimal;
use shared::models::{Order, OrderCreate, OrderStatus};
use shared::util::now_millis;
use shared::{AppError, AppResult, ErrorCode};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use uuid::Uuid;

/// Order lifecycle service
///
/// Orders are created `PENDING` with a server-computed total. Terminal
/// transitions are compare-and-set at the storage layer; repeating a terminal
/// transition that already happened is a no-op, anything else is rejected.
#[derive(Clone)]
pub struct OrderService {
    orders: OrderRepository,
    photos: PhotoRepository,
}

impl OrderService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            photos: PhotoRepository::new(db),
        }
    }

    /// Create a pending order over existing photos
    ///
    /// The total is always recomputed from stored prices. A client-supplied
    /// total is only cross-checked, never trusted.
    pub async fn create_order(&self, payload: OrderCreate) -> AppResult<Order> {
        if payload.photo_ids.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty));
        }
        if let Some(email) = &payload.buyer_email {
            validate_email(email)?;
        }

        // Drop duplicate ids, keeping first-seen order
        let mut photo_ids: Vec<String> = Vec::with_capacity(payload.photo_ids.len());
        for id in payload.photo_ids {
            if !photo_ids.contains(&id) {
                photo_ids.push(id);
            }
        }

        let photos = self
            .photos
            .find_by_ids(&photo_ids)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        for id in &photo_ids {
            if !photos.iter().any(|p| &p.id == id) {
                return Err(AppError::photo_not_found(id.clone()));
            }
        }

        let total: Decimal = photos.iter().map(|p| p.price).sum();
        if total <= Decimal::ZERO {
            return Err(AppError::new(ErrorCode::OrderInvalidAmount));
        }
        if let Some(claimed) = payload.total_amount
            && claimed != total
        {
            return Err(AppError::new(ErrorCode::OrderTotalMismatch)
                .with_detail("expected", total)
                .with_detail("claimed", claimed));
        }

        let now = now_millis();
        let order = Order {
            id: Uuid::new_v4().to_string(),
            photo_ids,
            total_amount: total,
            buyer_email: payload.buyer_email,
            status: OrderStatus::Pending,
            provider_reference: None,
            created_at: now,
            updated_at: now,
        };

        let created = self
            .orders
            .create(order)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        tracing::info!(order_id = %created.id, total = %created.total_amount, "Order created");
        Ok(created)
    }

    pub async fn get_order(&self, id: &str) -> AppResult<Order> {
        self.orders
            .find_by_id(id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::order_not_found(id))
    }

    pub async fn list_orders(&self) -> AppResult<Vec<Order>> {
        self.orders
            .find_all()
            .await
            .map_err(|e| AppError::database(e.to_string()))
    }

    pub async fn find_by_provider_reference(&self, reference: &str) -> AppResult<Option<Order>> {
        self.orders
            .find_by_provider_reference(reference)
            .await
            .map_err(|e| AppError::database(e.to_string()))
    }

    /// Record the provider's reference on a pending order
    ///
    /// Re-attaching the same reference is a no-op; a different reference on
    /// an order that already has one is a conflict.
    pub async fn attach_provider_reference(
        &self,
        id: &str,
        reference: &str,
    ) -> AppResult<Order> {
        let updated = self
            .orders
            .attach_provider_reference(id, reference)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        match updated {
            Some(order) => Ok(order),
            None => {
                // Distinguish missing order from reference conflict
                let current = self.get_order(id).await?;
                Err(AppError::new(ErrorCode::ProviderReferenceConflict)
                    .with_detail("order_id", id)
                    .with_detail("existing", current.provider_reference))
            }
        }
    }

    pub async fn mark_completed(&self, id: &str) -> AppResult<Order> {
        self.transition(id, OrderStatus::Completed).await
    }

    pub async fn mark_failed(&self, id: &str) -> AppResult<Order> {
        self.transition(id, OrderStatus::Failed).await
    }

    pub async fn mark_cancelled(&self, id: &str) -> AppResult<Order> {
        self.transition(id, OrderStatus::Cancelled).await
    }

    /// Move an order into a terminal state
    async fn transition(&self, id: &str, to: OrderStatus) -> AppResult<Order> {
        let moved = self
            .orders
            .transition(id, OrderStatus::Pending, to)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        if let Some(order) = moved {
            tracing::info!(order_id = %id, status = %to, "Order status changed");
            return Ok(order);
        }

        // The CAS found no pending row: either the order is gone or it is
        // already terminal. Same target twice is idempotent.
        let current = self.get_order(id).await?;
        if current.status == to {
            tracing::debug!(order_id = %id, status = %to, "Repeated terminal transition ignored");
            Ok(current)
        } else {
            Err(AppError::invalid_transition(
                current.status.to_string(),
                to.to_string(),
            ))
        }
    }
}
