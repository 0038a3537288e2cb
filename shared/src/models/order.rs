use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order lifecycle status
///
/// Orders start `PENDING` and move to exactly one of the terminal states.
/// Terminal states are final; repeating the same terminal transition is a
/// harmless no-op, any other transition out of a terminal state is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

impl OrderStatus {
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }

    /// Whether moving from `self` to `target` is a legal state change
    pub const fn can_transition_to(&self, target: OrderStatus) -> bool {
        matches!(self, OrderStatus::Pending) && target.is_terminal()
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Failed => "FAILED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A checkout order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Full UUIDv4
    pub id: String,
    /// Photos included in the purchase
    pub photo_ids: Vec<String>,
    /// Server-computed sum of photo prices at creation time
    pub total_amount: Decimal,
    /// Buyer contact, used for delivery after completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_email: Option<String>,
    pub status: OrderStatus,
    /// External payment provider's order reference, once attached
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_reference: Option<String>,
    /// Creation timestamp (unix millis)
    pub created_at: i64,
    /// Last update timestamp (unix millis)
    pub updated_at: i64,
}

/// Payload for creating an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub photo_ids: Vec<String>,
    /// Client-side total, cross-checked against stored prices
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_can_reach_all_terminals() {
        for target in [OrderStatus::Completed, OrderStatus::Failed, OrderStatus::Cancelled] {
            assert!(OrderStatus::Pending.can_transition_to(target));
        }
    }

    #[test]
    fn test_terminal_states_are_final() {
        for from in [OrderStatus::Completed, OrderStatus::Failed, OrderStatus::Cancelled] {
            assert!(from.is_terminal());
            for target in [
                OrderStatus::Pending,
                OrderStatus::Completed,
                OrderStatus::Failed,
                OrderStatus::Cancelled,
            ] {
                assert!(!from.can_transition_to(target));
            }
        }
    }

    #[test]
    fn test_pending_cannot_reenter_pending() {
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn test_status_serde_screaming_snake() {
        let json = serde_json::to_string(&OrderStatus::Completed).unwrap();
        assert_eq!(json, "\"COMPLETED\"");
        let back: OrderStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(back, OrderStatus::Cancelled);
    }
}
