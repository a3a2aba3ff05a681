use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;

use crate::engine::OrderError;

/// Lifecycle of a group order. `Active` is the only state that accepts joins;
/// every other state is terminal and orders are never deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Active,
    Fulfilled,
    Expired,
    Cancelled,
}

impl OrderStatus {
    pub fn is_active(self) -> bool {
        matches!(self, OrderStatus::Active)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Active => write!(f, "active"),
            OrderStatus::Fulfilled => write!(f, "fulfilled"),
            OrderStatus::Expired => write!(f, "expired"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A vendor's committed share of a group order. Never mutated after insertion;
/// a vendor who wants a different quantity is out of luck until the order
/// closes (re-joins are rejected, not merged).
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub vendor_id: String,
    pub quantity: u32,
    pub joined_at: DateTime<Utc>,
}

/// A supplier-posted bulk offer that vendors pool quantity against.
///
/// `current_quantity` is derived: it always equals the sum of participant
/// quantities. It changes only through [`GroupOrder::join`], which the store
/// runs atomically per order.
#[derive(Debug, Clone)]
pub struct GroupOrder {
    pub id: String,
    pub supplier_id: String,
    pub product_id: String,
    pub title: String,
    pub target_quantity: u32,
    pub price_per_unit: Decimal,
    pub deadline: DateTime<Utc>,
    pub current_quantity: u32,
    pub participants: Vec<Participant>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a new group order.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub product_id: String,
    pub title: String,
    pub target_quantity: u32,
    pub price_per_unit: Decimal,
    pub deadline: DateTime<Utc>,
}

impl OrderDraft {
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), OrderError> {
        if self.product_id.trim().is_empty() {
            return Err(OrderError::InvalidInput("Product id is required".to_string()));
        }
        if self.title.trim().is_empty() {
            return Err(OrderError::InvalidInput("Title is required".to_string()));
        }
        if self.target_quantity == 0 {
            return Err(OrderError::InvalidInput(
                "Target quantity must be positive".to_string(),
            ));
        }
        if self.price_per_unit <= Decimal::ZERO {
            return Err(OrderError::InvalidInput(
                "Price per unit must be positive".to_string(),
            ));
        }
        if self.deadline <= now {
            return Err(OrderError::InvalidInput(
                "Deadline must be in the future".to_string(),
            ));
        }
        Ok(())
    }
}

/// Optional constraints for listing group orders.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub supplier_id: Option<String>,
    pub status: Option<OrderStatus>,
}

impl OrderFilter {
    pub fn matches(&self, order: &GroupOrder) -> bool {
        self.supplier_id
            .as_ref()
            .map_or(true, |supplier_id| *supplier_id == order.supplier_id)
            && self.status.map_or(true, |status| status == order.status)
    }
}

impl GroupOrder {
    pub fn open(
        id: String,
        supplier_id: String,
        draft: OrderDraft,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            supplier_id,
            product_id: draft.product_id,
            title: draft.title,
            target_quantity: draft.target_quantity,
            price_per_unit: draft.price_per_unit,
            deadline: draft.deadline,
            current_quantity: 0,
            participants: Vec::new(),
            status: OrderStatus::Active,
            created_at: now,
        }
    }

    /// Whether the pooled quantity has met the target. Reaching the target
    /// does not close the order; the supplier closes it explicitly.
    pub fn target_reached(&self) -> bool {
        self.current_quantity >= self.target_quantity
    }

    pub fn participant(&self, vendor_id: &str) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|participant| participant.vendor_id == vendor_id)
    }

    /// Returns the order with the vendor's commitment appended.
    ///
    /// Must run inside the store's atomic update: the duplicate check and the
    /// aggregate increment may not interleave with another join on the same
    /// order.
    pub fn join(
        &self,
        vendor_id: String,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<GroupOrder, OrderError> {
        if !self.status.is_active() {
            return Err(OrderError::InvalidState(format!(
                "order {} is {}",
                self.id, self.status
            )));
        }
        if now > self.deadline {
            return Err(OrderError::InvalidState(format!(
                "order {} deadline has passed",
                self.id
            )));
        }
        if self.participant(&vendor_id).is_some() {
            return Err(OrderError::Conflict(format!(
                "vendor {} already joined order {}",
                vendor_id, self.id
            )));
        }
        let mut next = self.clone();
        next.current_quantity = next
            .current_quantity
            .checked_add(quantity)
            .ok_or_else(|| {
                OrderError::InvalidInput("Quantity overflows the aggregate".to_string())
            })?;
        next.participants.push(Participant {
            vendor_id,
            quantity,
            joined_at: now,
        });
        Ok(next)
    }

    /// Supplier close action: fulfilled when the target was met, cancelled
    /// otherwise.
    pub fn close(&self) -> Result<GroupOrder, OrderError> {
        if !self.status.is_active() {
            return Err(OrderError::InvalidState(format!(
                "order {} is already {}",
                self.id, self.status
            )));
        }
        let mut next = self.clone();
        next.status = if next.target_reached() {
            OrderStatus::Fulfilled
        } else {
            OrderStatus::Cancelled
        };
        Ok(next)
    }

    /// Deadline sweep transition; only ever applied by the out-of-core sweep,
    /// never by the join path.
    pub fn expire(&self, now: DateTime<Utc>) -> Result<GroupOrder, OrderError> {
        if !self.status.is_active() {
            return Err(OrderError::InvalidState(format!(
                "order {} is already {}",
                self.id, self.status
            )));
        }
        if now <= self.deadline {
            return Err(OrderError::InvalidState(format!(
                "order {} deadline has not passed",
                self.id
            )));
        }
        let mut next = self.clone();
        next.status = OrderStatus::Expired;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn fresh_order(now: DateTime<Utc>) -> GroupOrder {
        GroupOrder::open(
            "order_1".to_string(),
            "supplier_1".to_string(),
            OrderDraft {
                product_id: "product_1".to_string(),
                title: "Bulk rice".to_string(),
                target_quantity: 100,
                price_per_unit: Decimal::from(25),
                deadline: now + Duration::days(7),
            },
            now,
        )
    }

    #[test]
    fn join_appends_and_increments() {
        let now = Utc::now();
        let order = fresh_order(now);

        let joined = order.join("vendor_1".to_string(), 40, now).unwrap();
        assert_eq!(joined.current_quantity, 40);
        assert_eq!(joined.participants.len(), 1);
        assert_eq!(joined.participants[0].vendor_id, "vendor_1");
        assert_eq!(joined.participants[0].joined_at, now);
        // The original value is untouched; the store swaps in the replacement.
        assert_eq!(order.current_quantity, 0);
    }

    #[test]
    fn repeat_join_is_a_conflict() {
        let now = Utc::now();
        let order = fresh_order(now);
        let joined = order.join("vendor_1".to_string(), 40, now).unwrap();

        let err = joined.join("vendor_1".to_string(), 10, now).unwrap_err();
        assert!(matches!(err, OrderError::Conflict(_)));
    }

    #[test]
    fn join_after_deadline_is_invalid_state() {
        let now = Utc::now();
        let order = fresh_order(now);

        let err = order
            .join("vendor_1".to_string(), 5, now + Duration::days(8))
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidState(_)));
    }

    #[test]
    fn join_on_terminal_order_is_invalid_state() {
        let now = Utc::now();
        let closed = fresh_order(now).close().unwrap();
        assert_eq!(closed.status, OrderStatus::Cancelled);

        let err = closed.join("vendor_1".to_string(), 5, now).unwrap_err();
        assert!(matches!(err, OrderError::InvalidState(_)));
    }

    #[test]
    fn close_fulfills_only_when_target_met() {
        let now = Utc::now();
        let order = fresh_order(now);

        let short = order.join("vendor_1".to_string(), 99, now).unwrap();
        assert_eq!(short.close().unwrap().status, OrderStatus::Cancelled);

        let full = short.join("vendor_2".to_string(), 1, now).unwrap();
        assert!(full.target_reached());
        assert_eq!(full.close().unwrap().status, OrderStatus::Fulfilled);
    }

    #[test]
    fn close_is_not_reentrant() {
        let now = Utc::now();
        let closed = fresh_order(now).close().unwrap();
        assert!(matches!(
            closed.close().unwrap_err(),
            OrderError::InvalidState(_)
        ));
    }

    #[test]
    fn expire_requires_active_and_overdue() {
        let now = Utc::now();
        let order = fresh_order(now);

        assert!(matches!(
            order.expire(now).unwrap_err(),
            OrderError::InvalidState(_)
        ));

        let expired = order.expire(now + Duration::days(8)).unwrap();
        assert_eq!(expired.status, OrderStatus::Expired);
        assert!(matches!(
            expired.expire(now + Duration::days(9)).unwrap_err(),
            OrderError::InvalidState(_)
        ));
    }

    #[test]
    fn draft_validation_covers_each_field() {
        let now = Utc::now();
        let good = OrderDraft {
            product_id: "product_1".to_string(),
            title: "Bulk rice".to_string(),
            target_quantity: 100,
            price_per_unit: Decimal::from(25),
            deadline: now + Duration::days(7),
        };
        assert!(good.validate(now).is_ok());

        let mut draft = good.clone();
        draft.title = "  ".to_string();
        assert!(matches!(
            draft.validate(now).unwrap_err(),
            OrderError::InvalidInput(_)
        ));

        let mut draft = good.clone();
        draft.target_quantity = 0;
        assert!(draft.validate(now).is_err());

        let mut draft = good.clone();
        draft.price_per_unit = Decimal::ZERO;
        assert!(draft.validate(now).is_err());

        let mut draft = good;
        draft.deadline = now;
        assert!(draft.validate(now).is_err());
    }

    #[test]
    fn filter_matches_on_supplier_and_status() {
        let now = Utc::now();
        let order = fresh_order(now);

        assert!(OrderFilter::default().matches(&order));
        assert!(OrderFilter {
            supplier_id: Some("supplier_1".to_string()),
            status: Some(OrderStatus::Active),
        }
        .matches(&order));
        assert!(!OrderFilter {
            supplier_id: Some("supplier_2".to_string()),
            status: None,
        }
        .matches(&order));
        assert!(!OrderFilter {
            supplier_id: None,
            status: Some(OrderStatus::Fulfilled),
        }
        .matches(&order));
    }
}
