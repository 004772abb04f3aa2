//! Status enums for orders and accounts.

use serde::{Deserialize, Serialize};

/// Order fulfilment status.
///
/// The happy path is `Processing → Ready to Delivery → Delivered`;
/// `Cancelled` can be reached from any state. Transitions are made by admins
/// only and are deliberately permissive: moving "backwards" (for example
/// `Delivered → Processing`) is allowed and merely reported by
/// [`OrderStatus::is_backward`] so callers can log it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "sales.order_status", rename_all = "snake_case")
)]
pub enum OrderStatus {
    #[default]
    Processing,
    #[serde(rename = "Ready to Delivery")]
    ReadyToDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// All statuses in workflow order.
    pub const ALL: [Self; 4] = [
        Self::Processing,
        Self::ReadyToDelivery,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Human-readable label, as shown to shoppers and admins.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Processing => "Processing",
            Self::ReadyToDelivery => "Ready to Delivery",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Position on the fulfilment path. `Cancelled` sits outside it.
    const fn rank(self) -> Option<u8> {
        match self {
            Self::Processing => Some(0),
            Self::ReadyToDelivery => Some(1),
            Self::Delivered => Some(2),
            Self::Cancelled => None,
        }
    }

    /// Whether moving to `next` goes against the fulfilment path
    /// (including leaving `Cancelled`).
    #[must_use]
    pub fn is_backward(self, next: Self) -> bool {
        match (self.rank(), next.rank()) {
            (Some(from), Some(to)) => to < from,
            (None, Some(_)) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        match normalised.as_str() {
            "processing" => Ok(Self::Processing),
            "ready to delivery" => Ok(Self::ReadyToDelivery),
            "delivered" => Ok(Self::Delivered),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "account.user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Back-office access.
    Admin,
    /// Shopper account.
    #[default]
    Customer,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Customer => write!(f, "customer"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "customer" => Ok(Self::Customer),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_can_be_cancelled_directly() {
        assert!(!OrderStatus::Processing.is_backward(OrderStatus::Cancelled));
    }

    #[test]
    fn test_backward_transitions_are_allowed_but_flagged() {
        assert!(OrderStatus::Delivered.is_backward(OrderStatus::Processing));
        assert!(OrderStatus::Cancelled.is_backward(OrderStatus::ReadyToDelivery));
        assert!(!OrderStatus::Processing.is_backward(OrderStatus::ReadyToDelivery));
        assert!(!OrderStatus::Delivered.is_backward(OrderStatus::Delivered));
    }

    #[test]
    fn test_status_serde_uses_labels() {
        let json = serde_json::to_string(&OrderStatus::ReadyToDelivery).unwrap();
        assert_eq!(json, "\"Ready to Delivery\"");
        let back: OrderStatus = serde_json::from_str("\"Cancelled\"").unwrap();
        assert_eq!(back, OrderStatus::Cancelled);
    }

    #[test]
    fn test_status_from_str_is_lenient() {
        assert_eq!("ready_to_delivery".parse(), Ok(OrderStatus::ReadyToDelivery));
        assert_eq!("Ready to Delivery".parse(), Ok(OrderStatus::ReadyToDelivery));
        assert_eq!("canceled".parse(), Ok(OrderStatus::Cancelled));
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_user_role_roundtrip() {
        for role in [UserRole::Admin, UserRole::Customer] {
            assert_eq!(role.to_string().parse::<UserRole>(), Ok(role));
        }
    }
}
