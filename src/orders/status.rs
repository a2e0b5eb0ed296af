//! Order status state machine
//!
//! The lifecycle is linear with one escape hatch:
//!
//! ```text
//! Placed -> Processing -> Shipped -> Delivered
//!    \          |
//!     +---> Cancelled
//! ```
//!
//! Delivered and Cancelled are terminal. Staff may also skip forward
//! (Placed -> Shipped, Placed -> Delivered, Processing -> Delivered);
//! customers may only cancel, and only before shipment.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
pub enum OrderStatus {
    Placed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Placed => "Placed",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Placed" => Some(Self::Placed),
            "Processing" => Some(Self::Processing),
            "Shipped" => Some(Self::Shipped),
            "Delivered" => Some(Self::Delivered),
            "Cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Terminal states reject every further transition
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether a customer may still cancel from this state
    pub fn is_cancellable(self) -> bool {
        matches!(self, Self::Placed | Self::Processing)
    }

    /// Whether the transition `self -> to` is legal for the given actor.
    ///
    /// Customers (`staff == false`) may only move an order to Cancelled,
    /// and only before it ships. Staff may move forward along the
    /// lifecycle (skipping states is allowed) or cancel before shipment.
    pub fn can_transition(self, to: OrderStatus, staff: bool) -> bool {
        use OrderStatus::*;
        match (self, to) {
            (Placed, Processing | Shipped | Delivered) => staff,
            (Processing, Shipped | Delivered) => staff,
            (Shipped, Delivered) => staff,
            (Placed | Processing, Cancelled) => true,
            _ => false,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::OrderStatus::*;
    use super::*;

    const ALL: [OrderStatus; 5] = [Placed, Processing, Shipped, Delivered, Cancelled];

    #[test]
    fn test_staff_transitions() {
        assert!(Placed.can_transition(Processing, true));
        assert!(Placed.can_transition(Shipped, true));
        assert!(Placed.can_transition(Delivered, true));
        assert!(Processing.can_transition(Shipped, true));
        assert!(Processing.can_transition(Delivered, true));
        assert!(Shipped.can_transition(Delivered, true));
        assert!(Placed.can_transition(Cancelled, true));
        assert!(Processing.can_transition(Cancelled, true));

        // no backwards movement
        assert!(!Processing.can_transition(Placed, true));
        assert!(!Shipped.can_transition(Processing, true));
        assert!(!Delivered.can_transition(Shipped, true));

        // shipped orders cannot be cancelled, only delivered
        assert!(!Shipped.can_transition(Cancelled, true));
    }

    #[test]
    fn test_customer_can_only_cancel() {
        for from in ALL {
            for to in ALL {
                let allowed = from.can_transition(to, false);
                let expected = to == Cancelled && from.is_cancellable();
                assert_eq!(allowed, expected, "{from} -> {to} as customer");
            }
        }
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        for from in [Delivered, Cancelled] {
            for to in ALL {
                assert!(!from.can_transition(to, true), "{from} -> {to}");
                assert!(!from.can_transition(to, false), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_no_self_transitions() {
        for s in ALL {
            assert!(!s.can_transition(s, true));
        }
    }

    #[test]
    fn test_parse_round_trip() {
        for s in ALL {
            assert_eq!(OrderStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(OrderStatus::parse("placed"), None);
        assert_eq!(OrderStatus::parse(""), None);
    }
}
