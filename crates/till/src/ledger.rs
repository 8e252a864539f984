//! Balance computation and history queries over movement sequences.
//!
//! The ordering of any movement sequence is its append order; balances and
//! history never reorder by timestamp.

use serde::{Deserialize, Serialize};

use posforge_core::{Amount, SessionId};

use crate::movement::{Movement, MovementKind, PaymentMedium};

pub const DEFAULT_PAGE_SIZE: usize = 10;
const MAX_PAGE_SIZE: usize = 200;

/// Signed sum of a movement sequence, applying the per-kind sign rules.
///
/// Single pass, no allocation. APERTURA's declared amount counts once as the
/// starting balance (it is the first movement of the sequence); CIERRE
/// contributes zero. Idempotent: same input, same output.
pub fn balance(movements: &[Movement]) -> Amount {
    let total: i128 = movements.iter().map(|m| m.signed_effect() as i128).sum();
    Amount::from_minor(total.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
}

/// History query: filters compose and always apply before pagination, so
/// page 1 of a filtered view reflects the filtered total.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryFilter {
    /// Scope to one session, or all sessions when `None`.
    pub session_id: Option<SessionId>,
    pub kind: Option<MovementKind>,
    pub medium: Option<PaymentMedium>,
    /// Case-insensitive free-text match on description, origin and actor name.
    pub search: Option<String>,
    /// 1-based page number.
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl HistoryFilter {
    pub fn matches(&self, movement: &Movement) -> bool {
        if let Some(session_id) = self.session_id {
            if movement.session_id != session_id {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if movement.kind != kind {
                return false;
            }
        }
        if let Some(medium) = self.medium {
            if movement.medium != Some(medium) {
                return false;
            }
        }
        if let Some(q) = &self.search {
            let q = q.to_lowercase();
            if q.is_empty() {
                return true;
            }
            let hit = movement.description.to_lowercase().contains(&q)
                || movement.origin.as_str().to_lowercase().contains(&q)
                || movement.actor_name.to_lowercase().contains(&q);
            if !hit {
                return false;
            }
        }
        true
    }

    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }

    pub fn page_size(&self) -> usize {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

/// One page of filtered history, most recent first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryPage {
    pub items: Vec<Movement>,
    /// Total matches across all pages of the *filtered* set.
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
}

/// Lazily filter a movement sequence (already in the desired order).
///
/// Restartable: the returned iterator borrows its inputs, so callers can
/// rebuild it at will from the same snapshot.
pub fn filtered<'a>(
    movements: impl Iterator<Item = &'a Movement> + 'a,
    filter: &'a HistoryFilter,
) -> impl Iterator<Item = &'a Movement> + 'a {
    movements.filter(move |m| filter.matches(m))
}

/// Run a history query over movements given in append order.
///
/// Output order is append order descending (most recent first); pagination
/// applies after filtering.
pub fn query(movements: &[Movement], filter: &HistoryFilter) -> HistoryPage {
    let total = filtered(movements.iter().rev(), filter).count();

    let page = filter.page();
    let page_size = filter.page_size();
    let items = filtered(movements.iter().rev(), filter)
        .skip((page - 1) * page_size)
        .take(page_size)
        .cloned()
        .collect();

    HistoryPage {
        items,
        total,
        page,
        page_size,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use posforge_core::{ActorId, MovementId, SessionId};

    use super::*;
    use crate::movement::Origin;

    fn movement(kind: MovementKind, minor: i64, desc: &str) -> Movement {
        Movement {
            id: MovementId::new(),
            session_id: SessionId::new(),
            kind,
            amount: Amount::from_minor(minor),
            medium: kind.requires_medium().then_some(PaymentMedium::Cash),
            description: desc.to_string(),
            origin: Origin::Manual,
            actor_id: ActorId::new(),
            actor_name: "Cajero Uno".to_string(),
            occurred_at: Utc::now(),
            reverses: None,
            difference: None,
        }
    }

    #[test]
    fn balance_applies_sign_rules_in_one_pass() {
        let movements = vec![
            movement(MovementKind::Apertura, 100_000, "apertura"),
            movement(MovementKind::Ingreso, 50_000, "venta"),
            movement(MovementKind::Egreso, 20_000, "pago proveedor"),
            movement(MovementKind::Ajuste, -1_500, "ajuste"),
            movement(MovementKind::Cierre, 128_500, "cierre"),
        ];
        assert_eq!(balance(&movements), Amount::from_minor(128_500));
    }

    #[test]
    fn balance_is_idempotent() {
        let movements = vec![
            movement(MovementKind::Apertura, 10_000, "apertura"),
            movement(MovementKind::Ingreso, 2_500, "venta"),
        ];
        assert_eq!(balance(&movements), balance(&movements));
    }

    #[test]
    fn query_filters_before_paginating() {
        let mut movements: Vec<Movement> = Vec::new();
        for i in 0..30 {
            movements.push(movement(MovementKind::Ingreso, 100 + i, "venta"));
            movements.push(movement(MovementKind::Egreso, 100 + i, "gasto"));
        }

        let filter = HistoryFilter {
            kind: Some(MovementKind::Ingreso),
            page: Some(2),
            page_size: Some(10),
            ..Default::default()
        };
        let page = query(&movements, &filter);

        assert_eq!(page.total, 30);
        assert_eq!(page.items.len(), 10);
        assert!(page.items.iter().all(|m| m.kind == MovementKind::Ingreso));
        // Descending append order: page 2 holds the 11th..20th most recent
        // ingresos, i.e. amounts 119 down to 110.
        assert_eq!(page.items[0].amount, Amount::from_minor(100 + 19));
        assert_eq!(page.items[9].amount, Amount::from_minor(100 + 10));
    }

    #[test]
    fn search_matches_description_origin_and_actor_name() {
        let mut provider = movement(MovementKind::Egreso, 500, "Pago a proveedor");
        provider.actor_name = "Maria Lopez".to_string();
        let sale = movement(MovementKind::Ingreso, 900, "venta mostrador");
        let movements = vec![provider, sale];

        let by_desc = HistoryFilter {
            search: Some("PROVEEDOR".to_string()),
            ..Default::default()
        };
        assert_eq!(query(&movements, &by_desc).total, 1);

        let by_actor = HistoryFilter {
            search: Some("lopez".to_string()),
            ..Default::default()
        };
        assert_eq!(query(&movements, &by_actor).total, 1);

        let by_origin = HistoryFilter {
            search: Some("manual".to_string()),
            ..Default::default()
        };
        assert_eq!(query(&movements, &by_origin).total, 2);
    }

    #[test]
    fn out_of_range_page_is_empty_but_keeps_total() {
        let movements = vec![movement(MovementKind::Ingreso, 100, "venta")];
        let filter = HistoryFilter {
            page: Some(5),
            page_size: Some(10),
            ..Default::default()
        };
        let page = query(&movements, &filter);
        assert_eq!(page.total, 1);
        assert!(page.items.is_empty());
    }
}
