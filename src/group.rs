//! Group session aggregation
//!
//! Combines the per-member session subsets of a shared drink collection into
//! group-level statistics for the current occasion.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::session;
use crate::types::{DrinkEvent, GroupSessionStats, MemberSessionStats};
use crate::units::round2;

/// Group statistics over each member's current session.
///
/// Members are consulted exactly as passed: a duplicated id contributes once
/// per occurrence to both the unit total and the averaging denominator, so
/// deduplication is the caller's job. Members with no session drinks are
/// omitted from the per-member map.
pub fn group_session_average(drinks: &[DrinkEvent], members: &[String]) -> GroupSessionStats {
    let mut member_stats = HashMap::new();
    let mut total_units = 0.0;
    let mut session_started_at: Option<DateTime<Utc>> = None;

    for member in members {
        let session_drinks = session::session_drinks(drinks, member);
        if session_drinks.is_empty() {
            continue;
        }

        let unit_total: f64 = session_drinks.iter().map(|drink| safe_units(drink)).sum();
        total_units += unit_total;

        if let Some(first) = session_drinks.first() {
            session_started_at = Some(match session_started_at {
                Some(earliest) => earliest.min(first.timestamp),
                None => first.timestamp,
            });
        }

        member_stats.insert(
            member.clone(),
            MemberSessionStats {
                drink_count: session_drinks.len() as u32,
                unit_total: round2(unit_total),
            },
        );
    }

    let denominator = members.len().max(1) as f64;
    GroupSessionStats {
        group_average_units: round2(total_units / denominator),
        member_stats,
        session_started_at,
    }
}

fn safe_units(drink: &DrinkEvent) -> f64 {
    if drink.units.is_finite() && drink.units >= 0.0 {
        drink.units
    } else {
        0.0
    }
}
