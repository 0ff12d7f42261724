//! Fairness metrics over a group's ledger snapshot and run history.
//!
//! # Responsibility
//! - Summarize how evenly cost has been distributed across the roster.
//! - Break history down by difficulty signal and venue popularity.
//!
//! # Invariants
//! - `fairness_index` stays within [0, 100].
//! - Tie-breaks (burden, venues) resolve to first-encountered order, so the
//!   same inputs always produce the same report.

use crate::model::member::{Member, MemberId};
use crate::model::task::TaskInstance;
use serde::Serialize;

/// How many venue labels the popularity ranking keeps.
const TOP_VENUE_LIMIT: usize = 5;

/// Aggregate fairness report for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub total_instances: u32,
    pub total_cost: u64,
    /// Mean cost per instance, rounded to the nearest integer. 0 when empty.
    pub average_cost: u32,
    /// Assignee appearing most often in history; `None` without instances.
    pub most_burdened: Option<BurdenEntry>,
    pub override_count: u32,
    /// Overrides as a percentage of instances, one decimal place.
    pub override_rate: f64,
    /// 0–100 dispersion score over current accumulated costs. 100 means the
    /// ledger is perfectly level; defined as 0 below two members and as 100
    /// when no cost has been incurred yet.
    pub fairness_index: f64,
    pub distance_breakdown: DistanceBreakdown,
    pub wait_breakdown: LevelBreakdown,
    pub money_breakdown: LevelBreakdown,
    /// Most frequent venue labels, descending, at most five entries.
    pub top_venues: Vec<VenueCount>,
}

/// Member who has carried the most task instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BurdenEntry {
    pub member_id: MemberId,
    /// Name snapshotted from the first matching instance.
    pub name: String,
    pub instance_count: u32,
}

/// Instance counts per distance level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DistanceBreakdown {
    pub short: u32,
    pub medium: u32,
    pub long: u32,
}

/// Instance counts per low/medium/high level (wait and money axes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LevelBreakdown {
    pub low: u32,
    pub medium: u32,
    pub high: u32,
}

/// Venue label with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueCount {
    pub venue: String,
    pub count: u32,
}

/// Computes the full fairness report for a roster snapshot plus history.
///
/// Pure and deterministic; history is consumed in the given order, which
/// callers keep as creation order.
pub fn evaluate(members: &[Member], tasks: &[TaskInstance]) -> GroupStats {
    let total_instances = tasks.len() as u32;
    let total_cost: u64 = tasks.iter().map(|task| u64::from(task.cost)).sum();
    let average_cost = if total_instances == 0 {
        0
    } else {
        (total_cost as f64 / f64::from(total_instances)).round() as u32
    };

    let override_count = tasks.iter().filter(|task| task.was_override).count() as u32;
    let override_rate = if total_instances == 0 {
        0.0
    } else {
        round_to_tenth(f64::from(override_count) / f64::from(total_instances) * 100.0)
    };

    GroupStats {
        total_instances,
        total_cost,
        average_cost,
        most_burdened: most_burdened(tasks),
        override_count,
        override_rate,
        fairness_index: fairness_index(members),
        distance_breakdown: distance_breakdown(tasks),
        wait_breakdown: wait_breakdown(tasks),
        money_breakdown: money_breakdown(tasks),
        top_venues: top_venues(tasks),
    }
}

/// Dispersion score over current accumulated costs.
///
/// `100 - (population std-dev / mean) * 100`, clamped to [0, 100]. A zero
/// mean (no cost incurred) is defined as perfectly fair. Below two members
/// the index is 0: there is no dispersion to measure.
pub fn fairness_index(members: &[Member]) -> f64 {
    if members.len() < 2 {
        return 0.0;
    }
    let costs: Vec<f64> = members
        .iter()
        .map(|member| f64::from(member.accumulated_cost))
        .collect();
    let mean = costs.iter().sum::<f64>() / costs.len() as f64;
    if mean == 0.0 {
        return 100.0;
    }
    let variance = costs
        .iter()
        .map(|cost| (cost - mean).powi(2))
        .sum::<f64>()
        / costs.len() as f64;
    let std_dev = variance.sqrt();
    (100.0 - (std_dev / mean * 100.0)).clamp(0.0, 100.0)
}

fn most_burdened(tasks: &[TaskInstance]) -> Option<BurdenEntry> {
    // Counts are kept in a Vec so that ties resolve to the assignee that
    // appeared first in history, not to hash order.
    let mut counts: Vec<BurdenEntry> = Vec::new();
    for task in tasks {
        match counts
            .iter_mut()
            .find(|entry| entry.member_id == task.assignee.member_id)
        {
            Some(entry) => entry.instance_count += 1,
            None => counts.push(BurdenEntry {
                member_id: task.assignee.member_id,
                name: task.assignee.name.clone(),
                instance_count: 1,
            }),
        }
    }
    counts
        .into_iter()
        .reduce(|max, entry| {
            if entry.instance_count > max.instance_count {
                entry
            } else {
                max
            }
        })
}

fn distance_breakdown(tasks: &[TaskInstance]) -> DistanceBreakdown {
    use crate::model::task::Distance;
    let mut breakdown = DistanceBreakdown::default();
    for task in tasks {
        match task.distance {
            Distance::Short => breakdown.short += 1,
            Distance::Medium => breakdown.medium += 1,
            Distance::Long => breakdown.long += 1,
        }
    }
    breakdown
}

fn wait_breakdown(tasks: &[TaskInstance]) -> LevelBreakdown {
    use crate::model::task::Wait;
    let mut breakdown = LevelBreakdown::default();
    for task in tasks {
        match task.wait {
            Wait::Low => breakdown.low += 1,
            Wait::Medium => breakdown.medium += 1,
            Wait::High => breakdown.high += 1,
        }
    }
    breakdown
}

fn money_breakdown(tasks: &[TaskInstance]) -> LevelBreakdown {
    use crate::model::task::Money;
    let mut breakdown = LevelBreakdown::default();
    for task in tasks {
        match task.money {
            Money::Low => breakdown.low += 1,
            Money::Medium => breakdown.medium += 1,
            Money::High => breakdown.high += 1,
        }
    }
    breakdown
}

fn top_venues(tasks: &[TaskInstance]) -> Vec<VenueCount> {
    let mut counts: Vec<VenueCount> = Vec::new();
    for task in tasks {
        match counts.iter_mut().find(|entry| entry.venue == task.venue) {
            Some(entry) => entry.count += 1,
            None => counts.push(VenueCount {
                venue: task.venue.clone(),
                count: 1,
            }),
        }
    }
    // Stable sort keeps first-encountered order among equal counts.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(TOP_VENUE_LIMIT);
    counts
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::member::{Member, MemberRef};
    use crate::model::task::{Distance, Money, TaskInstance, Wait};
    use uuid::Uuid;

    fn member(name: &str, cost: u32) -> Member {
        let mut member = Member::new(Uuid::new_v4(), name, 0);
        member.accumulated_cost = cost;
        member
    }

    fn task(assignee: &Member, venue: &str, cost: u32, was_override: bool) -> TaskInstance {
        TaskInstance {
            uuid: Uuid::new_v4(),
            group_id: Uuid::new_v4(),
            assignee: assignee.to_ref(),
            venue: venue.to_string(),
            distance: Distance::Medium,
            wait: Wait::High,
            money: Money::Low,
            cost,
            notes: None,
            was_override,
            suggested: was_override.then(|| MemberRef {
                member_id: Uuid::new_v4(),
                name: "someone".to_string(),
            }),
            created_at_epoch_ms: 0,
        }
    }

    #[test]
    fn empty_history_yields_zeroed_report() {
        let members = vec![member("a", 0), member("b", 0)];
        let stats = evaluate(&members, &[]);
        assert_eq!(stats.total_instances, 0);
        assert_eq!(stats.total_cost, 0);
        assert_eq!(stats.average_cost, 0);
        assert!(stats.most_burdened.is_none());
        assert_eq!(stats.override_count, 0);
        assert_eq!(stats.override_rate, 0.0);
        assert!(stats.top_venues.is_empty());
    }

    #[test]
    fn totals_and_average_round_to_nearest() {
        let a = member("a", 0);
        let tasks = vec![task(&a, "mario", 14, false), task(&a, "mario", 15, false)];
        let stats = evaluate(&[a], &tasks);
        assert_eq!(stats.total_instances, 2);
        assert_eq!(stats.total_cost, 29);
        // 14.5 rounds half away from zero.
        assert_eq!(stats.average_cost, 15);
    }

    #[test]
    fn most_burdened_breaks_ties_by_first_encountered() {
        let a = member("a", 0);
        let b = member("b", 0);
        let tasks = vec![
            task(&b, "mario", 10, false),
            task(&a, "mario", 10, false),
            task(&a, "mario", 10, false),
            task(&b, "mario", 10, false),
        ];
        let burdened = evaluate(&[a, b.clone()], &tasks).most_burdened.unwrap();
        assert_eq!(burdened.member_id, b.member_id);
        assert_eq!(burdened.instance_count, 2);
    }

    #[test]
    fn override_rate_rounds_to_one_decimal() {
        let a = member("a", 0);
        let tasks = vec![
            task(&a, "mario", 10, true),
            task(&a, "mario", 10, false),
            task(&a, "mario", 10, false),
        ];
        let stats = evaluate(&[a], &tasks);
        assert_eq!(stats.override_count, 1);
        assert_eq!(stats.override_rate, 33.3);
    }

    #[test]
    fn fairness_index_is_zero_below_two_members() {
        assert_eq!(fairness_index(&[]), 0.0);
        assert_eq!(fairness_index(&[member("solo", 40)]), 0.0);
    }

    #[test]
    fn fairness_index_is_100_for_level_ledger() {
        let members = vec![member("a", 10), member("b", 10), member("c", 10)];
        assert_eq!(fairness_index(&members), 100.0);
    }

    #[test]
    fn fairness_index_is_100_when_no_cost_incurred() {
        let members = vec![member("a", 0), member("b", 0)];
        assert_eq!(fairness_index(&members), 100.0);
    }

    #[test]
    fn fairness_index_stays_within_bounds() {
        // Extreme skew would push the raw formula below zero.
        let members = vec![member("a", 0), member("b", 0), member("c", 90)];
        let index = fairness_index(&members);
        assert!((0.0..=100.0).contains(&index));
        assert_eq!(index, 0.0);

        let members = vec![member("a", 12), member("b", 14), member("c", 13)];
        let index = fairness_index(&members);
        assert!(index > 90.0 && index <= 100.0);
    }

    #[test]
    fn top_venues_rank_by_count_then_first_encountered() {
        let a = member("a", 0);
        let venues = ["sushi", "mario", "mario", "kebab", "sushi", "pho", "ramen", "tacos"];
        let tasks: Vec<TaskInstance> = venues
            .iter()
            .map(|venue| task(&a, venue, 5, false))
            .collect();
        let stats = evaluate(&[a], &tasks);
        assert_eq!(stats.top_venues.len(), 5);
        // sushi and mario both count 2; sushi appeared first.
        assert_eq!(stats.top_venues[0].venue, "sushi");
        assert_eq!(stats.top_venues[1].venue, "mario");
        assert_eq!(stats.top_venues[0].count, 2);
        // Remaining singles keep first-encountered order.
        assert_eq!(stats.top_venues[2].venue, "kebab");
        assert_eq!(stats.top_venues[3].venue, "pho");
        assert_eq!(stats.top_venues[4].venue, "ramen");
    }

    #[test]
    fn signal_breakdowns_count_every_instance() {
        let a = member("a", 0);
        let mut tasks = vec![task(&a, "mario", 5, false), task(&a, "mario", 5, false)];
        tasks[1].distance = Distance::Long;
        tasks[1].wait = Wait::Low;
        tasks[1].money = Money::High;
        let stats = evaluate(&[a], &tasks);
        assert_eq!(stats.distance_breakdown.medium, 1);
        assert_eq!(stats.distance_breakdown.long, 1);
        assert_eq!(stats.wait_breakdown.high, 1);
        assert_eq!(stats.wait_breakdown.low, 1);
        assert_eq!(stats.money_breakdown.low, 1);
        assert_eq!(stats.money_breakdown.high, 1);
    }
}
