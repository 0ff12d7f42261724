use lunchrota_core::db::open_db_in_memory;
use lunchrota_core::{
    CreateTaskRequest, Distance, GroupService, Money, SqliteGroupRepository, SqliteTaskRepository,
    TaskService, Wait,
};
use rusqlite::Connection;
use uuid::Uuid;

fn services(
    conn: &Connection,
) -> (
    GroupService<SqliteGroupRepository<'_>>,
    TaskService<SqliteGroupRepository<'_>, SqliteTaskRepository<'_>>,
) {
    (
        GroupService::new(SqliteGroupRepository::new(conn)),
        TaskService::new(
            SqliteGroupRepository::new(conn),
            SqliteTaskRepository::new(conn),
        ),
    )
}

fn request(group_id: Uuid, venue: &str) -> CreateTaskRequest {
    CreateTaskRequest {
        group_id,
        venue: venue.to_string(),
        distance: Distance::Medium,
        wait: Wait::High,
        money: Money::Low,
        notes: None,
        manual_person_id: None,
    }
}

#[test]
fn stats_summarize_history_and_ledger() {
    let conn = open_db_in_memory().unwrap();
    let (groups, tasks) = services(&conn);
    let ada = Uuid::new_v4();
    let grace = Uuid::new_v4();
    let group = groups.create_group("Lunch crew", ada, "Ada").unwrap();
    groups.join_group(&group.invite_code, grace, "Grace").unwrap();

    // Rotation: Ada, Grace, Ada. One manual override pinning Ada's third
    // run onto Grace instead.
    tasks.create_instance(request(group.uuid, "mario")).unwrap();
    tasks.create_instance(request(group.uuid, "sushi")).unwrap();
    let mut overridden = request(group.uuid, "mario");
    overridden.manual_person_id = Some(grace);
    tasks.create_instance(overridden).unwrap();

    let stats = tasks.group_stats(group.uuid).unwrap();
    assert_eq!(stats.total_instances, 3);
    assert_eq!(stats.total_cost, 42);
    assert_eq!(stats.average_cost, 14);
    assert_eq!(stats.override_count, 1);
    assert_eq!(stats.override_rate, 33.3);

    let burdened = stats.most_burdened.unwrap();
    assert_eq!(burdened.member_id, grace);
    assert_eq!(burdened.instance_count, 2);

    assert_eq!(stats.distance_breakdown.medium, 3);
    assert_eq!(stats.wait_breakdown.high, 3);
    assert_eq!(stats.money_breakdown.low, 3);

    assert_eq!(stats.top_venues.len(), 2);
    assert_eq!(stats.top_venues[0].venue, "mario");
    assert_eq!(stats.top_venues[0].count, 2);

    // Ledger: Ada 14, Grace 28. Mean 21, stddev 7 -> 100 - 33.33.
    assert!((stats.fairness_index - 66.666).abs() < 0.01);
}

#[test]
fn fairness_index_reads_zero_for_single_member_groups() {
    let conn = open_db_in_memory().unwrap();
    let (groups, tasks) = services(&conn);
    let group = groups
        .create_group("Solo crew", Uuid::new_v4(), "Ada")
        .unwrap();
    tasks.create_instance(request(group.uuid, "mario")).unwrap();

    let stats = tasks.group_stats(group.uuid).unwrap();
    assert_eq!(stats.fairness_index, 0.0);
}

#[test]
fn reset_zeroes_the_ledger_but_not_history() {
    let conn = open_db_in_memory().unwrap();
    let (groups, tasks) = services(&conn);
    let ada = Uuid::new_v4();
    let grace = Uuid::new_v4();
    let group = groups.create_group("Lunch crew", ada, "Ada").unwrap();
    groups.join_group(&group.invite_code, grace, "Grace").unwrap();

    tasks.create_instance(request(group.uuid, "mario")).unwrap();
    tasks.create_instance(request(group.uuid, "sushi")).unwrap();

    groups.reset_scores(group.uuid).unwrap();

    let loaded = groups.get_group(group.uuid).unwrap();
    assert!(loaded
        .members
        .iter()
        .all(|member| member.accumulated_cost == 0));

    // History is untouched; the post-reset ledger reads perfectly fair.
    let stats = tasks.group_stats(group.uuid).unwrap();
    assert_eq!(stats.total_instances, 2);
    assert_eq!(stats.total_cost, 28);
    assert_eq!(stats.fairness_index, 100.0);
}

#[test]
fn stats_remain_queryable_after_soft_delete() {
    let conn = open_db_in_memory().unwrap();
    let (groups, tasks) = services(&conn);
    let group = groups
        .create_group("Lunch crew", Uuid::new_v4(), "Ada")
        .unwrap();
    tasks.create_instance(request(group.uuid, "mario")).unwrap();

    groups.delete_group(group.uuid).unwrap();

    let stats = tasks.group_stats(group.uuid).unwrap();
    assert_eq!(stats.total_instances, 1);
}

#[test]
fn stats_serialize_with_lowercase_signal_names() {
    let conn = open_db_in_memory().unwrap();
    let (groups, tasks) = services(&conn);
    let group = groups
        .create_group("Lunch crew", Uuid::new_v4(), "Ada")
        .unwrap();
    let outcome = tasks.create_instance(request(group.uuid, "mario")).unwrap();

    let task_json = serde_json::to_value(&outcome.task).unwrap();
    assert_eq!(task_json["distance"], "medium");
    assert_eq!(task_json["wait"], "high");
    assert_eq!(task_json["money"], "low");
    assert_eq!(task_json["cost"], 14);

    let stats_json = serde_json::to_value(tasks.group_stats(group.uuid).unwrap()).unwrap();
    assert_eq!(stats_json["total_instances"], 1);
    assert_eq!(stats_json["distance_breakdown"]["medium"], 1);
    assert_eq!(stats_json["top_venues"][0]["venue"], "mario");
}
