use chrono::NaiveDate;
use holiday_core::db::open_db_in_memory;
use holiday_core::{
    month_window, year_window, DateRange, DayStatus, DirectoryService, EmployeeDraft, RangeEdit,
    RangeRequest, SqliteDirectoryRepository, SqliteVacationRepository, TeamScope, ToggleAction,
    ToggleRequest, VacationKind, VacationService, VacationServiceError,
};
use rusqlite::Connection;
use std::collections::{BTreeMap, BTreeSet};

fn d(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

struct Seed {
    core: i64,
    ops: i64,
    ada: i64,
    grace: i64,
    linus: i64,
}

fn seeded() -> (Connection, Seed) {
    let conn = open_db_in_memory().unwrap();
    let seed = {
        let directory = DirectoryService::new(SqliteDirectoryRepository::try_new(&conn).unwrap());
        let core = directory.create_team("Core", None).unwrap().id;
        let ops = directory.create_team("Ops", None).unwrap().id;
        let add = |team_id: i64, name: &str| {
            directory
                .create_employee(&EmployeeDraft {
                    team_id,
                    name: name.to_string(),
                    ..EmployeeDraft::default()
                })
                .unwrap()
                .id
        };
        Seed {
            core,
            ops,
            ada: add(core, "Ada"),
            grace: add(core, "Grace"),
            linus: add(ops, "Linus"),
        }
    };
    (conn, seed)
}

fn request(employee_id: i64, start: NaiveDate, end: NaiveDate) -> RangeRequest {
    RangeRequest {
        employee_id,
        start_date: start,
        end_date: end,
        kind: VacationKind::Vacation,
        notes: None,
    }
}

fn stored_ranges(conn: &Connection, employee_id: i64) -> Vec<(String, String)> {
    let mut stmt = conn
        .prepare(
            "SELECT start_date, end_date FROM vacations
             WHERE employee_id = ?1
             ORDER BY start_date;",
        )
        .unwrap();
    stmt.query_map([employee_id], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

fn install_failing_trigger(conn: &Connection) {
    conn.execute_batch(
        "CREATE TRIGGER vacations_reject_boom
         BEFORE INSERT ON vacations
         WHEN NEW.notes = 'boom'
         BEGIN
             SELECT RAISE(ABORT, 'rejected by test trigger');
         END;",
    )
    .unwrap();
}

#[test]
fn toggle_persists_split_and_restores_on_second_toggle() {
    let (mut conn, seed) = seeded();
    {
        let mut service = VacationService::new(SqliteVacationRepository::try_new(&mut conn).unwrap());
        service
            .create_range(&request(seed.ada, d(2024, 12, 22), d(2024, 12, 31)))
            .unwrap();

        let outcome = service.toggle_day(seed.ada, d(2024, 12, 25)).unwrap();
        assert_eq!(outcome.action, ToggleAction::Removed);
        assert_eq!(outcome.ranges.len(), 2);
        assert!(outcome.ranges.iter().all(|row| row.id.is_some()));
    }
    assert_eq!(
        stored_ranges(&conn, seed.ada),
        vec![
            ("2024-12-22".to_string(), "2024-12-24".to_string()),
            ("2024-12-26".to_string(), "2024-12-31".to_string()),
        ]
    );

    {
        let mut service = VacationService::new(SqliteVacationRepository::try_new(&mut conn).unwrap());
        let outcome = service
            .apply_toggle(&ToggleRequest {
                employee_id: seed.ada,
                date: d(2024, 12, 25),
            })
            .unwrap();
        assert_eq!(outcome.action, ToggleAction::Added);
    }
    assert_eq!(
        stored_ranges(&conn, seed.ada),
        vec![("2024-12-22".to_string(), "2024-12-31".to_string())]
    );
}

#[test]
fn create_range_merges_touching_rows_so_toggle_round_trips() {
    let (mut conn, seed) = seeded();
    {
        let mut service = VacationService::new(SqliteVacationRepository::try_new(&mut conn).unwrap());
        let first = service
            .create_range(&request(seed.ada, d(2025, 1, 1), d(2025, 1, 5)))
            .unwrap();
        let merged = service
            .create_range(&request(seed.ada, d(2025, 1, 6), d(2025, 1, 10)))
            .unwrap();
        assert_ne!(merged.id, first.id);
        assert_eq!(
            merged.range,
            DateRange::new(d(2025, 1, 1), d(2025, 1, 10)).unwrap()
        );
        service
            .create_range(&RangeRequest {
                notes: Some("dentist".to_string()),
                ..request(seed.ada, d(2025, 1, 11), d(2025, 1, 11))
            })
            .unwrap();
    }
    let before = stored_ranges(&conn, seed.ada);
    assert_eq!(
        before,
        vec![
            ("2025-01-01".to_string(), "2025-01-10".to_string()),
            ("2025-01-11".to_string(), "2025-01-11".to_string()),
        ]
    );

    {
        let mut service = VacationService::new(SqliteVacationRepository::try_new(&mut conn).unwrap());
        service.toggle_day(seed.ada, d(2025, 1, 5)).unwrap();
        service.toggle_day(seed.ada, d(2025, 1, 5)).unwrap();
    }
    assert_eq!(stored_ranges(&conn, seed.ada), before);
}

#[test]
fn edit_range_merges_with_touching_rows_of_same_label() {
    let (mut conn, seed) = seeded();
    let mut service = VacationService::new(SqliteVacationRepository::try_new(&mut conn).unwrap());
    service
        .create_range(&request(seed.ada, d(2025, 2, 1), d(2025, 2, 3)))
        .unwrap();
    service
        .create_range(&RangeRequest {
            kind: VacationKind::Sick,
            ..request(seed.ada, d(2025, 2, 7), d(2025, 2, 8))
        })
        .unwrap();
    let moving = service
        .create_range(&request(seed.ada, d(2025, 2, 20), d(2025, 2, 22)))
        .unwrap();

    let stored = service
        .edit_range(
            moving.id.unwrap(),
            &RangeEdit {
                start_date: d(2025, 2, 4),
                end_date: d(2025, 2, 6),
                kind: VacationKind::Vacation,
                notes: None,
            },
        )
        .unwrap();

    assert_eq!(
        stored.range,
        DateRange::new(d(2025, 2, 1), d(2025, 2, 6)).unwrap()
    );
    let rows = service.ranges(seed.ada).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], stored);
    assert_eq!(rows[1].kind, VacationKind::Sick);
    assert!(matches!(
        service.get_range(moving.id.unwrap()),
        Err(VacationServiceError::NotFound { .. })
    ));
}

#[test]
fn toggle_uses_configured_kind_for_new_days() {
    let (mut conn, seed) = seeded();
    let mut service = VacationService::new(SqliteVacationRepository::try_new(&mut conn).unwrap())
        .with_toggle_kind(VacationKind::Personal);

    let outcome = service.toggle_day(seed.ada, d(2025, 5, 2)).unwrap();

    assert_eq!(outcome.ranges.len(), 1);
    assert_eq!(outcome.ranges[0].kind, VacationKind::Personal);
    assert_eq!(service.ranges(seed.ada).unwrap()[0].kind, VacationKind::Personal);
}

#[test]
fn toggle_for_unknown_employee_is_not_found() {
    let (mut conn, _seed) = seeded();
    let mut service = VacationService::new(SqliteVacationRepository::try_new(&mut conn).unwrap());

    let err = service.toggle_day(999, d(2025, 1, 1)).unwrap_err();

    assert!(matches!(
        err,
        VacationServiceError::NotFound {
            entity: "employee",
            id: 999
        }
    ));
}

#[test]
fn create_range_rejects_conflicts_before_writing() {
    let (mut conn, seed) = seeded();
    {
        let mut service = VacationService::new(SqliteVacationRepository::try_new(&mut conn).unwrap());
        let first = service
            .create_range(&request(seed.ada, d(2025, 1, 1), d(2025, 1, 10)))
            .unwrap();

        let err = service
            .create_range(&request(seed.ada, d(2025, 1, 8), d(2025, 1, 15)))
            .unwrap_err();
        match err {
            VacationServiceError::Conflict {
                employee_id,
                conflicts,
            } => {
                assert_eq!(employee_id, seed.ada);
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].id, first.id);
            }
            other => panic!("unexpected error: {other}"),
        }

        service
            .create_range(&RangeRequest {
                kind: VacationKind::Sick,
                ..request(seed.ada, d(2025, 1, 11), d(2025, 1, 15))
            })
            .unwrap();
        service
            .create_range(&request(seed.grace, d(2025, 1, 8), d(2025, 1, 15)))
            .unwrap();
    }
    assert_eq!(stored_ranges(&conn, seed.ada).len(), 2);
}

#[test]
fn create_range_rejects_inverted_dates() {
    let (mut conn, seed) = seeded();
    let mut service = VacationService::new(SqliteVacationRepository::try_new(&mut conn).unwrap());

    let err = service
        .create_range(&request(seed.ada, d(2025, 1, 10), d(2025, 1, 1)))
        .unwrap_err();

    assert!(matches!(err, VacationServiceError::InvalidRange(_)));
}

#[test]
fn edit_range_ignores_itself_but_not_siblings() {
    let (mut conn, seed) = seeded();
    let mut service = VacationService::new(SqliteVacationRepository::try_new(&mut conn).unwrap());
    let first = service
        .create_range(&request(seed.ada, d(2025, 2, 1), d(2025, 2, 5)))
        .unwrap();
    let second = service
        .create_range(&request(seed.ada, d(2025, 2, 10), d(2025, 2, 12)))
        .unwrap();
    let first_id = first.id.unwrap();

    let grown = service
        .edit_range(
            first_id,
            &RangeEdit {
                start_date: d(2025, 2, 1),
                end_date: d(2025, 2, 8),
                kind: VacationKind::Sick,
                notes: Some("flu".to_string()),
            },
        )
        .unwrap();
    assert_eq!(grown.id, first.id);
    assert_eq!(grown.employee_id, seed.ada);
    assert_eq!(service.get_range(first_id).unwrap(), grown);

    let err = service
        .edit_range(
            first_id,
            &RangeEdit {
                start_date: d(2025, 2, 1),
                end_date: d(2025, 2, 10),
                kind: VacationKind::Sick,
                notes: None,
            },
        )
        .unwrap_err();
    match err {
        VacationServiceError::Conflict { conflicts, .. } => {
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].id, second.id);
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(matches!(
        service.edit_range(
            999,
            &RangeEdit {
                start_date: d(2025, 3, 1),
                end_date: d(2025, 3, 1),
                kind: VacationKind::Vacation,
                notes: None,
            }
        ),
        Err(VacationServiceError::NotFound {
            entity: "vacation",
            ..
        })
    ));
}

#[test]
fn check_conflicts_honours_exclude_id() {
    let (mut conn, seed) = seeded();
    let mut service = VacationService::new(SqliteVacationRepository::try_new(&mut conn).unwrap());
    let row = service
        .create_range(&request(seed.ada, d(2025, 4, 1), d(2025, 4, 4)))
        .unwrap();

    let probe = request(seed.ada, d(2025, 4, 3), d(2025, 4, 6));
    assert_eq!(service.check_conflicts(&probe, None).unwrap().len(), 1);
    assert!(service.check_conflicts(&probe, row.id).unwrap().is_empty());
}

#[test]
fn delete_range_removes_row_and_reports_missing_ids() {
    let (mut conn, seed) = seeded();
    let mut service = VacationService::new(SqliteVacationRepository::try_new(&mut conn).unwrap());
    let row = service
        .create_range(&request(seed.ada, d(2025, 4, 1), d(2025, 4, 4)))
        .unwrap();
    let id = row.id.unwrap();

    service.delete_range(id).unwrap();

    assert!(service.ranges(seed.ada).unwrap().is_empty());
    assert!(matches!(
        service.delete_range(id),
        Err(VacationServiceError::NotFound { .. })
    ));
}

#[test]
fn replace_days_stores_normalized_ranges() {
    let (mut conn, seed) = seeded();
    let mut service = VacationService::new(SqliteVacationRepository::try_new(&mut conn).unwrap());
    service
        .create_range(&request(seed.ada, d(2025, 6, 1), d(2025, 6, 30)))
        .unwrap();

    let days: BTreeSet<NaiveDate> = [d(2025, 1, 5), d(2025, 1, 1), d(2025, 1, 2), d(2025, 1, 3)]
        .into_iter()
        .collect();
    let rows = service
        .replace_days(seed.ada, &days, VacationKind::Vacation, Some("winter"))
        .unwrap();

    assert_eq!(
        rows.iter().map(|row| row.range).collect::<Vec<_>>(),
        vec![
            DateRange::new(d(2025, 1, 1), d(2025, 1, 3)).unwrap(),
            DateRange::single(d(2025, 1, 5)),
        ]
    );
    assert!(rows.iter().all(|row| row.notes.as_deref() == Some("winter")));
    assert_eq!(service.ranges(seed.ada).unwrap(), rows);

    let cleared = service
        .replace_days(seed.ada, &BTreeSet::new(), VacationKind::Vacation, None)
        .unwrap();
    assert!(cleared.is_empty());
    assert!(service.ranges(seed.ada).unwrap().is_empty());
}

#[test]
fn replace_kinded_days_keeps_kind_boundaries() {
    let (mut conn, seed) = seeded();
    let mut service = VacationService::new(SqliteVacationRepository::try_new(&mut conn).unwrap());

    let mut days = BTreeMap::new();
    days.insert(d(2025, 3, 3), VacationKind::Sick);
    days.insert(d(2025, 3, 4), VacationKind::Sick);
    days.insert(d(2025, 3, 5), VacationKind::Vacation);

    let rows = service.replace_kinded_days(seed.ada, &days).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].kind, VacationKind::Sick);
    assert_eq!(rows[0].range.len_days(), 2);
    assert_eq!(rows[1].kind, VacationKind::Vacation);
}

#[test]
fn failing_replace_keeps_previous_rows() {
    let (mut conn, seed) = seeded();
    install_failing_trigger(&conn);
    {
        let mut service = VacationService::new(SqliteVacationRepository::try_new(&mut conn).unwrap());
        service
            .create_range(&request(seed.ada, d(2025, 8, 1), d(2025, 8, 3)))
            .unwrap();

        let days: BTreeSet<NaiveDate> = [d(2025, 9, 1), d(2025, 9, 2)].into_iter().collect();
        let err = service
            .replace_days(seed.ada, &days, VacationKind::Vacation, Some("boom"))
            .unwrap_err();
        assert!(matches!(err, VacationServiceError::PersistenceFailure(_)));
    }

    assert_eq!(
        stored_ranges(&conn, seed.ada),
        vec![("2025-08-01".to_string(), "2025-08-03".to_string())]
    );
}

#[test]
fn failing_toggle_keeps_previous_rows() {
    let (mut conn, seed) = seeded();
    install_failing_trigger(&conn);
    conn.execute(
        "INSERT INTO vacations (employee_id, start_date, end_date, notes)
         VALUES (?1, '2025-08-01', '2025-08-05', 'before');",
        [seed.ada],
    )
    .unwrap();
    conn.execute(
        "UPDATE vacations SET notes = 'boom' WHERE employee_id = ?1;",
        [seed.ada],
    )
    .unwrap();

    {
        let mut service = VacationService::new(SqliteVacationRepository::try_new(&mut conn).unwrap());
        let err = service.toggle_day(seed.ada, d(2025, 8, 3)).unwrap_err();
        assert!(matches!(err, VacationServiceError::PersistenceFailure(_)));
    }

    assert_eq!(
        stored_ranges(&conn, seed.ada),
        vec![("2025-08-01".to_string(), "2025-08-05".to_string())]
    );
}

#[test]
fn calendar_projects_team_window() {
    let (mut conn, seed) = seeded();
    let mut service = VacationService::new(SqliteVacationRepository::try_new(&mut conn).unwrap());
    service
        .create_range(&request(seed.ada, d(2024, 12, 20), d(2025, 1, 5)))
        .unwrap();
    service
        .create_range(&RangeRequest {
            kind: VacationKind::Sick,
            ..request(seed.linus, d(2024, 12, 30), d(2024, 12, 30))
        })
        .unwrap();
    let window = DateRange::new(d(2024, 12, 25), d(2024, 12, 31)).unwrap();

    let core = service.calendar(TeamScope::Team(seed.core), &window).unwrap();
    assert_eq!(
        core.iter()
            .map(|row| row.entry.employee.name.as_str())
            .collect::<Vec<_>>(),
        vec!["Ada", "Grace"]
    );
    assert_eq!(core[0].total_days, 7);
    assert_eq!(core[0].entry.team_name, "Core");
    assert_eq!(core[0].vacations[0].range.len_days(), 17);
    assert_eq!(core[1].total_days, 0);

    let all = service.calendar(TeamScope::All, &window).unwrap();
    assert_eq!(all.len(), 3);
    let linus = all
        .iter()
        .find(|row| row.entry.employee.id == seed.linus)
        .unwrap();
    assert_eq!(linus.entry.employee.team_id, seed.ops);
    assert_eq!(
        linus.status_on(d(2024, 12, 30)),
        DayStatus::OnVacation(VacationKind::Sick)
    );
}

#[test]
fn vacation_day_totals_and_lookups() {
    let (mut conn, seed) = seeded();
    let mut service = VacationService::new(SqliteVacationRepository::try_new(&mut conn).unwrap());
    service
        .create_range(&request(seed.ada, d(2024, 12, 30), d(2025, 1, 12)))
        .unwrap();

    let year = year_window(2025).unwrap();
    assert_eq!(service.vacation_days(seed.ada, &year).unwrap(), 12);
    assert_eq!(service.vacation_weekdays(seed.ada, &year).unwrap(), 8);
    assert_eq!(
        service
            .vacation_days(seed.ada, &month_window(2025, 2).unwrap())
            .unwrap(),
        0
    );

    assert!(service.is_on_vacation(seed.ada, d(2025, 1, 1)).unwrap());
    assert!(!service.is_on_vacation(seed.ada, d(2025, 1, 13)).unwrap());
    assert!(!service.is_on_vacation(seed.grace, d(2025, 1, 1)).unwrap());
    assert!(matches!(
        service.is_on_vacation(999, d(2025, 1, 1)),
        Err(VacationServiceError::NotFound { .. })
    ));
}

#[test]
fn deleting_employee_cascades_vacations() {
    let (mut conn, seed) = seeded();
    {
        let mut service = VacationService::new(SqliteVacationRepository::try_new(&mut conn).unwrap());
        service
            .create_range(&request(seed.ada, d(2025, 1, 1), d(2025, 1, 2)))
            .unwrap();
    }
    {
        let directory = DirectoryService::new(SqliteDirectoryRepository::try_new(&conn).unwrap());
        directory.delete_employee(seed.ada).unwrap();
    }

    assert!(stored_ranges(&conn, seed.ada).is_empty());
}
