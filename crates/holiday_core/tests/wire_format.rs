use chrono::NaiveDate;
use holiday_core::{
    project_calendar, toggle, DateRange, Employee, RangeError, RangeRequest, RosterEntry,
    ToggleRequest, Vacation, VacationKind,
};
use serde_json::json;

fn d(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn vacation_serializes_flat_with_type_field() {
    let row = Vacation {
        id: Some(4),
        ..Vacation::new(
            2,
            DateRange::new(d(2025, 1, 1), d(2025, 1, 3)).unwrap(),
            VacationKind::Sick,
        )
    };

    assert_eq!(
        serde_json::to_value(&row).unwrap(),
        json!({
            "id": 4,
            "employee_id": 2,
            "start_date": "2025-01-01",
            "end_date": "2025-01-03",
            "type": "sick",
            "notes": null
        })
    );
}

#[test]
fn vacation_with_inverted_dates_fails_to_decode() {
    let payload = json!({
        "id": null,
        "employee_id": 2,
        "start_date": "2025-01-05",
        "end_date": "2025-01-01"
    });

    assert!(serde_json::from_value::<Vacation>(payload).is_err());
}

#[test]
fn toggle_request_decodes_employee_and_date() {
    let request: ToggleRequest =
        serde_json::from_value(json!({"employee_id": 9, "date": "2025-12-24"})).unwrap();

    assert_eq!(request.employee_id, 9);
    assert_eq!(request.date, d(2025, 12, 24));
}

#[test]
fn range_request_defaults_type_and_validates_late() {
    let request: RangeRequest = serde_json::from_value(json!({
        "employee_id": 1,
        "start_date": "2025-03-10",
        "end_date": "2025-03-01"
    }))
    .unwrap();

    assert_eq!(request.kind, VacationKind::Vacation);
    assert_eq!(request.notes, None);
    assert!(matches!(
        request.to_vacation(),
        Err(RangeError::InvalidRange { .. })
    ));
}

#[test]
fn toggle_outcome_and_calendar_serialize() {
    let outcome = toggle(1, d(2025, 1, 1), &[], VacationKind::Vacation);
    let value = serde_json::to_value(&outcome).unwrap();
    assert_eq!(value["action"], "added");
    assert_eq!(value["changes"]["insert"][0]["start_date"], "2025-01-01");

    let roster = vec![RosterEntry {
        employee: Employee {
            id: 1,
            team_id: 3,
            name: "Ada".to_string(),
            email: None,
            role: None,
        },
        team_name: "Core".to_string(),
    }];
    let window = DateRange::new(d(2025, 1, 1), d(2025, 1, 2)).unwrap();
    let calendar = project_calendar(&roster, &outcome.ranges, &window);
    let value = serde_json::to_value(&calendar).unwrap();

    assert_eq!(value[0]["name"], "Ada");
    assert_eq!(value[0]["team_name"], "Core");
    assert_eq!(value[0]["total_days"], 1);
    assert_eq!(value[0]["days"]["2025-01-01"]["type"], "vacation");
}
