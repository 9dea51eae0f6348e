use serde_json::json;

use conduit_core::{AppError, DateRange, ErrorCode, WorkScheduler};

use crate::integration::common::{config, date, dimension, metric};

#[test]
fn date_range_covers_both_ends() {
    for (start, end, days) in [
        ("2024-01-01", "2024-01-01", 1),
        ("2024-02-28", "2024-03-01", 3),
        ("2023-12-30", "2024-01-02", 4),
        ("2024-01-01", "2024-12-31", 366),
    ] {
        let range = DateRange::parse(start, end).unwrap();
        let dates = range.days();

        assert_eq!(dates.len(), days, "{start}..{end}");
        assert_eq!(dates.first().copied(), Some(date(start)));
        assert_eq!(dates.last().copied(), Some(date(end)));
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn date_range_errors() {
    assert!(matches!(
        DateRange::parse("2024-02-30", "2024-03-01"),
        Err(AppError::InvalidDate(_))
    ));
    assert!(matches!(
        DateRange::parse("2024-01-01", "2024-1-5"),
        Err(AppError::InvalidDate(_))
    ));
    let err = DateRange::parse("2024-03-02", "2024-03-01").unwrap_err();
    assert!(matches!(err, AppError::InvalidRange { .. }));
    assert_eq!(err.error_code(), ErrorCode::InvalidDate);
}

#[test]
fn scheduler_resolves_config_sections() {
    let config = config(
        json!({
            "adAccounts": [{"account_id": "act_1", "name": "Main"}, {"id": "act_2"}],
            "requests": [dimension("campaigns"), metric("insights")]
        }),
        "2024-05-01",
        "2024-05-07",
    );
    let scheduler = WorkScheduler::from_config(&config).unwrap();

    assert_eq!(scheduler.dates().len(), 7);
    let ids: Vec<&str> = scheduler.requests().iter().map(|r| r.id()).collect();
    assert_eq!(ids, ["campaigns", "insights"]);
    let accounts: Vec<&str> = scheduler
        .accounts()
        .iter()
        .filter_map(|a| a.normalized_id())
        .collect();
    assert_eq!(accounts, ["act_1", "act_2"]);
}

#[test]
fn bad_config_date_fails_scheduling() {
    let config = config(json!({"requests": [metric("A")]}), "yesterday", "2024-01-01");
    assert!(matches!(
        WorkScheduler::from_config(&config),
        Err(AppError::InvalidDate(_))
    ));
}

#[test]
fn request_schema_is_typed() {
    let config = config(
        json!({
            "requests": [{
                "connectorsaccountrequest": {
                    "id": "insights",
                    "status": 200,
                    "name": "Insights",
                    "schema": {
                        "tableName": "insights",
                        "orderedFields": [
                            {"fieldPath": "spend", "fieldSrc": "spend", "databaseMetaData": {"name": "spend", "isMetric": true, "type": "FLOAT"}}
                        ]
                    }
                }
            }]
        }),
        "2024-01-01",
        "2024-01-01",
    );
    let requests = config.requests().unwrap();
    let schema = requests[0].table_schema().unwrap();
    assert_eq!(schema.table_name, "insights");
    assert_eq!(schema.ordered_fields[0].database_meta_data.field_type, "FLOAT");
    assert!(schema.ordered_fields[0].database_meta_data.is_metric);
}
