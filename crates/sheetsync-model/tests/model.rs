use sheetsync_model::{ColumnSummary, DataSummary, SourceCount};

#[test]
fn summary_serializes() {
    let summary = DataSummary {
        total_rows: 3,
        total_columns: 2,
        columns: vec![
            ColumnSummary {
                name: "id".to_string(),
                dtype: "i8".to_string(),
                null_count: 0,
            },
            ColumnSummary {
                name: "source_file".to_string(),
                dtype: "str".to_string(),
                null_count: 0,
            },
        ],
        memory_usage_mb: 0.0,
        source_files: vec![SourceCount {
            file_name: "a.xlsx".to_string(),
            rows: 3,
        }],
    };
    let json = serde_json::to_string(&summary).expect("serialize summary");
    let round: DataSummary = serde_json::from_str(&json).expect("deserialize summary");
    assert_eq!(round, summary);
    assert_eq!(round.column_names(), vec!["id", "source_file"]);
    assert_eq!(round.null_count("id"), Some(0));
    assert_eq!(round.dtype("id"), Some("i8"));
    assert_eq!(round.source_rows("a.xlsx"), Some(3));
    assert_eq!(round.source_rows("b.xlsx"), None);
}
