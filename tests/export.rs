mod common;

use common::{Badge, Enrollment, College, Student, enrollment_map, student_map, tom_and_hanks};
use tabular_marshal::grid::Grid;
use tabular_marshal::marshal::{ExportOptions, MAX_PAGE_ROWS, export};
use tabular_marshal::types::FieldMap;

fn named(sheet_name: &str, page_capacity: usize) -> ExportOptions {
    ExportOptions {
        sheet_name: sheet_name.to_string(),
        page_capacity,
        ..Default::default()
    }
}

#[test]
fn export_writes_header_and_rows_in_field_map_order() {
    let wb = export(&tom_and_hanks(), &student_map(), &named("Students", 10)).unwrap();

    assert_eq!(wb.len(), 1);
    let sheet = wb.sheet("Students").unwrap();
    assert_eq!(sheet.row_count(), 3);
    assert_eq!(sheet.row_text(0), vec!["ID", "Name", "Score"]);
    assert_eq!(sheet.row_text(1), vec!["1", "Tom", "78"]);
    assert_eq!(sheet.row_text(2), vec!["2", "Hanks", "56"]);
}

#[test]
fn export_column_order_follows_field_map_not_declaration() {
    let map = FieldMap::from_pairs([("score", "Score"), ("id", "ID")]).unwrap();
    let wb = export(&tom_and_hanks(), &map, &ExportOptions::default()).unwrap();

    let sheet = wb.sheet("Sheet").unwrap();
    assert_eq!(sheet.row_text(0), vec!["Score", "ID"]);
    assert_eq!(sheet.row_text(1), vec!["78", "1"]);
}

#[test]
fn export_splits_pages_and_numbers_sheet_names() {
    let students: Vec<Student> = (1..=7).map(|i| Student::new(i, "S", i * 10)).collect();
    let wb = export(&students, &student_map(), &named("Roster", 3)).unwrap();

    assert_eq!(
        wb.sheet_names().collect::<Vec<_>>(),
        vec!["Roster1", "Roster2", "Roster3"]
    );
    let rows: Vec<usize> = wb.sheets().iter().map(|s| s.row_count() - 1).collect();
    assert_eq!(rows, vec![3, 3, 1]);

    for sheet in wb.sheets() {
        assert_eq!(sheet.row_text(0), vec!["ID", "Name", "Score"]);
    }
    // Each page restarts at row 1.
    assert_eq!(wb.sheet("Roster3").unwrap().row_text(1), vec!["7", "S", "70"]);
}

#[test]
fn out_of_range_capacity_means_one_large_page() {
    let students: Vec<Student> = (1..=5).map(|i| Student::new(i, "S", 0)).collect();
    for capacity in [0, MAX_PAGE_ROWS + 1, 100_000] {
        let wb = export(&students, &student_map(), &named("All", capacity)).unwrap();
        assert_eq!(wb.sheet_names().collect::<Vec<_>>(), vec!["All"]);
        assert_eq!(wb.sheets()[0].row_count(), 6);
    }
}

#[test]
fn export_sets_column_widths_from_widest_cell() {
    let wb = export(&tom_and_hanks(), &student_map(), &ExportOptions::default()).unwrap();
    let sheet = wb.sheet("Sheet").unwrap();

    // "ID" (2), "Hanks" (5), "Score" (5), each plus the default padding of 5.
    assert_eq!(sheet.column_width(0), Some(7));
    assert_eq!(sheet.column_width(1), Some(10));
    assert_eq!(sheet.column_width(2), Some(10));

    let opts = ExportOptions {
        column_padding: 0,
        ..Default::default()
    };
    let wb = export(&tom_and_hanks(), &student_map(), &opts).unwrap();
    assert_eq!(wb.sheets()[0].column_width(1), Some(5));
}

#[test]
fn export_rejects_empty_input() {
    let err = export::<Student>(&[], &student_map(), &ExportOptions::default()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "export failed: no data in source (no records to export)"
    );
}

#[test]
fn export_unknown_attribute_names_type_and_attribute() {
    let map = FieldMap::from_pairs([("id", "ID"), ("nickname", "Nickname")]).unwrap();
    let err = export(&tom_and_hanks(), &map, &ExportOptions::default()).unwrap_err();

    let msg = err.to_string();
    assert!(msg.starts_with("export failed: record 1, attribute 'nickname'"), "{msg}");
    assert!(msg.ends_with("type Student has no attribute 'nickname'"), "{msg}");
}

#[test]
fn export_renders_absent_nested_record_as_empty_cells() {
    let rows = vec![
        Enrollment {
            student_id: 10,
            college: Some(College {
                name: "Arts".to_string(),
                city: "Pune".to_string(),
            }),
        },
        Enrollment {
            student_id: 11,
            college: None,
        },
    ];
    let wb = export(&rows, &enrollment_map(), &ExportOptions::default()).unwrap();
    let sheet = wb.sheet("Sheet").unwrap();

    assert_eq!(sheet.row_text(1), vec!["10", "Arts", "Pune"]);
    assert_eq!(sheet.row_text(2), vec!["11", "", ""]);
}

#[test]
fn export_does_not_need_a_constructor() {
    let badges = vec![Badge {
        code: "B-7".to_string(),
    }];
    let map = FieldMap::from_pairs([("code", "Code")]).unwrap();
    let wb = export(&badges, &map, &ExportOptions::default()).unwrap();
    assert_eq!(wb.sheets()[0].row_text(1), vec!["B-7"]);
}
