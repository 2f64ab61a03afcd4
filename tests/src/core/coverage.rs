use stackmut_core::coverage::{
    ClassLine, CoverageDatabase, InMemoryCoverage, TestInfo, uncovered_indices,
};
use stackmut_core::decoder::{LineEntry, decode_code};
use stackmut_core::{ClassName, Location, Method};

fn clamp() -> Method {
    let code = [0x1a, 0x10, 0x0a, 0xa4, 0x00, 0x06, 0x10, 0x0a, 0xac, 0x1a, 0xac];
    let lines = [
        LineEntry { start_pc: 0, line: 3 },
        LineEntry { start_pc: 6, line: 4 },
        LineEntry { start_pc: 9, line: 5 },
    ];
    Method::new(
        Location::new("com.example.Limits", "clamp", "(I)I"),
        decode_code(&code, &lines).unwrap(),
    )
}

#[test]
fn only_unexecuted_lines_are_skipped() {
    let mut db = InMemoryCoverage::new();
    db.add_class("com.example.Limits", [3, 4, 5]);
    db.record(
        TestInfo::new("LimitsTest.small", 4),
        ClassLine::new("com.example.Limits", 3),
    );
    db.record(
        TestInfo::new("LimitsTest.small", 4),
        ClassLine::new("com.example.Limits", 5),
    );

    // Line 4 (`return 10`) never runs. Its range ends at the next line marker, so the
    // label in front of line 5 is skipped with it.
    let skipped: Vec<usize> = uncovered_indices(&clamp(), &db).into_iter().collect();
    assert_eq!(skipped, vec![4, 5, 6, 7]);

    let class = ClassName::new("com.example.Limits");
    assert_eq!(db.number_of_covered_lines(std::slice::from_ref(&class)), 2);
    assert_eq!(
        db.class_info(std::slice::from_ref(&class))[0].number_of_code_lines(),
        3
    );
}

#[test]
fn coverage_id_serializes_as_hex() {
    let mut db = InMemoryCoverage::new();
    db.record(
        TestInfo::new("LimitsTest.small", 4),
        ClassLine::new("com.example.Limits", 3),
    );
    let id = db.coverage_id_for_class(&ClassName::new("com.example.Limits"));
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json.len(), 64 + 2);
    assert!(json.trim_matches('"').chars().all(|c| c.is_ascii_hexdigit()));

    let empty = InMemoryCoverage::new().coverage_id_for_class(&ClassName::new("com.example.Limits"));
    assert_ne!(id, empty);
}
