//! Integration tests for the parse → serialize round-trip across the
//! full task surface: signifiers, tags, block links, global filter and
//! fallback dates.

use chrono::NaiveDate;
use taskdown::{GlobalFilter, ParseContext, Settings, StatusRegistry, Task, TaskLocation};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn location() -> TaskLocation {
    TaskLocation::new("work/roadmap.md", 12, 10, 2, Some("## This week".to_string()))
}

fn parse_with(line: &str, settings: &Settings) -> Option<Task> {
    let registry = StatusRegistry::new();
    let ctx = ParseContext::new(settings, &registry);
    Task::from_line(line, location(), None, &ctx)
}

fn parse(line: &str) -> Task {
    parse_with(line, &Settings::default()).expect("line should parse as a task")
}

// ============================================================================
// Round-Trip
// ============================================================================

#[test]
fn test_roundtrip_corpus() {
    // Serializing a freshly parsed task reproduces the line, and parsing
    // the output again yields an identical task.
    let corpus = [
        "- [ ] plain task",
        "- [x] completed ✅ 2024-01-05",
        "* [ ] star marker with tag #work",
        "+ [ ] plus marker",
        "12. [ ] numbered item",
        "    - [ ] indented four spaces",
        "\t- [ ] indented with a tab",
        "> - [ ] quoted task",
        "- [/] half done",
        "- [-] cancelled ❌ 2024-01-04",
        "- [ ] full dates ➕ 2024-01-01 🛫 2024-01-02 ⏳ 2024-01-03 📅 2024-01-05",
        "- [ ] priorities ⏫",
        "- [ ] lowest priority ⏬",
        "- [ ] recurring 📅 2024-01-08 🔁 every 2 weeks",
        "- [ ] when done rule ⏳ 2024-01-15 🔁 every month when done",
        "- [ ] tags mixed #one in text #two 🔼 📅 2024-02-01",
        "- [ ] dependencies ⛔ aaa111,bbb222 🆔 ccc333",
        "- [ ] anchored task 📅 2024-03-03 ^block-ref",
    ];

    for line in corpus {
        let task = parse(line);
        assert_eq!(task.to_file_line_string(), line, "serialize changed: {line}");

        let reparsed = parse(&task.to_file_line_string());
        assert!(
            task.identical_to(&reparsed),
            "reparse differs for: {line}"
        );
    }
}

#[test]
fn test_non_tasks_yield_none_not_errors() {
    let settings = Settings::default();
    for line in [
        "",
        "plain prose",
        "# heading",
        "- list item without checkbox",
        "-[ ] missing space after marker",
        "> quoted prose",
    ] {
        assert!(parse_with(line, &settings).is_none(), "should not parse: {line}");
    }
}

#[test]
fn test_location_is_carried_through() {
    let task = parse("- [ ] located");
    assert_eq!(task.path(), "work/roadmap.md");
    assert_eq!(task.location().line_number(), 12);
    assert_eq!(task.location().section_start(), 10);
    assert_eq!(task.location().section_index(), 2);
    assert_eq!(task.preceding_header(), Some("## This week"));
    assert_eq!(task.filename(), Some("roadmap".to_string()));
}

// ============================================================================
// Global Filter
// ============================================================================

#[test]
fn test_global_filter_gates_and_preserves_roundtrip() {
    let mut settings = Settings::default();
    settings.global_filter = GlobalFilter::new("#task");

    assert!(parse_with("- [ ] not gated", &settings).is_none());

    let line = "- [ ] #task gated and kept 📅 2024-01-10";
    let task = parse_with(line, &settings).unwrap();
    // Round-trip keeps the filter token in place.
    assert_eq!(task.to_file_line_string(), line);
    // The filter token is not reported as a tag.
    assert!(task.tags().is_empty());
}

#[test]
fn test_global_filter_removal_changes_description_only() {
    let mut settings = Settings::default();
    settings.global_filter = GlobalFilter::new("#task").with_removal();

    let task = parse_with("- [ ] #task write report", &settings).unwrap();
    assert_eq!(task.description(), "write report");
}

// ============================================================================
// Fallback Scheduled Date
// ============================================================================

#[test]
fn test_fallback_scheduled_date_from_filename() {
    let settings = Settings::default();
    let registry = StatusRegistry::new();
    let ctx = ParseContext::new(&settings, &registry);
    let daily_note = TaskLocation::from_unknown_position("daily/2024-01-15.md");

    let task = Task::from_line("- [ ] from daily note", daily_note, Some(date(2024, 1, 15)), &ctx)
        .unwrap();
    assert_eq!(task.scheduled_date(), Some(date(2024, 1, 15)));
    assert!(task.scheduled_date_is_inferred());
    assert_eq!(task.to_file_line_string(), "- [ ] from daily note");
}

// ============================================================================
// Statuses
// ============================================================================

#[test]
fn test_custom_status_symbols_parse_and_cycle() {
    let mut settings = Settings::default();
    settings.custom_statuses = vec![
        taskdown::StatusConfiguration::new('!', "Important", 'x', taskdown::StatusType::Todo),
    ];
    let registry = StatusRegistry::with_custom(&settings.custom_statuses);
    let ctx = ParseContext::new(&settings, &registry);

    let task = Task::from_line(
        "- [!] act fast",
        TaskLocation::from_unknown_position("a.md"),
        None,
        &ctx,
    )
    .unwrap();
    assert_eq!(task.status().name(), "Important");

    let toggled = task.toggle(date(2024, 1, 10), &settings, &registry);
    assert_eq!(toggled[0].status().symbol(), 'x');
}

#[test]
fn test_unknown_status_symbol_is_todo_like() {
    let task = parse("- [?] mystery meat");
    assert_eq!(task.status().name(), "Unknown");
    assert!(!task.is_done());
    assert_eq!(task.to_file_line_string(), "- [?] mystery meat");
}
