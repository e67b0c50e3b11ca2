//! The query language: parsing instruction statements into filters,
//! sorters, groupers and layout options, and running the resulting
//! pipeline over a task collection.
//!
//! Statements are matched against an explicit instruction table in a
//! documented priority order; the first category that recognizes a line
//! wins. A line no category understands sets the query's error and halts
//! further parsing - but instructions accepted before the error remain in
//! effect, so a half-written query still shows partial results semantics
//! ("terminal but partial").

pub mod filter;
pub mod group;
pub mod grouper;
pub mod layout;
pub mod result;
pub mod scanner;
pub mod statement;
pub mod sorter;

pub use filter::{Field, Filter, SearchContext};
pub use group::{GroupHeading, TaskGroup, TaskGroups};
pub use grouper::Grouper;
pub use layout::LayoutOptions;
pub use result::QueryResult;
pub use sorter::Sorter;
pub use statement::{QueryFile, Statement, PLACEHOLDER_EXPANSION_LIMIT};

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::warn;

use crate::settings::Settings;
use crate::task::Task;

/// How deep `preset` statements may nest before parsing refuses.
pub const PRESET_NESTING_LIMIT: usize = 3;

// ============================================================================
// Query Context
// ============================================================================

/// Inputs the pipeline needs besides the query itself: the injected
/// "today" and the settings snapshot.
#[derive(Debug, Clone, Copy)]
pub struct QueryContext<'a> {
    pub today: NaiveDate,
    pub settings: &'a Settings,
}

impl<'a> QueryContext<'a> {
    #[must_use]
    pub fn new(today: NaiveDate, settings: &'a Settings) -> Self {
        Self { today, settings }
    }
}

// ============================================================================
// Query
// ============================================================================

/// A parsed query: compiled filters, sorters and groupers, limits, layout
/// flags, and the error slot.
#[derive(Debug)]
pub struct Query {
    source: String,
    filters: Vec<Filter>,
    sorters: Vec<Sorter>,
    groupers: Vec<Grouper>,
    limit: Option<usize>,
    group_limit: Option<usize>,
    layout: LayoutOptions,
    ignore_global_query: bool,
    error: Option<String>,
}

struct ParseEnv<'a> {
    settings: &'a Settings,
    file: &'a QueryFile,
}

impl Query {
    /// Parse query source text.
    ///
    /// Parsing never fails: problems are recorded in [`Query::error`] and
    /// the instructions accepted so far stay usable.
    #[must_use]
    pub fn parse(source: &str, file: &QueryFile, settings: &Settings) -> Query {
        let mut query = Query {
            source: source.to_string(),
            filters: Vec::new(),
            sorters: Vec::new(),
            groupers: Vec::new(),
            limit: None,
            group_limit: None,
            layout: LayoutOptions::default(),
            ignore_global_query: false,
            error: None,
        };

        let env = ParseEnv { settings, file };
        for raw in scanner::scan(source) {
            if query.error.is_some() {
                break;
            }
            query.process_statement(&raw, &env, 0);
        }
        query
    }

    /// Parse query source with the settings' global query prepended,
    /// unless the source opts out with `ignore global query`.
    #[must_use]
    pub fn parse_with_global_query(source: &str, file: &QueryFile, settings: &Settings) -> Query {
        let query = Query::parse(source, file, settings);
        if settings.global_query.trim().is_empty() || query.ignore_global_query {
            return query;
        }
        let combined = format!("{}\n{}", settings.global_query, source);
        Query::parse(&combined, file, settings)
    }

    /// Compose this query with additional source text and re-parse.
    ///
    /// Filters concatenate; sort and group instructions concatenate with
    /// the earlier ones as primary keys; a later `limit` overwrites an
    /// earlier one.
    #[must_use]
    pub fn append(&self, additional_source: &str, file: &QueryFile, settings: &Settings) -> Query {
        let combined = format!("{}\n{}", self.source, additional_source);
        Query::parse(&combined, file, settings)
    }

    // ========================================================================
    // Statement Dispatch
    // ========================================================================

    fn process_statement(&mut self, raw: &str, env: &ParseEnv<'_>, depth: usize) {
        let statement = match statement::expand_placeholders(raw, env.file) {
            Ok(text) => Statement::new(raw, text),
            Err(reason) => {
                self.set_error(format!("{reason}\nProblem line: \"{raw}\""));
                return;
            }
        };

        let lower = statement.text().trim().to_lowercase();
        let instruction = instruction_table()
            .iter()
            .find(|def| (def.recognizes)(&lower))
            .expect("the filter category recognizes every line");

        if let Err(message) = (instruction.handle)(self, &statement, env, depth) {
            self.set_error(message);
        }
    }

    fn set_error(&mut self, message: String) {
        // The error slot is set at most once; parsing halts afterwards.
        if self.error.is_none() {
            warn!(error = %message, "query parse error");
            self.error = Some(message);
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Add a host-supplied filter (see [`Filter::from_fn`]).
    pub fn add_filter(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    pub fn sorters(&self) -> &[Sorter] {
        &self.sorters
    }

    pub fn groupers(&self) -> &[Grouper] {
        &self.groupers
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn group_limit(&self) -> Option<usize> {
        self.group_limit
    }

    pub fn layout(&self) -> &LayoutOptions {
        &self.layout
    }

    pub fn ignores_global_query(&self) -> bool {
        self.ignore_global_query
    }

    /// The first problem found while parsing, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    // ========================================================================
    // Explain
    // ========================================================================

    /// Human-readable description of what the query will do.
    pub fn explain(&self, settings: &Settings) -> String {
        let mut out = String::from("Explanation of this query:\n\n");

        if !settings.global_filter.is_empty() {
            out.push_str(&format!(
                "Only tasks containing the global filter '{}'.\n\n",
                settings.global_filter.value()
            ));
        }

        if self.filters.is_empty() {
            out.push_str("No filters supplied. All tasks will match the query.");
        } else {
            let explained: Vec<String> = self
                .filters
                .iter()
                .map(|f| f.explain_indented(""))
                .collect();
            out.push_str(&explained.join("\n"));
        }

        if let Some(limit) = self.limit {
            let plural = if limit == 1 { "" } else { "s" };
            out.push_str(&format!("\n\nAt most {limit} task{plural}.\n"));
        }
        if let Some(limit) = self.group_limit {
            let plural = if limit == 1 { "" } else { "s" };
            out.push_str(&format!("\n\nAt most {limit} task{plural} per group.\n"));
        }

        out
    }

    // ========================================================================
    // Pipeline
    // ========================================================================

    /// Run the filter → sort → limit → group pipeline.
    ///
    /// A query with a parse error yields an error result. A panic inside a
    /// host-supplied predicate is caught and converted into an error
    /// result too, so one broken query cannot take down a batch render.
    #[must_use]
    pub fn apply_to_tasks(&self, tasks: &[Task], ctx: &QueryContext<'_>) -> QueryResult {
        if let Some(error) = &self.error {
            return QueryResult::from_error(error.clone());
        }

        let search_ctx = SearchContext {
            today: ctx.today,
            all_tasks: tasks,
            settings: ctx.settings,
        };

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let mut matching: Vec<Task> = tasks
                .iter()
                .filter(|task| self.filters.iter().all(|f| f.matches(task, &search_ctx)))
                .cloned()
                .collect();

            let user_sorters: &[Sorter] = if ctx.settings.debug.ignore_sort_instructions {
                &[]
            } else {
                &self.sorters
            };
            sorter::sort_tasks(&mut matching, user_sorters, &search_ctx);

            if let Some(limit) = self.limit {
                matching.truncate(limit);
            }

            let mut groups = TaskGroups::new(&self.groupers, matching, &search_ctx);
            if let Some(group_limit) = self.group_limit {
                groups.apply_group_limit(group_limit);
            }
            groups
        }));

        match outcome {
            Ok(groups) => QueryResult::from_groups(groups),
            Err(panic) => {
                let message = panic
                    .downcast_ref::<String>()
                    .cloned()
                    .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
                    .unwrap_or_else(|| "unknown error".to_string());
                warn!(error = %message, "query execution failed");
                QueryResult::from_error(format!("Search failed.\nThe error message was:\n    {message}"))
            }
        }
    }
}

// ============================================================================
// Instruction Table
// ============================================================================

struct InstructionDef {
    /// Category name, for documentation generation and debugging.
    category: &'static str,
    /// Whether this category claims the (lowercased) statement.
    recognizes: fn(&str) -> bool,
    /// Apply the statement to the query under construction.
    handle: fn(&mut Query, &Statement, &ParseEnv<'_>, usize) -> Result<(), String>,
}

fn limit_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^limit (?:to )?(\d+)(?: tasks?)?$").expect("limit pattern is valid")
    })
}

fn limit_groups_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^limit groups (?:to )?(\d+)(?: tasks?)?$")
            .expect("limit groups pattern is valid")
    })
}

fn hide_show_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(hide|show) (.+)$").expect("hide/show pattern is valid"))
}

/// The instruction categories, in the documented priority order. The
/// filter category is last and recognizes everything, so lookup always
/// succeeds and unknown lines become "do not understand query" errors
/// there.
fn instruction_table() -> &'static [InstructionDef] {
    static TABLE: OnceLock<Vec<InstructionDef>> = OnceLock::new();
    TABLE.get_or_init(|| {
        vec![
            InstructionDef {
                category: "preset",
                recognizes: |lower| lower == "preset" || lower.starts_with("preset "),
                handle: handle_preset,
            },
            InstructionDef {
                category: "display mode",
                recognizes: |lower| {
                    matches!(lower, "short" | "short mode" | "full" | "full mode")
                },
                handle: |query, statement, _, _| {
                    let lower = statement.text().trim().to_lowercase();
                    query.layout.short_mode = lower.starts_with("short");
                    Ok(())
                },
            },
            InstructionDef {
                category: "explain",
                recognizes: |lower| lower == "explain",
                handle: |query, _, _, _| {
                    query.layout.explain_query = true;
                    Ok(())
                },
            },
            InstructionDef {
                category: "ignore global query",
                recognizes: |lower| lower == "ignore global query",
                handle: |query, _, _, _| {
                    query.ignore_global_query = true;
                    Ok(())
                },
            },
            InstructionDef {
                category: "limit",
                recognizes: |lower| lower == "limit" || lower.starts_with("limit "),
                handle: handle_limit,
            },
            InstructionDef {
                category: "sort by",
                recognizes: |lower| lower.starts_with("sort by"),
                handle: |query, statement, _, _| {
                    match filter::parse_sorter(statement.text()) {
                        Some(sorter) => {
                            query.sorters.push(sorter);
                            Ok(())
                        }
                        None => Err(format!(
                            "do not understand query sorting: {}",
                            statement.raw()
                        )),
                    }
                },
            },
            InstructionDef {
                category: "group by",
                recognizes: |lower| lower.starts_with("group by"),
                handle: |query, statement, _, _| {
                    match filter::parse_grouper(statement.text()) {
                        Some(grouper) => {
                            query.groupers.push(grouper);
                            Ok(())
                        }
                        None => Err(format!(
                            "do not understand query grouping: {}",
                            statement.raw()
                        )),
                    }
                },
            },
            InstructionDef {
                category: "hide/show",
                recognizes: |lower| lower.starts_with("hide ") || lower.starts_with("show "),
                handle: |query, statement, _, _| {
                    let lower = statement.text().trim().to_lowercase();
                    let caps = hide_show_regex()
                        .captures(&lower)
                        .expect("recognizer checked the prefix");
                    let hide = &caps[1] == "hide";
                    if query.layout.apply_option(hide, caps[2].trim()) {
                        Ok(())
                    } else {
                        Err(format!(
                            "do not understand hide/show option: {}",
                            caps[2].trim()
                        ))
                    }
                },
            },
            InstructionDef {
                category: "comment",
                recognizes: |lower| lower.starts_with('#'),
                handle: |_, _, _, _| Ok(()),
            },
            InstructionDef {
                category: "filter",
                recognizes: |_| true,
                handle: |query, statement, _, _| match filter::parse_filter(statement.text()) {
                    Some(Ok(compiled)) => {
                        query.filters.push(compiled);
                        Ok(())
                    }
                    Some(Err(message)) => Err(format!(
                        "{message}\nProblem line: \"{}\"",
                        statement.raw()
                    )),
                    None => Err(format!("do not understand query: {}", statement.raw())),
                },
            },
        ]
    })
}

/// The instruction category names in match priority order. Exposed so
/// documentation can be generated from the real dispatch table.
pub fn instruction_categories() -> Vec<&'static str> {
    instruction_table().iter().map(|def| def.category).collect()
}

fn handle_limit(
    query: &mut Query,
    statement: &Statement,
    _env: &ParseEnv<'_>,
    _depth: usize,
) -> Result<(), String> {
    let lower = statement.text().trim().to_lowercase();
    if let Some(caps) = limit_groups_regex().captures(&lower) {
        query.group_limit = caps[1].parse().ok();
        return Ok(());
    }
    if let Some(caps) = limit_regex().captures(&lower) {
        query.limit = caps[1].parse().ok();
        return Ok(());
    }
    Err(format!("do not understand query limit: {}", statement.raw()))
}

fn handle_preset(
    query: &mut Query,
    statement: &Statement,
    env: &ParseEnv<'_>,
    depth: usize,
) -> Result<(), String> {
    if depth >= PRESET_NESTING_LIMIT {
        return Err(format!(
            "presets nested too deeply (limit {PRESET_NESTING_LIMIT})\nProblem line: \"{}\"",
            statement.raw()
        ));
    }

    let name = statement.text().trim()["preset".len()..].trim().to_string();
    if name.is_empty() {
        return Err("preset name missing".to_string());
    }

    let Some(preset_source) = env.settings.presets.get(&name) else {
        let mut available: Vec<&str> = env.settings.presets.keys().map(String::as_str).collect();
        available.sort_unstable();
        return Err(format!(
            "cannot find preset \"{name}\" in the settings; available presets: [{}]",
            available.join(", ")
        ));
    };

    for line in scanner::scan(preset_source) {
        if query.error.is_some() {
            break;
        }
        query.process_statement(&line, env, depth + 1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TaskBuilder;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn parse(source: &str) -> Query {
        let settings = Settings::default();
        Query::parse(source, &QueryFile::new("query.md"), &settings)
    }

    fn run(query: &Query, tasks: &[Task]) -> QueryResult {
        let settings = Settings::default();
        query.apply_to_tasks(tasks, &QueryContext::new(date(2024, 1, 10), &settings))
    }

    #[test]
    fn test_instruction_categories_order() {
        let categories = instruction_categories();
        assert_eq!(categories.first(), Some(&"preset"));
        // The catch-all filter category must stay last.
        assert_eq!(categories.last(), Some(&"filter"));
    }

    #[test]
    fn test_parse_collects_instruction_kinds() {
        let query = parse(
            "not done\nsort by due\ngroup by status\nlimit 5\nlimit groups 2\nshort mode\nexplain\nhide priority\n# a comment",
        );
        assert!(query.error().is_none());
        assert_eq!(query.filters().len(), 1);
        assert_eq!(query.sorters().len(), 1);
        assert_eq!(query.groupers().len(), 1);
        assert_eq!(query.limit(), Some(5));
        assert_eq!(query.group_limit(), Some(2));
        assert!(query.layout().short_mode);
        assert!(query.layout().explain_query);
        assert!(query.layout().hide_priority);
    }

    #[test]
    fn test_unknown_line_sets_error_and_keeps_earlier_instructions() {
        let query = parse("not done\nglorb by whatever\nlimit 3");
        let error = query.error().unwrap();
        assert!(error.contains("do not understand query"));
        assert!(error.contains("glorb by whatever"));
        // The filter before the error survives; the limit after it was
        // never parsed.
        assert_eq!(query.filters().len(), 1);
        assert_eq!(query.limit(), None);
    }

    #[test]
    fn test_error_query_yields_error_result() {
        let query = parse("glorb by whatever");
        let result = run(&query, &[]);
        assert!(result
            .search_error_message()
            .unwrap()
            .contains("do not understand query"));
    }

    #[test]
    fn test_filter_and_sort_scenario() {
        // Three tasks, filter by due date, sort by due.
        let tasks = vec![
            TaskBuilder::new("a").due(date(2024, 1, 10)).build(),
            TaskBuilder::new("b").due(date(2024, 1, 20)).build(),
            TaskBuilder::new("c").due(date(2024, 1, 1)).build(),
        ];
        let query = parse("due before 2024-01-15\nsort by due");
        let result = run(&query, &tasks);
        assert!(result.search_error_message().is_none());

        let groups = result.groups();
        assert_eq!(groups.groups().len(), 1);
        let names: Vec<&str> = groups.groups()[0]
            .tasks()
            .iter()
            .map(|t| t.description())
            .collect();
        assert_eq!(names, vec!["c", "a"]);
    }

    #[test]
    fn test_group_by_status_scenario() {
        let tasks = vec![
            TaskBuilder::new("t1").build(),
            TaskBuilder::new("t2").build(),
            TaskBuilder::new("d1").status_symbol('x').build(),
        ];
        let query = parse("group by status");
        let result = run(&query, &tasks);
        let groups = result.groups();
        assert_eq!(groups.groups().len(), 2);
        assert_eq!(groups.groups()[0].group_key(), &["Done"]);
        assert_eq!(groups.groups()[0].tasks().len(), 1);
        assert_eq!(groups.groups()[1].group_key(), &["Todo"]);
        assert_eq!(groups.groups()[1].tasks().len(), 2);
    }

    #[test]
    fn test_limit_applies_after_sorting_before_grouping() {
        let tasks = vec![
            TaskBuilder::new("late").due(date(2024, 3, 1)).build(),
            TaskBuilder::new("early").due(date(2024, 1, 1)).build(),
            TaskBuilder::new("middle").due(date(2024, 2, 1)).build(),
        ];
        let query = parse("sort by due\nlimit 2");
        let result = run(&query, &tasks);
        let tasks = result.groups().groups()[0].tasks();
        let names: Vec<&str> = tasks.iter().map(|t| t.description()).collect();
        assert_eq!(names, vec!["early", "middle"]);
    }

    #[test]
    fn test_limit_groups_caps_each_group() {
        let tasks = vec![
            TaskBuilder::new("t1").build(),
            TaskBuilder::new("t2").build(),
            TaskBuilder::new("t3").build(),
            TaskBuilder::new("d1").status_symbol('x').build(),
        ];
        let query = parse("group by status\nlimit groups 1");
        let result = run(&query, &tasks);
        for group in result.groups().groups() {
            assert_eq!(group.tasks().len(), 1);
        }
    }

    #[test]
    fn test_line_continuation_in_query() {
        let query = parse("(not done) \\\nAND (description includes milk)");
        assert!(query.error().is_none());
        assert_eq!(query.filters().len(), 1);
    }

    #[test]
    fn test_placeholder_expansion_in_query() {
        let settings = Settings::default();
        let file = QueryFile::new("work/projects/roadmap.md");
        let query = Query::parse("path includes {{query.file.folder}}", &file, &settings);
        assert!(query.error().is_none());

        let inside = TaskBuilder::new("in").path("work/projects/notes.md").build();
        let outside = TaskBuilder::new("out").path("personal/notes.md").build();
        let result = query.apply_to_tasks(
            &[inside, outside],
            &QueryContext::new(date(2024, 1, 10), &settings),
        );
        assert_eq!(result.task_count(), 1);
    }

    #[test]
    fn test_unknown_placeholder_sets_error() {
        let query = parse("path includes {{query.file.nonsense}}");
        assert!(query.error().unwrap().contains("query.file.nonsense"));
    }

    #[test]
    fn test_global_query_prepending() {
        let mut settings = Settings::default();
        settings.global_query = "not done".to_string();
        let file = QueryFile::new("query.md");

        let query = Query::parse_with_global_query("due before 2024-02-01", &file, &settings);
        assert_eq!(query.filters().len(), 2);

        // Later limit overwrites an earlier one.
        settings.global_query = "limit 10".to_string();
        let query = Query::parse_with_global_query("limit 2", &file, &settings);
        assert_eq!(query.limit(), Some(2));

        // Opt-out.
        settings.global_query = "not done".to_string();
        let query =
            Query::parse_with_global_query("ignore global query\ndone", &file, &settings);
        assert_eq!(query.filters().len(), 1);
    }

    #[test]
    fn test_preset_expansion() {
        let mut settings = Settings::default();
        settings
            .presets
            .insert("open".to_string(), "not done\nsort by due".to_string());
        let file = QueryFile::new("query.md");

        let query = Query::parse("preset open\nlimit 5", &file, &settings);
        assert!(query.error().is_none());
        assert_eq!(query.filters().len(), 1);
        assert_eq!(query.sorters().len(), 1);
        assert_eq!(query.limit(), Some(5));
    }

    #[test]
    fn test_unknown_preset_is_an_error() {
        let mut settings = Settings::default();
        settings.presets.insert("open".to_string(), "not done".to_string());
        let query = Query::parse("preset closed", &QueryFile::new("q.md"), &settings);
        let error = query.error().unwrap();
        assert!(error.contains("closed"));
        assert!(error.contains("open"));
    }

    #[test]
    fn test_self_referencing_preset_hits_nesting_limit() {
        let mut settings = Settings::default();
        settings
            .presets
            .insert("loop".to_string(), "preset loop".to_string());
        let query = Query::parse("preset loop", &QueryFile::new("q.md"), &settings);
        assert!(query.error().unwrap().contains("nested too deeply"));
    }

    #[test]
    fn test_explain_output() {
        let mut settings = Settings::default();
        settings.global_filter = crate::settings::GlobalFilter::new("#task");
        let query = parse("due before 2024-02-01\nlimit 1");
        let explanation = query.explain(&settings);
        assert!(explanation.contains("global filter '#task'"));
        assert!(explanation.contains("due before 2024-02-01"));
        assert!(explanation.contains("At most 1 task."));
    }

    #[test]
    fn test_explain_without_filters() {
        let query = parse("");
        let explanation = query.explain(&Settings::default());
        assert!(explanation.contains("No filters supplied"));
    }

    #[test]
    fn test_panicking_custom_filter_becomes_error_result() {
        let mut query = parse("");
        query.add_filter(Filter::from_fn("explode", |_, _| panic!("boom")));
        let result = run(&query, &[TaskBuilder::new("t").build()]);
        let message = result.search_error_message().unwrap();
        assert!(message.contains("Search failed"));
        assert!(message.contains("boom"));
    }

    #[test]
    fn test_ignore_sort_instructions_debug_setting() {
        let mut settings = Settings::default();
        settings.debug.ignore_sort_instructions = true;
        let tasks = vec![
            TaskBuilder::new("b").path("b.md").build(),
            TaskBuilder::new("a").path("a.md").build(),
        ];
        // The reverse sort would put b first; the debug setting ignores it
        // and the default path ordering applies.
        let query = parse("sort by path reverse");
        let result =
            query.apply_to_tasks(&tasks, &QueryContext::new(date(2024, 1, 10), &settings));
        let names: Vec<&str> = result.groups().groups()[0]
            .tasks()
            .iter()
            .map(|t| t.description())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_filter_purity_repeated_application() {
        let tasks = vec![
            TaskBuilder::new("keep one").due(date(2024, 1, 5)).build(),
            TaskBuilder::new("drop").due(date(2024, 3, 1)).build(),
            TaskBuilder::new("keep two").due(date(2024, 1, 8)).build(),
        ];
        let query = parse("due before 2024-02-01");
        let first = run(&query, &tasks);
        let second = run(&query, &tasks);
        assert_eq!(first.task_count(), second.task_count());

        let mut reversed = tasks.clone();
        reversed.reverse();
        let third = run(&query, &reversed);
        assert_eq!(first.task_count(), third.task_count());
    }
}
