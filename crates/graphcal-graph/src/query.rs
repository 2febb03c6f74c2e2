//! OData query builders for Graph collection requests.

use graphcal_core::TimeWindow;

/// Extended property ID of `PidLidGlobalObjectId` (MS-OXPROPS 2.4):
/// binary property 0x0003 in the meeting property set.
pub const GLOBAL_OBJECT_ID_PROPERTY: &str =
    "Binary {6ED8DA90-450B-101B-98DA-00AA003F1305} Id 0x0003";

/// Properties selected when listing users.
pub const DEFAULT_USER_SELECT: &[&str] = &[
    "id",
    "displayName",
    "mail",
    "jobTitle",
    "department",
    "officeLocation",
];

/// Quotes a string literal for use in an OData `$filter`.
///
/// Single quotes are escaped by doubling them.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// A conjunction of `eq` comparisons and raw expressions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    clauses: Vec<Clause>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Clause {
    /// `property eq 'literal'`, safe to join without grouping.
    Eq(String),
    /// Caller-supplied expression of unknown precedence.
    Raw(String),
}

impl Clause {
    /// Renders the clause as an operand of `and`.
    fn grouped(&self) -> String {
        match self {
            Self::Eq(expr) => expr.clone(),
            Self::Raw(expr) if is_grouped(expr) => expr.clone(),
            Self::Raw(expr) => format!("({})", expr),
        }
    }
}

impl std::fmt::Display for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eq(expr) | Self::Raw(expr) => f.write_str(expr),
        }
    }
}

/// Returns true if the outer parentheses of `expr` enclose all of it.
/// Parentheses inside string literals are ignored.
fn is_grouped(expr: &str) -> bool {
    let expr = expr.trim();
    if !expr.starts_with('(') || !expr.ends_with(')') {
        return false;
    }
    let mut depth = 0usize;
    let mut in_literal = false;
    for (i, ch) in expr.char_indices() {
        match ch {
            '\'' => in_literal = !in_literal,
            '(' if !in_literal => depth += 1,
            ')' if !in_literal => {
                depth = depth.saturating_sub(1);
                if depth == 0 && i + 1 < expr.len() {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `property eq 'value'`.
    pub fn eq(mut self, property: &str, value: &str) -> Self {
        self.clauses
            .push(Clause::Eq(format!("{} eq {}", property, quote_literal(value))));
        self
    }

    /// Adds a raw OData expression. It is parenthesised when combined with
    /// other clauses.
    pub fn raw(mut self, expression: impl Into<String>) -> Self {
        self.clauses.push(Clause::Raw(expression.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Renders the filter, or `None` if it has no clauses.
    pub fn build(&self) -> Option<String> {
        match self.clauses.len() {
            0 => None,
            1 => Some(self.clauses[0].to_string()),
            _ => Some(
                self.clauses
                    .iter()
                    .map(Clause::grouped)
                    .collect::<Vec<_>>()
                    .join(" and "),
            ),
        }
    }
}

/// Options for listing users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuery {
    /// Properties to `$select`.
    pub select: Vec<String>,
    /// Optional `$filter`.
    pub filter: Filter,
    /// Page size hint (`$top`).
    pub top: Option<usize>,
    /// Maximum number of users to return across pages.
    pub max_results: Option<usize>,
}

impl Default for UserQuery {
    fn default() -> Self {
        Self {
            select: DEFAULT_USER_SELECT.iter().map(|s| s.to_string()).collect(),
            filter: Filter::new(),
            top: None,
            max_results: None,
        }
    }
}

impl UserQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the filter.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Sets the maximum number of users returned.
    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = Some(max);
        self
    }

    /// Sets the page size.
    pub fn with_top(mut self, top: usize) -> Self {
        self.top = Some(top);
        self
    }

    /// Returns the query parameters for the first page.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if !self.select.is_empty() {
            params.push(("$select", self.select.join(",")));
        }
        if let Some(filter) = self.filter.build() {
            params.push(("$filter", filter));
        }
        if let Some(top) = self.top {
            params.push(("$top", top.to_string()));
        }
        params
    }
}

/// Options for a calendar-view request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarViewQuery {
    /// Time range of the view.
    pub window: TimeWindow,
    /// Extended properties to expand into each event.
    pub extended_properties: Vec<String>,
    /// Maximum number of events returned across pages.
    pub max_results: Option<usize>,
}

impl CalendarViewQuery {
    /// Creates a query that also expands the `GlobalObjectId` property.
    pub fn new(window: TimeWindow) -> Self {
        Self {
            window,
            extended_properties: vec![GLOBAL_OBJECT_ID_PROPERTY.to_string()],
            max_results: None,
        }
    }

    /// Replaces the expanded extended properties.
    pub fn with_extended_properties(mut self, ids: Vec<String>) -> Self {
        self.extended_properties = ids;
        self
    }

    /// Sets the maximum number of events returned.
    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = Some(max);
        self
    }

    /// Returns the `$expand` expression, if any properties are requested.
    pub fn expand(&self) -> Option<String> {
        if self.extended_properties.is_empty() {
            return None;
        }
        let filter = self
            .extended_properties
            .iter()
            .map(|id| format!("id eq {}", quote_literal(id)))
            .collect::<Vec<_>>()
            .join(" or ");
        Some(format!("singleValueExtendedProperties($filter={})", filter))
    }

    /// Returns the query parameters for the first page.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params: Vec<(&'static str, String)> = self.window.query_params().into();
        if let Some(expand) = self.expand() {
            params.push(("$expand", expand));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_literal_escapes_quotes() {
        assert_eq!(quote_literal("Sales"), "'Sales'");
        assert_eq!(quote_literal("O'Brien"), "'O''Brien'");
    }

    #[test]
    fn filter_joins_with_and() {
        let filter = Filter::new()
            .eq("department", "Test Department")
            .eq("jobTitle", "Test Title");
        assert_eq!(
            filter.build().unwrap(),
            "department eq 'Test Department' and jobTitle eq 'Test Title'"
        );
    }

    #[test]
    fn filter_wraps_raw_disjunctions() {
        let filter = Filter::new()
            .eq("department", "Retail")
            .raw("jobTitle eq 'A' or jobTitle eq 'B'");
        assert_eq!(
            filter.build().unwrap(),
            "department eq 'Retail' and (jobTitle eq 'A' or jobTitle eq 'B')"
        );
    }

    #[test]
    fn raw_disjunction_of_groups_is_wrapped() {
        let filter = Filter::new()
            .raw("(department eq 'A') or (department eq 'B')")
            .eq("jobTitle", "Manager");
        assert_eq!(
            filter.build().unwrap(),
            "((department eq 'A') or (department eq 'B')) and jobTitle eq 'Manager'"
        );
    }

    #[test]
    fn fully_grouped_raw_clause_is_not_rewrapped() {
        let filter = Filter::new()
            .raw("(department eq 'A' or department eq 'B')")
            .eq("jobTitle", "Manager");
        assert_eq!(
            filter.build().unwrap(),
            "(department eq 'A' or department eq 'B') and jobTitle eq 'Manager'"
        );
    }

    #[test]
    fn eq_literal_containing_or_is_not_wrapped() {
        let filter = Filter::new()
            .eq("department", "Sales or Marketing")
            .eq("jobTitle", "Lead");
        assert_eq!(
            filter.build().unwrap(),
            "department eq 'Sales or Marketing' and jobTitle eq 'Lead'"
        );
    }

    #[test]
    fn grouping_ignores_parentheses_in_literals() {
        assert!(is_grouped("(displayName eq 'A)')"));
        assert!(!is_grouped("(a eq 'x') or (b eq 'y')"));
        assert!(!is_grouped("startswith(displayName,'A')"));
    }

    #[test]
    fn single_raw_filter_is_unchanged() {
        let filter = Filter::new().raw("startswith(displayName,'A')");
        assert_eq!(filter.build().unwrap(), "startswith(displayName,'A')");
    }

    #[test]
    fn empty_filter_builds_none() {
        assert!(Filter::new().build().is_none());
        assert!(Filter::new().is_empty());
    }

    #[test]
    fn user_query_params() {
        let query = UserQuery::new()
            .with_filter(Filter::new().eq("department", "Retail"))
            .with_top(50);
        let params = query.params();
        assert_eq!(
            params[0],
            (
                "$select",
                "id,displayName,mail,jobTitle,department,officeLocation".to_string()
            )
        );
        assert_eq!(params[1], ("$filter", "department eq 'Retail'".to_string()));
        assert_eq!(params[2], ("$top", "50".to_string()));
    }

    #[test]
    fn user_query_without_filter() {
        let params = UserQuery::new().params();
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn calendar_view_expand() {
        let window = TimeWindow::parse("2021-07-01T00:00:00Z", "2021-08-01T00:00:00Z").unwrap();
        let query = CalendarViewQuery::new(window);
        assert_eq!(
            query.expand().unwrap(),
            "singleValueExtendedProperties($filter=id eq 'Binary {6ED8DA90-450B-101B-98DA-00AA003F1305} Id 0x0003')"
        );

        let params = query.params();
        assert_eq!(params[0].0, "startDateTime");
        assert_eq!(params[1].0, "endDateTime");
        assert_eq!(params[2].0, "$expand");
    }

    #[test]
    fn calendar_view_without_extended_properties() {
        let window = TimeWindow::parse("2021-07-01T00:00:00Z", "2021-08-01T00:00:00Z").unwrap();
        let query = CalendarViewQuery::new(window).with_extended_properties(vec![]);
        assert!(query.expand().is_none());
        assert_eq!(query.params().len(), 2);
    }
}
