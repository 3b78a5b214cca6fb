#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    /// Arrow shown next to the active column header.
    pub fn indicator(self) -> &'static str {
        match self {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

/// Parameters for `GET /api/{collection}/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchParams {
    pub page: u32,
    pub ordering: String,
    pub search: Option<String>,
}

impl FetchParams {
    /// Query pairs in the order the backend documents them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("ordering", self.ordering.clone()),
        ];
        if let Some(term) = &self.search {
            pairs.push(("search", term.clone()));
        }
        pairs
    }
}

/// Page, sort and search selection for one list session.
///
/// Mutated only through explicit user actions; any change to filtering or
/// sorting resets the page to 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    page: u32,
    page_size: u32,
    sort_field: String,
    sort_direction: SortDirection,
    search_term: Option<String>,
}

impl QueryState {
    pub fn new(page_size: u32, sort_field: impl Into<String>) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            sort_field: sort_field.into(),
            sort_direction: SortDirection::Desc,
            search_term: None,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn sort_field(&self) -> &str {
        &self.sort_field
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search_term.as_deref()
    }

    pub(crate) fn set_page(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Same field toggles direction; a new field starts descending. Page resets to 1.
    pub(crate) fn set_sort(&mut self, field: &str) {
        if self.sort_field == field {
            self.sort_direction = self.sort_direction.toggled();
        } else {
            self.sort_field = field.to_string();
            self.sort_direction = SortDirection::Desc;
        }
        self.page = 1;
    }

    /// Blank terms clear the filter. Page resets to 1.
    pub(crate) fn set_search_term(&mut self, term: &str) {
        let trimmed = term.trim();
        self.search_term = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self.page = 1;
    }

    pub fn ordering(&self) -> String {
        match self.sort_direction {
            SortDirection::Desc => format!("-{}", self.sort_field),
            SortDirection::Asc => self.sort_field.clone(),
        }
    }

    pub fn params(&self) -> FetchParams {
        self.params_for_page(self.page)
    }

    pub(crate) fn params_for_page(&self, page: u32) -> FetchParams {
        FetchParams {
            page,
            ordering: self.ordering(),
            search: self.search_term.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_prefixes_minus_for_descending() {
        let mut query = QueryState::new(10, "created_at");
        assert_eq!(query.ordering(), "-created_at");
        query.set_sort("created_at");
        assert_eq!(query.ordering(), "created_at");
    }

    #[test]
    fn search_pair_only_present_when_term_set() {
        let mut query = QueryState::new(10, "title");
        assert_eq!(query.params().query_pairs().len(), 2);

        query.set_search_term("  rust  ");
        let pairs = query.params().query_pairs();
        assert_eq!(pairs[2], ("search", "rust".to_string()));

        query.set_search_term("   ");
        assert_eq!(query.search_term(), None);
    }

    #[test]
    fn zero_page_size_is_raised_to_one() {
        assert_eq!(QueryState::new(0, "id").page_size(), 1);
    }
}
