use crate::languages::LanguageCatalog;

/// Search-as-you-type state for a single language dropdown.
#[derive(Debug, Clone)]
pub struct LanguagePicker<'a> {
    catalog: &'a LanguageCatalog,
    value: String,
    query: String,
    open: bool,
}

impl<'a> LanguagePicker<'a> {
    pub fn new(catalog: &'a LanguageCatalog, value: impl Into<String>) -> Self {
        Self {
            catalog,
            value: value.into(),
            query: String::new(),
            open: false,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Close without choosing. The typed query is kept for the next open.
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Typing into the search box opens the list.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.open = true;
    }

    /// Catalog entries matching the current query.
    pub fn options(&self) -> Vec<&'a str> {
        self.catalog.filter(&self.query)
    }

    /// Choose `language`: sets the value, clears the query and closes the list.
    pub fn select(&mut self, language: impl Into<String>) {
        self.value = language.into();
        self.query.clear();
        self.open = false;
    }

    /// What the search box shows: the query while open, the chosen value otherwise.
    pub fn display_text(&self) -> &str {
        if self.open {
            &self.query
        } else {
            &self.value
        }
    }
}
