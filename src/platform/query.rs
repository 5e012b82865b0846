//! Filter/sort/pagination parameters for list endpoints.

/// Parameters for a list/query call.
///
/// Rendered as `filter[<name>]=<value>`, `sort=<fields>`, `page[number]`,
/// `page[size]` and `include`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
  pub filters: Vec<(String, String)>,
  /// Comma-separated fields, `-` prefix for descending
  pub sort: Option<String>,
  pub page: Option<u32>,
  pub per_page: Option<u32>,
  pub include: Option<String>,
}

impl ListQuery {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.filters.push((name.into(), value.into()));
    self
  }

  pub fn sort(mut self, sort: impl Into<String>) -> Self {
    self.sort = Some(sort.into());
    self
  }

  pub fn page(mut self, page: u32) -> Self {
    self.page = Some(page);
    self
  }

  pub fn per_page(mut self, per_page: u32) -> Self {
    self.per_page = Some(per_page);
    self
  }

  pub fn include(mut self, include: impl Into<String>) -> Self {
    self.include = Some(include.into());
    self
  }

  pub fn to_params(&self) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = self
      .filters
      .iter()
      .map(|(name, value)| (format!("filter[{}]", name), value.clone()))
      .collect();

    if let Some(sort) = &self.sort {
      params.push(("sort".to_string(), sort.clone()));
    }
    if let Some(page) = self.page {
      params.push(("page[number]".to_string(), page.to_string()));
    }
    if let Some(per_page) = self.per_page {
      params.push(("page[size]".to_string(), per_page.to_string()));
    }
    if let Some(include) = &self.include {
      params.push(("include".to_string(), include.clone()));
    }

    params
  }
}
