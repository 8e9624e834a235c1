//! Library catalog tools: book search, member-only availability, and
//! opening hours.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::context::SessionContext;
use crate::error::ToolError;
use crate::tool::{Tool, ToolDefinition};

/// An in-memory catalog mapping book titles to copies on hand.
#[derive(Debug, Clone, Default)]
pub struct BookCatalog {
    books: BTreeMap<String, u32>,
}

impl BookCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog seeded with the demo library's stock.
    #[must_use]
    pub fn demo_library() -> Self {
        let mut catalog = Self::new();
        catalog.add_book("The Great Technology", 3);
        catalog.add_book("The 80's Technologies", 0);
        catalog.add_book("Enter the Agentic Ai World", 5);
        catalog
    }

    /// Add a title with the given number of copies.
    pub fn add_book(&mut self, title: impl Into<String>, copies: u32) {
        self.books.insert(title.into(), copies);
    }

    /// Case-insensitive lookup of a title, returning its canonical name
    /// and copies on hand.
    #[must_use]
    pub fn find(&self, title: &str) -> Option<(&str, u32)> {
        let wanted = title.trim().to_lowercase();
        self.books
            .iter()
            .find(|(name, _)| name.to_lowercase() == wanted)
            .map(|(name, copies)| (name.as_str(), *copies))
    }
}

#[derive(Debug, Clone, Deserialize)]
struct TitleArgs {
    title: String,
}

fn title_parameters() -> Value {
    json!({
        "type": "object",
        "properties": {
            "title": {
                "type": "string",
                "description": "Title of the book"
            }
        },
        "required": ["title"]
    })
}

/// Tool answering whether the library carries a title. Open to everyone.
#[derive(Debug, Clone)]
pub struct SearchBook {
    catalog: Arc<BookCatalog>,
}

impl SearchBook {
    /// Create a search tool over the given catalog.
    #[must_use]
    pub fn new(catalog: Arc<BookCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Tool for SearchBook {
    fn name(&self) -> &str {
        "search_book"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("search_book", "Check whether the library carries a book.")
            .with_parameters(title_parameters())
    }

    async fn call(&self, _context: &SessionContext, args: Value) -> Result<String, ToolError> {
        let args: TitleArgs = serde_json::from_value(args)?;
        match self.catalog.find(&args.title) {
            Some((name, _)) => Ok(format!("Yes, '{name}' is in our catalog.")),
            None => Ok(format!("No, '{}' is not in our catalog.", args.title.trim())),
        }
    }
}

/// Tool reporting copies available for borrowing. Members only.
#[derive(Debug, Clone)]
pub struct CheckAvailability {
    catalog: Arc<BookCatalog>,
}

impl CheckAvailability {
    /// Create an availability tool over the given catalog.
    #[must_use]
    pub fn new(catalog: Arc<BookCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Tool for CheckAvailability {
    fn name(&self) -> &str {
        "check_availability"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            "check_availability",
            "Check how many copies of a book are available to borrow. Requires library membership.",
        )
        .with_parameters(title_parameters())
    }

    fn enabled(&self, context: &SessionContext) -> bool {
        context.has_member_id()
    }

    async fn call(&self, _context: &SessionContext, args: Value) -> Result<String, ToolError> {
        let args: TitleArgs = serde_json::from_value(args)?;
        match self.catalog.find(&args.title) {
            Some((name, 0)) => Ok(format!(
                "'{name}' is in our catalog but no copies are available right now."
            )),
            Some((name, copies)) => Ok(format!("{copies} copies of '{name}' are available.")),
            None => Ok(format!("No, '{}' is not in our catalog.", args.title.trim())),
        }
    }
}

/// Tool reporting the library's opening hours. Takes no arguments.
#[derive(Debug, Clone, Default)]
pub struct LibraryTimings;

impl LibraryTimings {
    /// Create the timings tool.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for LibraryTimings {
    fn name(&self) -> &str {
        "library_timings"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("library_timings", "Opening hours of the library.")
    }

    async fn call(&self, _context: &SessionContext, _args: Value) -> Result<String, ToolError> {
        Ok("The library is open from 9 AM to 8 PM, Monday to Saturday.".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Arc<BookCatalog> {
        Arc::new(BookCatalog::demo_library())
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let catalog = BookCatalog::demo_library();
        let (name, copies) = catalog.find("the great technology").unwrap();
        assert_eq!(name, "The Great Technology");
        assert_eq!(copies, 3);
        assert!(catalog.find("unknown title").is_none());
    }

    #[tokio::test]
    async fn test_search_book_reports_catalog_membership() {
        let tool = SearchBook::new(catalog());
        let ctx = SessionContext::new("guest");

        let found = tool
            .call(&ctx, json!({"title": "Enter the Agentic Ai World"}))
            .await
            .unwrap();
        assert!(found.starts_with("Yes"));

        let missing = tool.call(&ctx, json!({"title": "Moby Dick"})).await.unwrap();
        assert!(missing.starts_with("No"));
    }

    #[test]
    fn test_availability_requires_membership() {
        let tool = CheckAvailability::new(catalog());
        assert!(!tool.enabled(&SessionContext::new("guest")));
        assert!(tool.enabled(&SessionContext::new("pat").with_member_id("M-7")));
    }

    #[tokio::test]
    async fn test_availability_distinguishes_out_of_stock() {
        let tool = CheckAvailability::new(catalog());
        let ctx = SessionContext::new("pat").with_member_id("M-7");

        let in_stock = tool
            .call(&ctx, json!({"title": "The Great Technology"}))
            .await
            .unwrap();
        assert!(in_stock.contains("3 copies"));

        let out_of_stock = tool
            .call(&ctx, json!({"title": "The 80's Technologies"}))
            .await
            .unwrap();
        assert!(out_of_stock.contains("no copies"));
    }

    #[tokio::test]
    async fn test_timings_is_static() {
        let tool = LibraryTimings::new();
        let ctx = SessionContext::new("guest");
        let out = tool.call(&ctx, json!({})).await.unwrap();
        assert!(out.contains("9 AM to 8 PM"));
    }
}
