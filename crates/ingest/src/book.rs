use crate::prompt::PromptTemplate;
use readchat_core::error::IngestError;
use serde::{Deserialize, Serialize};

/// Column positions read from each data row.
const TITLE_COLUMN: usize = 0;
const AUTHOR_COLUMN: usize = 2;
const PUBLISHER_COLUMN: usize = 4;
const COMPLETED_COLUMN: usize = 6;

/// One finished book from the uploaded reading history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub completed_date: String,
}

impl BookRecord {
    /// Build a record from a raw CSV row. `row` is the 1-based data row
    /// number used in errors.
    pub fn from_row(row: usize, fields: &csv::StringRecord) -> Result<Self, IngestError> {
        if fields.len() <= COMPLETED_COLUMN {
            return Err(IngestError::ShortRow {
                row,
                columns: fields.len(),
            });
        }
        let column = |i: usize| fields.get(i).unwrap_or_default().to_string();
        Ok(Self {
            title: column(TITLE_COLUMN),
            author: column(AUTHOR_COLUMN),
            publisher: column(PUBLISHER_COLUMN),
            completed_date: column(COMPLETED_COLUMN),
        })
    }
}

/// The records of one upload together with the template used to ask about
/// them.
#[derive(Debug, Clone)]
pub struct BookShelf {
    records: Vec<BookRecord>,
    template: PromptTemplate,
}

impl BookShelf {
    pub fn new(records: Vec<BookRecord>, template: PromptTemplate) -> Self {
        Self { records, template }
    }

    pub fn records(&self) -> &[BookRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The model prompt for `question` over this shelf.
    pub fn prompt_for(&self, question: &str) -> String {
        self.template.render(question, &self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_row_requires_seven_columns() {
        let row = csv::StringRecord::from(vec!["a", "b", "c", "d", "e", "f"]);
        let err = BookRecord::from_row(4, &row).unwrap_err();
        assert_eq!(err, IngestError::ShortRow { row: 4, columns: 6 });
    }

    #[test]
    fn shelf_prompt_contains_question_and_titles() {
        let shelf = BookShelf::new(
            vec![BookRecord {
                title: "Solaris".into(),
                author: "Lem".into(),
                publisher: "Walker".into(),
                completed_date: "2024-03-01".into(),
            }],
            PromptTemplate::default(),
        );
        let prompt = shelf.prompt_for("Which sci-fi did I finish?");
        assert!(prompt.contains("Which sci-fi did I finish?"));
        assert!(prompt.contains("Solaris"));
        assert_eq!(shelf.len(), 1);
    }
}
