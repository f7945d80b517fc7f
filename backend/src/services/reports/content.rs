//! What goes into a compliance report, independent of how it is drawn.
//!
//! The report is a flat list of [`ReportBlock`]s: a title, then one section per
//! employee with their completion and the state of every document type, then any
//! legacy documents and load warnings. `pdf.rs` turns the blocks into pages.

use crate::reconcile::LEGACY_TYPE_NAME;
use crate::services::matrix::export::cell_text;
use chrono::NaiveDate;
use common::model::matrix::{MatrixRow, MatrixView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TextStyle {
    Regular,
    Bold,
    Italic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TextSegment {
    pub text: String,
    pub style: TextStyle,
}

impl TextSegment {
    fn regular(text: impl Into<String>) -> Self {
        TextSegment {
            text: text.into(),
            style: TextStyle::Regular,
        }
    }

    fn bold(text: impl Into<String>) -> Self {
        TextSegment {
            text: text.into(),
            style: TextStyle::Bold,
        }
    }

    fn italic(text: impl Into<String>) -> Self {
        TextSegment {
            text: text.into(),
            style: TextStyle::Italic,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ReportBlock {
    Title(String),
    Heading(String),
    Line(Vec<TextSegment>),
    ListItem(Vec<TextSegment>),
    Break,
}

/// Report for every row of `view`, or only for `employee_id` when given.
pub(crate) fn report_blocks(
    view: &MatrixView,
    employee_id: Option<&str>,
    generated_on: NaiveDate,
) -> Vec<ReportBlock> {
    let rows: Vec<&MatrixRow> = view
        .rows
        .iter()
        .filter(|row| employee_id.is_none_or(|id| row.employee_id == id))
        .collect();

    let mut blocks = vec![
        ReportBlock::Title("Document compliance report".to_string()),
        ReportBlock::Line(vec![
            TextSegment::regular("Generated on "),
            TextSegment::bold(generated_on.format("%Y-%m-%d").to_string()),
            TextSegment::regular(format!(" for {} employee(s).", rows.len())),
        ]),
    ];

    for row in &rows {
        blocks.push(ReportBlock::Break);
        push_employee_section(&mut blocks, view, row);
    }

    let legacy: Vec<_> = view
        .legacy
        .iter()
        .filter(|entry| rows.iter().any(|row| row.employee_id == entry.employee_id))
        .collect();
    if !legacy.is_empty() {
        blocks.push(ReportBlock::Break);
        blocks.push(ReportBlock::Heading(LEGACY_TYPE_NAME.to_string()));
        for entry in legacy {
            blocks.push(ReportBlock::ListItem(vec![
                TextSegment::bold(format!("Document {}", entry.document_id)),
                TextSegment::regular(format!(
                    ": {} file(s), unknown type {}",
                    entry.files, entry.document_type_id
                )),
            ]));
        }
    }

    if !view.warnings.is_empty() {
        blocks.push(ReportBlock::Break);
        for warning in &view.warnings {
            blocks.push(ReportBlock::Line(vec![TextSegment::italic(warning.clone())]));
        }
    }
    blocks
}

fn push_employee_section(blocks: &mut Vec<ReportBlock>, view: &MatrixView, row: &MatrixRow) {
    blocks.push(ReportBlock::Heading(row.full_name.clone()));

    let mut details = vec![TextSegment::regular(row.email.clone())];
    if let Some(role) = &row.job_role {
        details.push(TextSegment::regular(format!(" · {}", role)));
    }
    blocks.push(ReportBlock::Line(details));
    blocks.push(ReportBlock::Line(vec![
        TextSegment::bold("Completion: "),
        TextSegment::regular(format!("{}%", row.completion)),
    ]));

    for (column, cell) in view.types.iter().zip(&row.cells) {
        let mut item = vec![
            TextSegment::bold(column.name.clone()),
            TextSegment::regular(format!(": {}", cell_text(cell))),
        ];
        if column.is_required && cell.document_id.is_none() {
            item.push(TextSegment::italic(" (required, missing)"));
        }
        blocks.push(ReportBlock::ListItem(item));
    }
}
