// src/export.rs
//
// Renders a stored generation as a CSV or PDF download. Explanations are
// deliberately left out of both formats; they only live in the JSON.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use crate::error::AppError;
use crate::models::generation::{StudyItem, StudyMode};
use crate::normalize::MCQ_OPTION_COUNT;

// US Letter, with uniform margins.
const PAGE_WIDTH_MM: f32 = 215.9;
const PAGE_HEIGHT_MM: f32 = 279.4;
const MARGIN_MM: f32 = 18.0;

const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 11.0;
const TITLE_LEADING_MM: f32 = 7.8;
const BODY_LEADING_MM: f32 = 5.3;
const ITEM_GAP_MM: f32 = 3.5;

// Builtin fonts carry no glyph metrics, so wrapping is by character count
// calibrated to Helvetica at the sizes above.
const TITLE_WRAP_CHARS: usize = 65;
const BODY_WRAP_CHARS: usize = 95;

/// Renders items as CSV. MCQ rows are six columns (question, four options,
/// answer); flashcard rows are two.
pub fn csv_bytes(mode: StudyMode, items: &[StudyItem]) -> Result<Vec<u8>, AppError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());

    match mode {
        StudyMode::Mcq => {
            wtr.write_record(["Question", "Option 1", "Option 2", "Option 3", "Option 4", "Answer"])
                .map_err(|e| AppError::ExportFailed(e.to_string()))?;
            for item in items {
                let (question, options, correct_answer) = match item {
                    StudyItem::Mcq(m) => {
                        (m.question.as_str(), m.options.as_slice(), m.correct_answer.as_str())
                    }
                    StudyItem::Flashcard(c) => (c.question.as_str(), &[][..], c.answer.as_str()),
                };
                let mut record = vec![question.to_string()];
                // Stored rows may predate the normalizer's four-option
                // guarantee; blank cells here, the "N/A" placeholder is a
                // normalization concern.
                for i in 0..MCQ_OPTION_COUNT {
                    record.push(options.get(i).cloned().unwrap_or_default());
                }
                record.push(correct_answer.to_string());
                wtr.write_record(&record)
                    .map_err(|e| AppError::ExportFailed(e.to_string()))?;
            }
        }
        StudyMode::Flashcard => {
            wtr.write_record(["Question", "Answer"])
                .map_err(|e| AppError::ExportFailed(e.to_string()))?;
            for item in items {
                let (question, answer) = match item {
                    StudyItem::Flashcard(c) => (c.question.as_str(), c.answer.as_str()),
                    StudyItem::Mcq(m) => (m.question.as_str(), m.correct_answer.as_str()),
                };
                wtr.write_record([question, answer])
                    .map_err(|e| AppError::ExportFailed(e.to_string()))?;
            }
        }
    }

    wtr.into_inner()
        .map_err(|e| AppError::ExportFailed(e.to_string()))
}

/// Tracks the cursor on the current page and starts a new page when a line
/// would land below the bottom margin.
struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl<'a> PageWriter<'a> {
    fn new(doc: &'a PdfDocumentReference, layer: PdfLayerReference) -> Self {
        Self {
            doc,
            layer,
            y: PAGE_HEIGHT_MM - MARGIN_MM,
        }
    }

    fn line(&mut self, text: &str, size: f32, leading: f32, font: &IndirectFontRef) {
        if self.y - leading < MARGIN_MM {
            let (page, layer) = self
                .doc
                .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT_MM - MARGIN_MM;
        }
        self.layer.use_text(text, size, Mm(MARGIN_MM), Mm(self.y), font);
        self.y -= leading;
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }
}

/// Greedy word wrap by character count. Words longer than a full line are
/// hard-split on char boundaries.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let mut word = word;
        while let Some((split_at, _)) = word.char_indices().nth(max_chars) {
            if current_len > 0 {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let (head, tail) = word.split_at(split_at);
            lines.push(head.to_string());
            word = tail;
        }

        let word_len = word.chars().count();
        if current_len == 0 {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= max_chars {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }

    if current_len > 0 {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Renders items as a paginated PDF. Question lines are bold; options and
/// answers regular.
pub fn pdf_bytes(topic: &str, mode: StudyMode, items: &[StudyItem]) -> Result<Vec<u8>, AppError> {
    let title = match mode {
        StudyMode::Flashcard => format!("Flashcards: {topic}"),
        StudyMode::Mcq => format!("Quiz: {topic}"),
    };

    let (doc, page, layer) =
        PdfDocument::new(&title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| AppError::ExportFailed(e.to_string()))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| AppError::ExportFailed(e.to_string()))?;

    let mut writer = PageWriter::new(&doc, doc.get_page(page).get_layer(layer));

    for line in wrap_text(&title, TITLE_WRAP_CHARS) {
        writer.line(&line, TITLE_SIZE, TITLE_LEADING_MM, &bold);
    }
    writer.gap(ITEM_GAP_MM);

    for (idx, item) in items.iter().enumerate() {
        let number = idx + 1;
        match item {
            StudyItem::Flashcard(card) => {
                for line in wrap_text(&format!("{number}. Q: {}", card.question), BODY_WRAP_CHARS) {
                    writer.line(&line, BODY_SIZE, BODY_LEADING_MM, &bold);
                }
                for line in wrap_text(&format!("A: {}", card.answer), BODY_WRAP_CHARS) {
                    writer.line(&line, BODY_SIZE, BODY_LEADING_MM, &regular);
                }
            }
            StudyItem::Mcq(m) => {
                for line in wrap_text(&format!("{number}. {}", m.question), BODY_WRAP_CHARS) {
                    writer.line(&line, BODY_SIZE, BODY_LEADING_MM, &bold);
                }
                for option in &m.options {
                    for line in wrap_text(&format!("- {option}"), BODY_WRAP_CHARS) {
                        writer.line(&line, BODY_SIZE, BODY_LEADING_MM, &regular);
                    }
                }
                for line in wrap_text(&format!("Answer: {}", m.correct_answer), BODY_WRAP_CHARS) {
                    writer.line(&line, BODY_SIZE, BODY_LEADING_MM, &regular);
                }
            }
        }
        writer.gap(ITEM_GAP_MM);
    }

    doc.save_to_bytes()
        .map_err(|e| AppError::ExportFailed(e.to_string()))
}

/// Download filename derived from the topic: unsafe characters are removed
/// rather than escaped, with a fixed fallback when nothing survives.
pub fn attachment_filename(topic: &str, extension: &str) -> String {
    let safe: String = topic
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let safe = safe.trim();
    let stem = if safe.is_empty() { "export" } else { safe };
    format!("{stem}.{extension}")
}
