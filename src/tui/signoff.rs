//! Sign-off dialog state.
//!
//! The dialog collects a document type and an optional note, then submits
//! a bulk sign-off over the multi-selected tasks.

use crate::fields::DocumentType;
use crate::tui::input::InputField;

/// Which part of the dialog has focus.
#[derive(Clone, Copy, PartialEq)]
pub enum SignOffField {
    DocumentType,
    Note,
}

/// Form state for the sign-off dialog.
pub struct SignOffForm {
    pub document_types: Vec<DocumentType>,
    pub doc_index: usize,
    pub note: InputField,
    pub focus: SignOffField,
    /// How many tasks the sign-off will cover.
    pub task_count: usize,
}

impl SignOffForm {
    pub fn new(task_count: usize) -> Self {
        Self {
            document_types: vec![
                DocumentType::Attestation,
                DocumentType::Exception,
                DocumentType::SupportingEvidence,
                DocumentType::ManagementApproval,
            ],
            doc_index: 0,
            note: InputField::new(),
            focus: SignOffField::DocumentType,
            task_count,
        }
    }

    /// The currently chosen document type.
    pub fn document_type(&self) -> DocumentType {
        self.document_types[self.doc_index]
    }

    /// Toggle focus between the selector and the note field.
    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            SignOffField::DocumentType => SignOffField::Note,
            SignOffField::Note => SignOffField::DocumentType,
        };
        self.note.active = self.focus == SignOffField::Note;
    }

    /// Cycle the document type or move the note cursor.
    pub fn handle_left_right(&mut self, right: bool) {
        match self.focus {
            SignOffField::DocumentType => {
                let len = self.document_types.len();
                self.doc_index = if right {
                    (self.doc_index + 1) % len
                } else if self.doc_index == 0 {
                    len - 1
                } else {
                    self.doc_index - 1
                };
            }
            SignOffField::Note => {
                if right {
                    self.note.move_cursor_right();
                } else {
                    self.note.move_cursor_left();
                }
            }
        }
    }

    pub fn handle_char(&mut self, c: char) {
        if self.focus == SignOffField::Note {
            self.note.handle_char(c);
        }
    }

    pub fn handle_backspace(&mut self) {
        if self.focus == SignOffField::Note {
            self.note.handle_backspace();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_type_cycles_both_ways() {
        let mut form = SignOffForm::new(3);
        assert_eq!(form.document_type(), DocumentType::Attestation);
        form.handle_left_right(false);
        assert_eq!(form.document_type(), DocumentType::ManagementApproval);
        form.handle_left_right(true);
        assert_eq!(form.document_type(), DocumentType::Attestation);
    }

    #[test]
    fn test_typing_goes_to_note_only_when_focused() {
        let mut form = SignOffForm::new(1);
        form.handle_char('x');
        assert!(form.note.value.is_empty());
        form.toggle_focus();
        form.handle_char('x');
        assert_eq!(form.note.value, "x");
    }
}
