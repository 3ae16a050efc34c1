use indexmap::IndexMap;

use crate::controller::FormController;
use crate::error::FieldError;

/// Single-line edit buffer; `cursor` counts chars, not bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    pub value: String,
    pub cursor: usize,
}

impl TextInput {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self { value, cursor }
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.chars().count();
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    fn byte_index(line: &str, col: usize) -> usize {
        line.char_indices()
            .nth(col)
            .map(|(i, _)| i)
            .unwrap_or(line.len())
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        let len = self.value.chars().count();
        self.cursor = (self.cursor + 1).min(len);
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    pub fn insert_char(&mut self, c: char) {
        let idx = Self::byte_index(&self.value, self.cursor);
        self.value.insert(idx, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let start = Self::byte_index(&self.value, self.cursor - 1);
        let end = Self::byte_index(&self.value, self.cursor);
        self.value.replace_range(start..end, "");
        self.cursor -= 1;
        true
    }

    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.value.chars().count() {
            return false;
        }
        let start = Self::byte_index(&self.value, self.cursor);
        let end = Self::byte_index(&self.value, self.cursor + 1);
        self.value.replace_range(start..end, "");
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInput {
    pub name: String,
    pub required: bool,
    pub input: TextInput,
    pub error: Option<String>,
}

/// Editable copy of the active provider's fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialsForm {
    pub provider: String,
    pub fields: Vec<FieldInput>,
}

impl CredentialsForm {
    pub fn from_controller(controller: &FormController) -> Self {
        let fields = controller
            .values()
            .iter()
            .map(|(name, value)| FieldInput {
                name: name.clone(),
                required: controller.is_required(name),
                input: TextInput::new(value.as_str()),
                error: None,
            })
            .collect();
        Self {
            provider: controller.active_provider().to_string(),
            fields,
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_mut(&mut self, idx: usize) -> Option<&mut FieldInput> {
        self.fields.get_mut(idx)
    }

    pub fn values(&self) -> IndexMap<String, String> {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), f.input.value.clone()))
            .collect()
    }

    /// Attach validation messages to their fields; other fields are cleared.
    pub fn apply_errors(&mut self, errors: &[FieldError]) {
        for field in &mut self.fields {
            field.error = errors
                .iter()
                .find(|e| e.field == field.name)
                .map(|e| e.message.clone());
        }
    }

    pub fn first_error_index(&self) -> Option<usize> {
        self.fields.iter().position(|f| f.error.is_some())
    }
}
