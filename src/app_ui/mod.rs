//! Review content shown to the user before anything is signed or stored.
//!
//! Handlers only describe what to show; the device binary renders a [`Prompt`] and answers
//! through [`crate::App::resume`].

use alloc::string::String;
use alloc::vec::Vec;

pub mod address;
pub mod format;
pub mod sign;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptKind {
    /// Something gets signed on approval.
    Operation,
    /// A key is shown and handed to the host.
    Address,
    /// Persistent baking state changes.
    Settings,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub title: String,
    pub fields: Vec<Field>,
    /// Label of the approve action.
    pub confirm: String,
}

impl Prompt {
    pub fn new(kind: PromptKind, title: &str, confirm: &str) -> Self {
        Self {
            kind,
            title: title.into(),
            fields: Vec::new(),
            confirm: confirm.into(),
        }
    }

    pub fn field(mut self, name: &str, value: String) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value,
        });
        self
    }

    /// Value of the first field called `name`.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }
}
