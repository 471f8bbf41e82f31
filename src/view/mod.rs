//! In-memory model of the sample curation page.
//!
//! The page is a list of field containers. Each container has a count badge,
//! a search input and an ordered list of rendered items. Items are either
//! real samples (which carry the `layout`/`field`/`value` attributes needed to
//! delete them later) or placeholders, which are never deletable.

use serde::{Deserialize, Serialize};

pub const EMPTY_SEARCH_TEXT: &str = "Nenhuma amostra encontrada.";
pub const SEARCH_ERROR_TEXT: &str = "Erro ao buscar.";

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldKey {
    pub layout: String,
    pub field: String,
}

impl FieldKey {
    pub fn new(layout: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            layout: layout.into(),
            field: field.into(),
        }
    }
}

/// Opaque reference to an element on the page. Never serialized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementRef {
    /// the delete button inside a sample list item
    Item(ItemId),
    /// the "clear all" button of a field container
    ClearButton(FieldKey),
    /// the search input of a field container
    SearchInput(FieldKey),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaceholderTone {
    Muted,
    Danger,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListItem {
    Sample {
        id: ItemId,
        layout: String,
        field: String,
        value: String,
    },
    Placeholder {
        text: String,
        tone: PlaceholderTone,
    },
}

impl ListItem {
    pub fn sample_value(&self) -> Option<&str> {
        match self {
            ListItem::Sample { value, .. } => Some(value),
            ListItem::Placeholder { .. } => None,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            ListItem::Sample { value, .. } => value,
            ListItem::Placeholder { text, .. } => text,
        }
    }
}

/// The data attributes a delete affordance carries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteAttrs {
    pub layout: String,
    pub field: String,
    pub value: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldContainer {
    pub key: FieldKey,
    pub badge: String,
    pub search_text: String,
    pub items: Vec<ListItem>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SamplePage {
    fields: Vec<FieldContainer>,
    backend_message: Option<String>,
    next_id: u64,
}

impl SamplePage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a server-rendered field container. The badge shows the number of
    /// samples rendered with it.
    pub fn add_field(&mut self, key: FieldKey, samples: &[String]) -> &mut FieldContainer {
        let items = samples
            .iter()
            .map(|value| self.sample_item(&key, value))
            .collect::<Vec<_>>();
        let idx = match self.fields.iter().position(|f| f.key == key) {
            Some(idx) => {
                self.fields[idx].items = items;
                self.fields[idx].badge = samples.len().to_string();
                idx
            }
            None => {
                self.fields.push(FieldContainer {
                    key,
                    badge: samples.len().to_string(),
                    search_text: String::new(),
                    items,
                });
                self.fields.len() - 1
            }
        };
        &mut self.fields[idx]
    }

    pub fn set_backend_message(&mut self, message: Option<String>) {
        self.backend_message = message.filter(|m| !m.is_empty());
    }

    pub fn backend_message(&self) -> Option<&str> {
        self.backend_message.as_deref()
    }

    pub fn fields(&self) -> &[FieldContainer] {
        &self.fields
    }

    pub fn field(&self, key: &FieldKey) -> Option<&FieldContainer> {
        self.fields.iter().find(|f| &f.key == key)
    }

    fn field_mut(&mut self, key: &FieldKey) -> Option<&mut FieldContainer> {
        self.fields.iter_mut().find(|f| &f.key == key)
    }

    pub fn set_search_text(&mut self, key: &FieldKey, text: &str) -> bool {
        match self.field_mut(key) {
            Some(field) => {
                field.search_text = text.to_string();
                true
            }
            None => false,
        }
    }

    /// Handle to the delete button of the first sample with `value`.
    pub fn find_item(&self, key: &FieldKey, value: &str) -> Option<ElementRef> {
        self.field(key)?.items.iter().find_map(|item| match item {
            ListItem::Sample { id, value: v, .. } if v == value => Some(ElementRef::Item(*id)),
            _ => None,
        })
    }

    /// Reads the delete attributes off an element. Placeholders and search
    /// inputs carry none.
    pub fn delete_attrs(&self, target: &ElementRef) -> Option<DeleteAttrs> {
        match target {
            ElementRef::Item(id) => self.fields.iter().find_map(|f| {
                f.items.iter().find_map(|item| match item {
                    ListItem::Sample {
                        id: item_id,
                        layout,
                        field,
                        value,
                    } if item_id == id => Some(DeleteAttrs {
                        layout: layout.clone(),
                        field: field.clone(),
                        value: Some(value.clone()),
                    }),
                    _ => None,
                })
            }),
            ElementRef::ClearButton(key) => self.field(key).map(|f| DeleteAttrs {
                layout: f.key.layout.clone(),
                field: f.key.field.clone(),
                value: None,
            }),
            ElementRef::SearchInput(_) => None,
        }
    }

    /// Reads `(layout, field, term)` off a search input.
    pub fn search_input(&self, target: &ElementRef) -> Option<(FieldKey, String)> {
        match target {
            ElementRef::SearchInput(key) => self
                .field(key)
                .map(|f| (f.key.clone(), f.search_text.clone())),
            _ => None,
        }
    }

    /// Removes the list item enclosing `target`. Returns whether an item was
    /// removed; other items are left alone.
    pub fn remove_item(&mut self, target: &ElementRef) -> bool {
        let ElementRef::Item(id) = target else {
            return false;
        };
        for field in self.fields.iter_mut() {
            let before = field.items.len();
            field
                .items
                .retain(|item| !matches!(item, ListItem::Sample { id: item_id, .. } if item_id == id));
            if field.items.len() != before {
                return true;
            }
        }
        false
    }

    /// Empties the container enclosing `target` and resets its badge to `0`.
    pub fn clear_field(&mut self, target: &ElementRef) -> bool {
        let key = match self.container_of(target) {
            Some(key) => key,
            None => return false,
        };
        match self.field_mut(&key) {
            Some(field) => {
                field.items.clear();
                field.badge = "0".to_string();
                true
            }
            None => false,
        }
    }

    pub fn replace_samples(&mut self, key: &FieldKey, values: &[String]) -> bool {
        if self.field(key).is_none() {
            return false;
        }
        let items = values
            .iter()
            .map(|value| self.sample_item(key, value))
            .collect::<Vec<_>>();
        if let Some(field) = self.field_mut(key) {
            field.items = items;
        }
        true
    }

    pub fn show_placeholder(&mut self, key: &FieldKey, text: &str, tone: PlaceholderTone) -> bool {
        match self.field_mut(key) {
            Some(field) => {
                field.items = vec![ListItem::Placeholder {
                    text: text.to_string(),
                    tone,
                }];
                true
            }
            None => false,
        }
    }

    fn container_of(&self, target: &ElementRef) -> Option<FieldKey> {
        match target {
            ElementRef::ClearButton(key) | ElementRef::SearchInput(key) => {
                self.field(key).map(|f| f.key.clone())
            }
            ElementRef::Item(id) => self
                .fields
                .iter()
                .find(|f| {
                    f.items
                        .iter()
                        .any(|item| matches!(item, ListItem::Sample { id: item_id, .. } if item_id == id))
                })
                .map(|f| f.key.clone()),
        }
    }

    fn sample_item(&mut self, key: &FieldKey, value: &str) -> ListItem {
        self.next_id += 1;
        ListItem::Sample {
            id: ItemId(self.next_id),
            layout: key.layout.clone(),
            field: key.field.clone(),
            value: value.to_string(),
        }
    }
}
