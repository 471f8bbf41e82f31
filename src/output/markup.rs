use super::escape_html;
use crate::view::{FieldContainer, ListItem, PlaceholderTone};

/// Renders a field's sample list the way the curation page marks it up, so a
/// delete button can be rebuilt from its `data-*` attributes alone.
pub fn render_sample_list(field: &FieldContainer) -> String {
    let mut out = String::new();
    for item in field.items.iter() {
        out.push_str(&render_item(item));
        out.push('\n');
    }
    out
}

fn render_item(item: &ListItem) -> String {
    match item {
        ListItem::Sample {
            layout,
            field,
            value,
            ..
        } => format!(
            r#"<li class="list-group-item d-flex justify-content-between align-items-center">
  <span class="valor-amostra">{value_text}</span>
  <button class="btn btn-sm btn-outline-danger btn-excluir-valor" data-layout="{layout}" data-campo="{field}" data-valor="{value_attr}">
    <i class="bi bi-x-lg"></i>
  </button>
</li>"#,
            value_text = escape_html(value),
            layout = escape_html(layout),
            field = escape_html(field),
            value_attr = escape_html(value),
        ),
        ListItem::Placeholder { text, tone } => {
            let class = match tone {
                PlaceholderTone::Muted => "list-group-item",
                PlaceholderTone::Danger => "list-group-item text-danger",
            };
            format!(r#"<li class="{class}">{}</li>"#, escape_html(text))
        }
    }
}

/// One line per item, for terminals.
pub fn render_sample_lines(field: &FieldContainer) -> String {
    let mut out = format!(
        "{} / {} [{}]\n",
        field.key.layout, field.key.field, field.badge
    );
    for item in field.items.iter() {
        match item {
            ListItem::Sample { value, .. } => out.push_str(&format!("  - {value}\n")),
            ListItem::Placeholder { text, .. } => out.push_str(&format!("  ({text})\n")),
        }
    }
    out
}
