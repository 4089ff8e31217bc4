//! Highlighted HTML export
//!
//! Entities with a link become `<a>` elements pointing at their primary link;
//! entities with coordinates but no link become `<span>` elements. Everything
//! else, including the text between entities, is escaped and left as is.

use super::{description, primary_link};
use crate::pipeline::Analysis;
use crate::types::{Entity, EntityType};

const DEFAULT_COLOR: &str = "#E7E2D2";

/// Highlight colour for an entity type
pub fn entity_color(entity_type: &EntityType) -> &'static str {
    match entity_type.as_str() {
        "PERSON" => "#BF7B69",
        "ORGANIZATION" => "#9fd2cd",
        "LOCATION" => "#EFCA89",
        "MISC" | "GPE" => "#C4C3A2",
        "FACILITY" => "#C3B5AC",
        "GSP" => "#C4A998",
        "ADDRESS" => "#CCBEAA",
        _ => DEFAULT_COLOR,
    }
}

/// Escape `& < > " '`
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn tooltip(entity: &Entity) -> String {
    let mut parts = vec![format!("Type: {}", entity.entity_type())];
    if let Some(desc) = description(entity) {
        parts.push(format!("Description: {}", desc));
    }
    if let Some(geo) = &entity.geo {
        if !geo.location_name.is_empty() {
            parts.push(format!("Location: {}", geo.location_name));
        }
    }
    escape_html(&parts.join(" | "))
}

fn render_entity(entity: &Entity, source: &str) -> Option<String> {
    let color = entity_color(entity.entity_type());
    let label = escape_html(source);

    if let Some(url) = primary_link(entity) {
        return Some(format!(
            r#"<a href="{}" style="background-color: {}; padding: 2px 4px; border-radius: 3px; text-decoration: none; color: black;" target="_blank" title="{}">{}</a>"#,
            escape_html(url),
            color,
            tooltip(entity),
            label
        ));
    }

    if entity.is_geocoded() {
        return Some(format!(
            r#"<span style="background-color: {}; padding: 2px 4px; border-radius: 3px;" title="{}">{}</span>"#,
            color,
            tooltip(entity),
            label
        ));
    }

    None
}

/// Escaped `text` with linked or geocoded entities highlighted
///
/// Entities must not overlap; any that do, or whose offsets fall outside
/// `text`, are rendered as plain text.
pub fn highlight_entities(text: &str, entities: &[Entity]) -> String {
    let mut ordered: Vec<&Entity> = entities.iter().collect();
    ordered.sort_by_key(|e| e.start());

    let mut html = String::with_capacity(text.len() * 2);
    let mut cursor = 0;

    for entity in ordered {
        if entity.start() < cursor {
            continue;
        }
        let Some(source) = text.get(entity.start()..entity.end()) else {
            continue;
        };
        let Some(rendered) = render_entity(entity, source) else {
            continue;
        };

        html.push_str(&escape_html(&text[cursor..entity.start()]));
        html.push_str(&rendered);
        cursor = entity.end();
    }

    html.push_str(&escape_html(&text[cursor..]));
    html
}

/// Standalone HTML page for an analysis
pub fn render_document(analysis: &Analysis) -> String {
    let title = escape_html(&analysis.title);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Entity Analysis: {title}</title>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>
        body {{ font-family: Arial, sans-serif; max-width: 800px; margin: 0 auto; padding: 20px; }}
        .content {{ background: white; padding: 20px; border: 1px solid #ddd; border-radius: 5px; line-height: 1.6; }}
        .header {{ background: #f5f5f5; padding: 15px; border-radius: 5px; margin-bottom: 20px; }}
        @media (max-width: 768px) {{
            body {{ padding: 10px; }}
            .content {{ padding: 15px; }}
            .header {{ padding: 10px; }}
        }}
    </style>
</head>
<body>
    <div class="header">
        <h1>Entity Analysis: {title}</h1>
        <p>Generated on {generated}</p>
        <p>Found {count} entities</p>
    </div>
    <div class="content">
        {content}
    </div>
</body>
</html>
"#,
        title = title,
        generated = analysis.created_at.format("%Y-%m-%d %H:%M:%S"),
        count = analysis.entities.len(),
        content = highlight_entities(&analysis.text, &analysis.entities),
    )
}
