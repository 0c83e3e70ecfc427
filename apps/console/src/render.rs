//! Plain-text rendering of controller snapshots.

use client_core::{Message, MessageKind, ViewSnapshot};
use shared::protocol::Item;

pub fn render_message(message: &Message) -> String {
    match message.kind {
        MessageKind::Success => format!("ok: {}", message.text),
        MessageKind::Error => format!("error: {}", message.text),
    }
}

fn format_price(preco: Option<f64>) -> String {
    preco.map(|p| format!("{p:.2}")).unwrap_or_else(|| "-".to_string())
}

pub fn render_item(item: &Item) -> String {
    let id = item
        .id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "new".to_string());
    let mut out = format!(
        "#{id} {nome} [{status}] {categoria} {preco}",
        nome = item.nome,
        status = item.status,
        categoria = item.categoria,
        preco = format_price(item.preco),
    );
    if !item.descricao.is_empty() {
        out.push_str(&format!("\n    {}", item.descricao));
    }
    out
}

pub fn render_page(snapshot: &ViewSnapshot) -> String {
    let page = &snapshot.page;
    let visible = snapshot.visible_items();
    let mut lines: Vec<String> = visible.iter().map(|item| render_item(item)).collect();
    if lines.is_empty() {
        lines.push("(no items)".to_string());
    }
    let mut footer = format!(
        "page {} of {} ({} items total)",
        page.page.saturating_add(1),
        page.total_pages.max(1),
        page.total_items
    );
    if !snapshot.filter_text.is_empty() {
        footer.push_str(&format!(
            ", {} of {} on this page match '{}'",
            visible.len(),
            page.items.len(),
            snapshot.filter_text
        ));
    }
    lines.push(footer);
    lines.join("\n")
}
