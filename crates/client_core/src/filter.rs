//! Display-side filtering of the loaded page. Items outside the current page
//! are never considered.

use shared::protocol::Item;

#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    needle: String,
}

impl ItemFilter {
    pub fn new(text: &str) -> Self {
        Self {
            needle: text.to_lowercase(),
        }
    }

    pub fn matches(&self, item: &Item) -> bool {
        if self.needle.is_empty() {
            return true;
        }
        [&item.nome, &item.descricao, &item.categoria]
            .into_iter()
            .any(|field| field.to_lowercase().contains(&self.needle))
    }

    pub fn apply<'a>(&self, items: &'a [Item]) -> Vec<&'a Item> {
        items.iter().filter(|item| self.matches(item)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(nome: &str, descricao: &str, categoria: &str) -> Item {
        Item {
            nome: nome.into(),
            descricao: descricao.into(),
            categoria: categoria.into(),
            ..Item::default()
        }
    }

    #[test]
    fn matches_name_case_insensitively() {
        let items = [item("Teclado", "", ""), item("Mouse", "", "")];
        for text in ["tec", "TEC", "Tec"] {
            let visible = ItemFilter::new(text).apply(&items);
            assert_eq!(visible.len(), 1, "filter {text}");
            assert_eq!(visible[0].nome, "Teclado");
        }
    }

    #[test]
    fn empty_text_matches_everything() {
        let items = [item("Teclado", "", ""), item("Mouse", "", "")];
        assert_eq!(ItemFilter::new("").apply(&items).len(), 2);
    }

    #[test]
    fn searches_description_and_category() {
        let teclado = item("Teclado", "Mecânico", "ACESSORIOS");
        assert!(ItemFilter::new("MECÂN").matches(&teclado));
        assert!(ItemFilter::new("acess").matches(&teclado));
        assert!(!ItemFilter::new("monitor").matches(&teclado));
    }
}
