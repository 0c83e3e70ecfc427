use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{null_as_default, ItemId, ItemStatus};

/// A record of the remote collection. `id` is `None` until the server has
/// persisted it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nome: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub descricao: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ItemStatus,
    #[serde(default)]
    pub preco: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categoria: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Item {
    pub fn payload(&self) -> ItemPayload {
        ItemPayload {
            nome: self.nome.clone(),
            descricao: self.descricao.clone(),
            status: self.status,
            preco: self.preco,
            categoria: self.categoria.clone(),
        }
    }
}

/// Body of create and update requests. Never carries an id; updates address
/// the item through the request path.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ItemPayload {
    pub nome: String,
    pub descricao: String,
    pub status: ItemStatus,
    pub preco: Option<f64>,
    pub categoria: String,
}

impl ItemPayload {
    pub fn into_item(self, id: Option<ItemId>) -> Item {
        Item {
            id,
            nome: self.nome,
            descricao: self.descricao,
            status: self.status,
            preco: self.preco,
            categoria: self.categoria,
            created_at: None,
            updated_at: None,
        }
    }
}

/// One slice of the collection as returned by the list endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<Item>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub page: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub size: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_items: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_pages: u32,
}

impl ItemPage {
    pub fn empty(size: u32) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn is_first(&self) -> bool {
        self.page == 0
    }

    pub fn is_last(&self) -> bool {
        self.page.saturating_add(1) >= self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_server_item_with_timestamps() {
        let item: Item = serde_json::from_value(json!({
            "id": 4,
            "nome": "Teclado",
            "descricao": "Mecânico",
            "status": "ATIVO",
            "preco": 350.0,
            "categoria": "ACESSORIOS",
            "createdAt": "2025-03-01T10:00:00Z",
            "updatedAt": "2025-03-02T11:30:00Z"
        }))
        .expect("decode item");

        assert_eq!(item.id, Some(ItemId(4)));
        assert_eq!(item.status, ItemStatus::Ativo);
        assert_eq!(item.preco, Some(350.0));
        assert!(item.created_at.is_some());
        assert!(item.updated_at > item.created_at);
    }

    #[test]
    fn null_fields_decode_to_defaults() {
        let item: Item = serde_json::from_value(json!({
            "id": 1,
            "nome": null,
            "descricao": null,
            "status": null,
            "preco": null,
            "categoria": null
        }))
        .expect("decode item");

        assert_eq!(item.nome, "");
        assert_eq!(item.status, ItemStatus::Ativo);
        assert_eq!(item.preco, None);
    }

    #[test]
    fn payload_never_serializes_an_id() {
        let item = Item {
            id: Some(ItemId(9)),
            nome: "Mouse".into(),
            ..Item::default()
        };
        let value = serde_json::to_value(item.payload()).expect("encode");
        assert!(value.get("id").is_none());
        assert_eq!(value["status"], "ATIVO");
        assert_eq!(value["nome"], "Mouse");
    }

    #[test]
    fn page_uses_camel_case_and_tolerates_missing_fields() {
        let page: ItemPage = serde_json::from_value(json!({
            "items": [{"id": 1, "nome": "Mouse", "status": "INATIVO"}],
            "page": 2,
            "totalItems": 21,
            "totalPages": 3
        }))
        .expect("decode page");

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].status, ItemStatus::Inativo);
        assert_eq!(page.size, 0);
        assert_eq!(page.total_items, 21);
        assert!(page.is_last());
        assert!(!page.is_first());
    }

    #[test]
    fn empty_page_is_both_first_and_last() {
        let page = ItemPage::empty(10);
        assert!(page.is_first());
        assert!(page.is_last());
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("inativo".parse::<ItemStatus>(), Ok(ItemStatus::Inativo));
        assert!("archived".parse::<ItemStatus>().is_err());
    }
}
