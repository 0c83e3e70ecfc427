use super::*;
use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use shared::{
    domain::ItemStatus,
    error::{ApiError, ErrorCode},
};
use tokio::{net::TcpListener, sync::Mutex};

use crate::{AlwaysConfirm, CommandOutcome, ControllerOptions, ItemController};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
struct ListQuery {
    page: u32,
    size: u32,
}

#[derive(Clone, Default)]
struct ServiceState {
    items: Arc<Mutex<BTreeMap<i64, Item>>>,
    next_id: Arc<Mutex<i64>>,
    list_queries: Arc<Mutex<Vec<ListQuery>>>,
}

type ServiceError = (StatusCode, Json<ApiError>);

fn not_found(id: i64) -> ServiceError {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::new(
            ErrorCode::ItemNotFound,
            format!("Item não encontrado: {id}"),
        )),
    )
}

async fn list_items(
    State(state): State<ServiceState>,
    Query(query): Query<ListQuery>,
) -> Json<ItemPage> {
    state.list_queries.lock().await.push(query);
    let items = state.items.lock().await;
    let all: Vec<Item> = items.values().cloned().collect();
    let from = (query.page as usize * query.size as usize).min(all.len());
    let to = (from + query.size as usize).min(all.len());
    Json(ItemPage {
        items: all[from..to].to_vec(),
        page: query.page,
        size: query.size,
        total_items: all.len() as u64,
        total_pages: (all.len() as u32).div_ceil(query.size.max(1)),
    })
}

async fn create_item(
    State(state): State<ServiceState>,
    Json(payload): Json<ItemPayload>,
) -> (StatusCode, Json<Item>) {
    let mut next_id = state.next_id.lock().await;
    *next_id += 1;
    let item = payload.into_item(Some(ItemId(*next_id)));
    state.items.lock().await.insert(*next_id, item.clone());
    (StatusCode::CREATED, Json(item))
}

async fn get_item(
    State(state): State<ServiceState>,
    Path(id): Path<i64>,
) -> Result<Json<Item>, ServiceError> {
    state
        .items
        .lock()
        .await
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| not_found(id))
}

async fn update_item(
    State(state): State<ServiceState>,
    Path(id): Path<i64>,
    Json(payload): Json<ItemPayload>,
) -> Result<Json<Item>, ServiceError> {
    let mut items = state.items.lock().await;
    let slot = items.get_mut(&id).ok_or_else(|| not_found(id))?;
    *slot = payload.into_item(Some(ItemId(id)));
    Ok(Json(slot.clone()))
}

async fn delete_item(
    State(state): State<ServiceState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    state
        .items
        .lock()
        .await
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| not_found(id))
}

async fn serve(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

async fn spawn_item_service() -> (String, ServiceState) {
    let state = ServiceState::default();
    let app = Router::new()
        .route(ITEMS_ROUTE, get(list_items).post(create_item))
        .route(
            &format!("{ITEMS_ROUTE}/:id"),
            get(get_item).put(update_item).delete(delete_item),
        )
        .with_state(state.clone());
    (serve(app).await, state)
}

async fn spawn_broken_service() -> String {
    let app = Router::new()
        .route(
            ITEMS_ROUTE,
            get(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({ "errors": ["size must be positive"] })),
                )
            })
            .post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        )
        .route(
            &format!("{ITEMS_ROUTE}/:id"),
            put(|| async { (StatusCode::BAD_GATEWAY, "upstream down") })
                .get(|| async { (StatusCode::OK, "not json") }),
        );
    serve(app).await
}

fn teclado() -> ItemPayload {
    ItemPayload {
        nome: "Teclado".into(),
        descricao: "Mecânico".into(),
        status: ItemStatus::Ativo,
        preco: Some(350.0),
        categoria: "ACESSORIOS".into(),
    }
}

#[tokio::test]
async fn crud_round_trip_over_http() {
    let (api_base, state) = spawn_item_service().await;
    let gateway = HttpItemGateway::new(format!("{api_base}/"));
    assert_eq!(gateway.api_base(), api_base);

    let created = gateway.create(&teclado()).await.expect("create");
    let id = created.id.expect("server assigned id");
    assert_eq!(created.nome, "Teclado");

    let page = gateway.list(0, 10).await.expect("list");
    assert_eq!(page.items, vec![created.clone()]);
    assert_eq!(page.total_pages, 1);
    assert_eq!(
        *state.list_queries.lock().await,
        vec![ListQuery { page: 0, size: 10 }]
    );

    let mut renamed = teclado();
    renamed.nome = "Teclado RGB".into();
    let updated = gateway.update(id, &renamed).await.expect("update");
    assert_eq!(updated.nome, "Teclado RGB");
    assert_eq!(gateway.get(id).await.expect("get").nome, "Teclado RGB");

    gateway.delete(id).await.expect("delete");
    let err = gateway.get(id).await.expect_err("deleted");
    assert_eq!(
        err,
        GatewayError::Api {
            status: 404,
            message: format!("Item não encontrado: {}", id.0),
        }
    );
}

#[tokio::test]
async fn error_responses_are_classified() {
    let api_base = spawn_broken_service().await;
    let gateway = HttpItemGateway::new(api_base);

    let err = gateway.list(0, 0).await.expect_err("bad request");
    assert_eq!(
        err,
        GatewayError::Unstructured {
            status: 400,
            body: r#"{"errors":["size must be positive"]}"#.into(),
        }
    );

    let err = gateway.create(&teclado()).await.expect_err("server error");
    assert_eq!(err, GatewayError::EmptyBody { status: 500 });

    let err = gateway
        .update(ItemId(1), &teclado())
        .await
        .expect_err("bad gateway");
    assert_eq!(err.user_message(), "upstream down");

    let err = gateway.get(ItemId(1)).await.expect_err("undecodable");
    assert!(matches!(err, GatewayError::Decode(_)));
}

#[tokio::test]
async fn unreachable_service_is_a_transport_failure() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let gateway = HttpItemGateway::new(format!("http://{addr}"));
    let err = gateway.list(0, 10).await.expect_err("nothing listening");
    assert!(matches!(err, GatewayError::Transport(_)), "{err:?}");
}

#[tokio::test]
async fn controller_keeps_list_consistent_through_crud_over_http() {
    let (api_base, _state) = spawn_item_service().await;
    let controller = ItemController::new_with_dependencies(
        Arc::new(HttpItemGateway::new(api_base)),
        Arc::new(AlwaysConfirm),
        ControllerOptions::default(),
    );
    controller.load_page(0).await;

    controller
        .update_draft(|draft| {
            let payload = teclado();
            draft.nome = payload.nome;
            draft.descricao = payload.descricao;
            draft.preco = payload.preco;
            draft.categoria = payload.categoria;
        })
        .await;
    assert_eq!(controller.save().await, CommandOutcome::Completed);
    let created = controller.page().await.items[0].clone();
    assert_eq!(created.nome, "Teclado");

    controller.edit(&created).await;
    controller
        .update_draft(|draft| draft.nome = "Teclado RGB".into())
        .await;
    assert_eq!(controller.save().await, CommandOutcome::Completed);
    let names: Vec<String> = controller
        .page()
        .await
        .items
        .into_iter()
        .map(|item| item.nome)
        .collect();
    assert_eq!(names, ["Teclado RGB"]);

    let updated = controller.page().await.items[0].clone();
    assert_eq!(controller.remove(&updated).await, CommandOutcome::Completed);
    let page = controller.page().await;
    assert!(page.items.is_empty());
    assert_eq!(page.total_items, 0);
}
