use crate::{
    types::{ItemCatalogResponse, QuestCatalogResponse, Result},
    AppState,
};
use axum::{extract::State, Json};

/// List every catalog item
#[utoipa::path(
    get,
    path = "/api/items",
    responses(
        (status = 200, description = "Item catalog", body = ItemCatalogResponse)
    ),
    tag = "catalog"
)]
pub async fn list_items(State(state): State<AppState>) -> Result<Json<ItemCatalogResponse>> {
    let items = state.db.list_items().await?;
    Ok(Json(ItemCatalogResponse { items }))
}

/// List every catalog quest
#[utoipa::path(
    get,
    path = "/api/quests",
    responses(
        (status = 200, description = "Quest catalog", body = QuestCatalogResponse)
    ),
    tag = "catalog"
)]
pub async fn list_quests(State(state): State<AppState>) -> Result<Json<QuestCatalogResponse>> {
    let quests = state.db.list_quests().await?;
    Ok(Json(QuestCatalogResponse { quests }))
}
