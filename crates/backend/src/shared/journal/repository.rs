use chrono::Utc;
use contracts::shared::journal::{JournalEntry, SubscribeStatus};
use sea_orm::entity::prelude::*;
use sea_orm::{EntityTrait, QueryOrder, QuerySelect, Set};

use crate::shared::data::db::get_connection;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "subscription_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub timestamp: String,
    pub order_id: i64,
    pub product_id: i64,
    pub campaign_id: String,
    pub email: String,
    pub status: String,
    pub detail: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for JournalEntry {
    fn from(m: Model) -> Self {
        JournalEntry {
            id: m.id,
            timestamp: m.timestamp,
            order_id: m.order_id,
            product_id: m.product_id,
            campaign_id: m.campaign_id,
            email: m.email,
            status: m.status,
            detail: m.detail,
        }
    }
}

fn conn() -> &'static DatabaseConnection {
    get_connection()
}

/// Добавить запись в журнал в фоне (внутренняя функция)
pub fn record_internal(
    order_id: i64,
    product_id: i64,
    campaign_id: &str,
    email: &str,
    status: SubscribeStatus,
    detail: Option<String>,
) {
    let campaign_id = campaign_id.to_string();
    let email = email.to_string();

    tokio::spawn(async move {
        if let Err(e) =
            record_entry(order_id, product_id, &campaign_id, &email, status, detail).await
        {
            eprintln!("Failed to record subscription journal entry: {}", e);
        }
    });
}

/// Добавить запись в журнал
pub async fn record_entry(
    order_id: i64,
    product_id: i64,
    campaign_id: &str,
    email: &str,
    status: SubscribeStatus,
    detail: Option<String>,
) -> anyhow::Result<()> {
    let now = Utc::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string();

    let active = ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        timestamp: Set(now),
        order_id: Set(order_id),
        product_id: Set(product_id),
        campaign_id: Set(campaign_id.to_string()),
        email: Set(email.to_string()),
        status: Set(status.as_str().to_string()),
        detail: Set(detail),
    };

    active.insert(conn()).await?;
    Ok(())
}

/// Последние записи журнала (новые сверху)
pub async fn list_recent(limit: u64) -> anyhow::Result<Vec<JournalEntry>> {
    let entries: Vec<JournalEntry> = Entity::find()
        .order_by_desc(Column::Id)
        .limit(limit)
        .all(conn())
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(entries)
}

/// Очистить журнал
pub async fn clear_all() -> anyhow::Result<()> {
    Entity::delete_many().exec(conn()).await?;
    Ok(())
}
