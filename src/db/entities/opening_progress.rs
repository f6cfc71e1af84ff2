use sea_orm::entity::prelude::*;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "opening_progress")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub created_at: DateTimeWithTimeZone,
    #[sea_orm(default_expr = "Expr::current_timestamp()")]
    pub updated_at: DateTimeWithTimeZone,
    #[sea_orm(unique_key = "user_opening")]
    pub user_id: Uuid,
    #[sea_orm(unique_key = "user_opening")]
    pub opening_id: String,
    /// SM-2 ease factor in permille (2500 = 2.5).
    pub ease_permille: i32,
    pub interval_days: i32,
    pub repetitions: i32,
    #[sea_orm(indexed)]
    pub next_review_at: DateTimeWithTimeZone,
    pub last_reviewed_at: Option<DateTimeWithTimeZone>,
    pub total_reviews: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id", on_delete = "Cascade")]
    pub user: HasOne<super::user::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}

crate::impl_base_entity!();
