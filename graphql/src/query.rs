use crate::{
    errors::{Unauthorized, Unexpected},
    types::EventType,
};
use async_graphql::{Context, Object, Result};
use database::PgPool;
use event_types::Actor;
use tracing::instrument;

pub struct Query;

#[Object]
impl Query {
    /// Get an event type the current user created, owns, hosts or shares a team with
    #[instrument(name = "Query::event_type", skip(self, ctx))]
    async fn event_type(&self, ctx: &Context<'_>, id: i32) -> Result<Option<EventType>> {
        let actor = ctx.data_opt::<Actor>().ok_or(Unauthorized)?;
        let db = ctx.data_unchecked::<PgPool>();

        let event_type = database::EventType::find_visible_to(id, actor.id, db)
            .await
            .map_err(Unexpected)?;

        Ok(event_type.map(EventType::from))
    }
}
