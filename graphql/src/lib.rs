use async_graphql::{
    extensions::{Analyzer, Tracing},
    EmptySubscription, Schema as BaseSchema, SchemaBuilder,
};
use database::PgPool;
use event_types::Services;

mod errors;
mod mutation;
mod query;
mod types;

use mutation::Mutation;
use query::Query;

/// The graphql schema for the service
pub type Schema = BaseSchema<Query, Mutation, EmptySubscription>;

/// Create a schema builder with the necessary extensions
fn builder() -> SchemaBuilder<Query, Mutation, EmptySubscription> {
    Schema::build(Query, Mutation::default(), EmptySubscription)
        .extension(Tracing)
        .extension(Analyzer)
}

/// Build the schema with the necessary extensions
///
/// The requesting [`event_types::Actor`] must be attached to each request that should be
/// authenticated.
pub fn schema(db: PgPool, services: Services) -> Schema {
    builder().data(db).data(services).finish()
}

/// Export the GraphQL schema
pub fn sdl() -> String {
    builder().finish().sdl()
}

#[cfg(test)]
mod tests {
    use super::{schema, sdl};
    use async_graphql::{Request, Value};
    use database::{PgPool, UserMetadata};
    use event_types::{Actor, Services};
    use std::sync::Arc;
    use url::Url;

    fn services(db: &PgPool) -> Services {
        let payments = payments::Client::new(payments::Config {
            api_url: Url::parse("http://127.0.0.1:9").unwrap(),
            secret_key: String::from("sk_test"),
            success_url: Url::parse("http://localhost/success").unwrap(),
            cancel_url: Url::parse("http://localhost/cancel").unwrap(),
        })
        .unwrap();

        Services::postgres(db.clone(), Arc::new(payments))
    }

    fn code(response: &async_graphql::Response) -> Option<Value> {
        response.errors[0]
            .extensions
            .as_ref()
            .and_then(|extensions| extensions.get("code"))
            .cloned()
    }

    #[test]
    fn sdl_exposes_the_create_mutation() {
        let sdl = sdl();
        assert!(sdl.contains("createEventType(input: CreateEventTypeInput!): CreateEventTypeResult!"));
        assert!(sdl.contains("paymentUid: String!"));
        assert!(sdl.contains("ROUND_ROBIN"));
    }

    #[tokio::test]
    async fn anonymous_requests_are_unauthorized() {
        let db = PgPool::connect_lazy("postgres://localhost/scheduler").unwrap();
        let schema = schema(db.clone(), services(&db));

        let response = schema
            .execute(
                r#"mutation { createEventType(input: { title: "Intro", slug: "intro" }) { paymentUid } }"#,
            )
            .await;

        assert_eq!(response.errors.len(), 1);
        assert_eq!(code(&response), Some(Value::from("UNAUTHORIZED")));
    }

    #[tokio::test]
    async fn invalid_input_is_a_bad_request() {
        let db = PgPool::connect_lazy("postgres://localhost/scheduler").unwrap();
        let schema = schema(db.clone(), services(&db));
        let actor = Actor {
            id: 1,
            email: String::from("alex@example.com"),
            username: None,
            preferences: UserMetadata::default(),
        };

        let request = Request::new(
            r#"mutation { createEventType(input: { title: "Intro", slug: "" }) { paymentUid } }"#,
        )
        .data(actor);
        let response = schema.execute(request).await;

        assert_eq!(response.errors.len(), 1);
        assert_eq!(code(&response), Some(Value::from("BAD_REQUEST")));
        assert_eq!(response.errors[0].message, "slug cannot be empty");
    }
}
