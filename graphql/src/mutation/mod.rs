use async_graphql::MergedObject;

mod event_type;

use event_type::EventTypeMutation;

/// The various GraphQL mutations
///
/// Mutations are grouped by resource, with each group attached to this one struct.
#[derive(Default, MergedObject)]
pub struct Mutation(EventTypeMutation);
