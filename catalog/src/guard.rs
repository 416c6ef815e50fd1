use crate::errors::CatalogError;
use crate::metrics_defs::ACCESS_DENIED;
use crate::model::{Person, Relation};
use shared::counter;

/// Allows access to a sub-resource only when the person links to it through
/// `relation`. A relation the person does not carry at all links to nothing.
pub fn authorize(
    person: &Person,
    relation: Relation,
    resource_id: u64,
) -> Result<(), CatalogError> {
    if person.relations.ids(relation).contains(&resource_id) {
        return Ok(());
    }

    counter!(ACCESS_DENIED, "relation" => relation.as_str()).increment(1);
    tracing::debug!(
        person_id = person.id,
        relation = relation.as_str(),
        resource_id,
        "Sub-resource is not linked to person"
    );
    Err(CatalogError::Forbidden)
}
