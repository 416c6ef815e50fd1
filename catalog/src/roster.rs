use crate::catalog::Catalog;
use crate::errors::CatalogError;
use crate::users::UserRepository;
use serde::Serialize;

#[derive(Debug, PartialEq, Serialize)]
pub struct RosterEntry {
    pub email: String,
    pub nick: String,
    pub hero_name: String,
}

/// Every registered user together with the name of their hero. Heroes are looked up
/// one user at a time through the catalog, so repeated runs are served from cache.
pub async fn list_registered_users(
    catalog: &Catalog,
    users: &dyn UserRepository,
) -> Result<Vec<RosterEntry>, CatalogError> {
    let users = users.get_all().await;
    let mut roster = Vec::with_capacity(users.len());

    for user in users {
        let hero = catalog.get_person_by_id(user.external_id).await?;
        roster.push(RosterEntry {
            email: user.email,
            nick: user.nick_name,
            hero_name: hero.name,
        });
    }

    tracing::debug!(count = roster.len(), "Listed registered users");
    Ok(roster)
}
