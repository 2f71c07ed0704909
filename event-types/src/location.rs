//! Picks where meetings for a new event type take place.
//!
//! Explicit locations always win. Without them, a user's preferred conferencing app is used,
//! taking the location type of the installed app or the built-in video provider's type when the
//! app is not installed. Users without a preference get the built-in video provider when it is
//! configured, and Google Meet otherwise.

use crate::{
    apps::{self, AppDescriptor},
    Actor, IntegrationStore,
};
use database::{DefaultConferencingApp, Location};
use tracing::{debug, instrument};

/// Slug of the built-in video provider
pub const DEFAULT_VIDEO_APP: &str = "daily-video";
/// Location type of the built-in video provider
pub const DAILY_VIDEO: &str = "integrations:daily";
/// Location type used when nothing else applies
pub const GOOGLE_MEET: &str = "integrations:google:meet";

/// Compute the locations for a new event type
pub fn resolve(
    explicit: &[Location],
    has_default_video: bool,
    preference: Option<&DefaultConferencingApp>,
    installed: &[&AppDescriptor],
) -> Vec<Location> {
    if !explicit.is_empty() {
        return explicit.to_vec();
    }

    let preference = preference.filter(|p| p.app_slug != DEFAULT_VIDEO_APP);
    if let Some(preference) = preference {
        let kind = installed
            .iter()
            .find(|app| app.slug == preference.app_slug)
            .and_then(|app| app.location_option.as_ref())
            .map(|option| option.value)
            .unwrap_or(DAILY_VIDEO);
        return vec![Location::with_link(kind, preference.app_link.clone())];
    }

    if has_default_video {
        vec![Location::new(DAILY_VIDEO)]
    } else {
        vec![Location::new(GOOGLE_MEET)]
    }
}

/// Compute the locations for a new event type, looking up the actor's integrations
///
/// Lookups are skipped when they cannot change the outcome.
#[instrument(name = "location::resolve_for", skip_all, fields(actor.id = actor.id))]
pub async fn resolve_for(
    integrations: &dyn IntegrationStore,
    actor: &Actor,
    explicit: &[Location],
) -> database::Result<Vec<Location>> {
    if !explicit.is_empty() {
        return Ok(explicit.to_vec());
    }

    let has_default_video = integrations
        .find_app(DEFAULT_VIDEO_APP)
        .await?
        .map(|app| app.key("api_key").is_some())
        .unwrap_or_default();

    let preference = actor
        .preferences
        .default_conferencing_app
        .as_ref()
        .filter(|p| p.app_slug != DEFAULT_VIDEO_APP);
    let installed = match preference {
        Some(_) => {
            let credentials = integrations.credentials_for_user(actor.id).await?;
            apps::installed(&credentials)
        }
        None => Vec::new(),
    };

    let locations = resolve(explicit, has_default_video, preference, &installed);
    debug!(?locations, has_default_video, "resolved default locations");

    Ok(locations)
}

#[cfg(test)]
mod tests {
    use super::{resolve, resolve_for, DAILY_VIDEO, GOOGLE_MEET};
    use crate::{
        apps,
        testing::{actor, credential, daily_app, FakeStore},
    };
    use database::{DefaultConferencingApp, Location};

    fn zoom_preference() -> DefaultConferencingApp {
        DefaultConferencingApp {
            app_slug: String::from("zoom"),
            app_link: Some(String::from("https://zoom.us/my/alex")),
        }
    }

    #[test]
    fn explicit_locations_are_kept() {
        let explicit = vec![Location::with_link(
            "inPerson",
            Some(String::from("Main street 1")),
        )];
        let installed = vec![apps::find("zoom").unwrap()];

        let locations = resolve(&explicit, true, Some(&zoom_preference()), &installed);
        assert_eq!(locations, explicit);
    }

    #[test]
    fn default_video_without_preference() {
        let locations = resolve(&[], true, None, &[]);
        assert_eq!(locations, vec![Location::new(DAILY_VIDEO)]);
    }

    #[test]
    fn installed_preference_wins_over_default_video() {
        let installed = vec![apps::find("zoom").unwrap()];

        for has_default_video in [true, false] {
            let locations = resolve(&[], has_default_video, Some(&zoom_preference()), &installed);
            assert_eq!(
                locations,
                vec![Location::with_link(
                    "integrations:zoom",
                    Some(String::from("https://zoom.us/my/alex"))
                )]
            );
        }
    }

    #[test]
    fn preferred_app_without_location_falls_back_to_default_video_type() {
        let preference = DefaultConferencingApp {
            app_slug: String::from("stripe"),
            app_link: None,
        };
        let installed = vec![apps::find("stripe").unwrap()];

        let locations = resolve(&[], false, Some(&preference), &installed);
        assert_eq!(locations, vec![Location::new(DAILY_VIDEO)]);
    }

    #[test]
    fn preference_for_missing_app_uses_default_video_type() {
        let expected = vec![Location::with_link(
            DAILY_VIDEO,
            Some(String::from("https://zoom.us/my/alex")),
        )];

        for has_default_video in [true, false] {
            let locations = resolve(&[], has_default_video, Some(&zoom_preference()), &[]);
            assert_eq!(locations, expected);
        }
    }

    #[test]
    fn default_video_preference_is_not_an_override() {
        let preference = DefaultConferencingApp {
            app_slug: String::from("daily-video"),
            app_link: Some(String::from("https://example.daily.co/room")),
        };
        let installed = vec![apps::find("daily-video").unwrap()];

        let locations = resolve(&[], false, Some(&preference), &installed);
        assert_eq!(locations, vec![Location::new(GOOGLE_MEET)]);
    }

    #[tokio::test]
    async fn lookups_use_the_actors_integrations() {
        let store = FakeStore::default();
        store.add_app(daily_app(Some("daily-key")));
        store.add_credential(credential(1, 7, "zoom"));

        let mut alex = actor(7);
        alex.preferences.default_conferencing_app = Some(zoom_preference());

        let locations = resolve_for(&store, &alex, &[]).await.unwrap();
        assert_eq!(
            locations,
            vec![Location::with_link(
                "integrations:zoom",
                Some(String::from("https://zoom.us/my/alex"))
            )]
        );
    }

    #[tokio::test]
    async fn default_video_requires_an_api_key() {
        let store = FakeStore::default();
        store.add_app(daily_app(None));

        let locations = resolve_for(&store, &actor(7), &[]).await.unwrap();
        assert_eq!(locations, vec![Location::new(GOOGLE_MEET)]);
    }
}
