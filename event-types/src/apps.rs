//! The catalog of apps that can be installed from the app store.

use database::Credential;

/// Static metadata about an app
#[derive(Debug, Eq, PartialEq)]
pub struct AppDescriptor {
    /// The app's unique slug, matching [`Credential::app_slug`]
    pub slug: &'static str,
    pub name: &'static str,
    /// The meeting location the app provides, if it is a conferencing app
    pub location_option: Option<LocationOption>,
}

/// A meeting location an app can provide
#[derive(Debug, Eq, PartialEq)]
pub struct LocationOption {
    /// The location type stored on event types
    pub value: &'static str,
    pub label: &'static str,
}

macro_rules! catalog {
    (@option $name:literal $value:literal) => {
        Some(LocationOption { value: $value, label: $name })
    };
    (@option $name:literal) => {
        None
    };
    ( $( $slug:literal => $name:literal $( @ $value:literal )? ),+ $(,)? ) => {
        &[
            $(
                AppDescriptor {
                    slug: $slug,
                    name: $name,
                    location_option: catalog!(@option $name $( $value )?),
                },
            )+
        ]
    };
}

static CATALOG: &[AppDescriptor] = catalog! {
    "around" => "Around" @ "integrations:around_video",
    "daily-video" => "Cal Video" @ "integrations:daily",
    "google-calendar" => "Google Calendar",
    "google-meet" => "Google Meet" @ "integrations:google:meet",
    "huddle01" => "Huddle01" @ "integrations:huddle01",
    "jitsi" => "Jitsi Video" @ "integrations:jitsi",
    "msteams" => "Microsoft Teams" @ "integrations:office365_video",
    "stripe" => "Stripe",
    "tandem" => "Tandem Video" @ "integrations:tandem",
    "whereby" => "Whereby" @ "integrations:whereby_video",
    "zoom" => "Zoom Video" @ "integrations:zoom",
};

/// Look up an app by it's slug
pub fn find(slug: &str) -> Option<&'static AppDescriptor> {
    CATALOG.iter().find(|app| app.slug == slug)
}

/// Resolve the apps a user has installed from their credentials
///
/// Credentials the provider rejected and apps missing from the catalog are skipped. Each app
/// appears at most once, in the order it was first installed.
pub fn installed(credentials: &[Credential]) -> Vec<&'static AppDescriptor> {
    let mut apps: Vec<&'static AppDescriptor> = Vec::with_capacity(credentials.len());

    for credential in credentials.iter().filter(|c| !c.invalid) {
        let Some(app) = find(&credential.app_slug) else {
            continue;
        };
        if !apps.iter().any(|a| a.slug == app.slug) {
            apps.push(app);
        }
    }

    apps
}

#[cfg(test)]
mod tests {
    use super::{find, installed};
    use crate::testing::credential;

    #[test]
    fn conferencing_apps_carry_a_location() {
        let zoom = find("zoom").unwrap();
        assert_eq!(zoom.location_option.as_ref().unwrap().value, "integrations:zoom");

        let stripe = find("stripe").unwrap();
        assert!(stripe.location_option.is_none());

        assert!(find("not-an-app").is_none());
    }

    #[test]
    fn installed_skips_invalid_unknown_and_duplicate_credentials() {
        let mut broken = credential(3, 1, "whereby");
        broken.invalid = true;

        let credentials = vec![
            credential(1, 1, "zoom"),
            credential(2, 1, "unlisted"),
            broken,
            credential(4, 1, "zoom"),
            credential(5, 1, "stripe"),
        ];

        let slugs = installed(&credentials)
            .into_iter()
            .map(|app| app.slug)
            .collect::<Vec<_>>();
        assert_eq!(slugs, vec!["zoom", "stripe"]);
    }
}
