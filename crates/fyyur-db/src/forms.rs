//! Typed form records accepted by the mutation service.
//!
//! Each entity has exactly one mapping from its form into an `ActiveModel`,
//! so a renamed field breaks the build instead of silently dropping data.
//! Genres travel separately since they live in their own table.

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{artist, show, venue};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueForm {
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub image_link: Option<String>,
    #[serde(default)]
    pub facebook_link: Option<String>,
    #[serde(default)]
    pub website_link: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub seeking_talent: bool,
    #[serde(default)]
    pub seeking_description: Option<String>,
}

impl VenueForm {
    /// Every mutable column is `Set`, so an update is a full replace.
    pub fn into_active_model(self, id: Uuid) -> (venue::ActiveModel, Vec<String>) {
        let model = venue::ActiveModel {
            id: Set(id),
            name: Set(self.name),
            city: Set(self.city),
            state: Set(self.state),
            address: Set(self.address),
            phone: Set(self.phone),
            image_link: Set(self.image_link),
            facebook_link: Set(self.facebook_link),
            website_link: Set(self.website_link),
            seeking_talent: Set(self.seeking_talent),
            seeking_description: Set(self.seeking_description),
        };
        (model, self.genres)
    }

    pub fn from_model(v: venue::Model, genres: Vec<String>) -> Self {
        Self {
            name: v.name,
            city: v.city,
            state: v.state,
            address: v.address,
            phone: v.phone,
            image_link: v.image_link,
            facebook_link: v.facebook_link,
            website_link: v.website_link,
            genres,
            seeking_talent: v.seeking_talent,
            seeking_description: v.seeking_description,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistForm {
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub image_link: Option<String>,
    #[serde(default)]
    pub facebook_link: Option<String>,
    #[serde(default)]
    pub website_link: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub seeking_venue: bool,
    #[serde(default)]
    pub seeking_description: Option<String>,
}

impl ArtistForm {
    pub fn into_active_model(self, id: Uuid) -> (artist::ActiveModel, Vec<String>) {
        let model = artist::ActiveModel {
            id: Set(id),
            name: Set(self.name),
            city: Set(self.city),
            state: Set(self.state),
            phone: Set(self.phone),
            image_link: Set(self.image_link),
            facebook_link: Set(self.facebook_link),
            website_link: Set(self.website_link),
            seeking_venue: Set(self.seeking_venue),
            seeking_description: Set(self.seeking_description),
        };
        (model, self.genres)
    }

    pub fn from_model(a: artist::Model, genres: Vec<String>) -> Self {
        Self {
            name: a.name,
            city: a.city,
            state: a.state,
            phone: a.phone,
            image_link: a.image_link,
            facebook_link: a.facebook_link,
            website_link: a.website_link,
            genres,
            seeking_venue: a.seeking_venue,
            seeking_description: a.seeking_description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowForm {
    pub artist_id: Uuid,
    pub venue_id: Uuid,
    pub start_time: DateTime<FixedOffset>,
}

impl ShowForm {
    /// Start times are stored in UTC so text-backed stores order them correctly.
    pub fn into_active_model(self, id: Uuid) -> show::ActiveModel {
        show::ActiveModel {
            id: Set(id),
            start_time: Set(self.start_time.with_timezone(&Utc).fixed_offset()),
            artist_id: Set(self.artist_id),
            venue_id: Set(self.venue_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue;

    #[test]
    fn test_venue_form_defaults() {
        let json = r#"{"name": "The Dueling Pianos Bar"}"#;
        let form: VenueForm = serde_json::from_str(json).unwrap();
        assert_eq!(form.name, "The Dueling Pianos Bar");
        assert!(form.genres.is_empty());
        assert!(!form.seeking_talent);
        assert!(form.city.is_none());
    }

    #[test]
    fn test_artist_form_full() {
        let json = r#"{
            "name": "Guns N Petals",
            "city": "San Francisco",
            "state": "CA",
            "genres": ["Rock n Roll"],
            "seeking_venue": true,
            "seeking_description": "Looking for shows to perform at in the San Francisco Bay Area!"
        }"#;
        let form: ArtistForm = serde_json::from_str(json).unwrap();
        assert_eq!(form.genres, vec!["Rock n Roll".to_string()]);
        assert!(form.seeking_venue);
        assert_eq!(form.state.as_deref(), Some("CA"));
    }

    #[test]
    fn test_venue_mapping_sets_every_column() {
        let id = Uuid::new_v4();
        let form = VenueForm {
            name: "Park Square Live Music & Coffee".into(),
            city: Some("San Francisco".into()),
            genres: vec!["Jazz".into(), "Folk".into()],
            ..Default::default()
        };
        let (model, genres) = form.into_active_model(id);
        assert_eq!(model.id, ActiveValue::Set(id));
        assert_eq!(model.address, ActiveValue::Set(None));
        assert_eq!(model.seeking_talent, ActiveValue::Set(false));
        assert_eq!(genres, vec!["Jazz".to_string(), "Folk".to_string()]);
    }

    #[test]
    fn test_venue_form_round_trips_through_model() {
        let form = VenueForm {
            name: "The Musical Hop".into(),
            city: Some("San Francisco".into()),
            state: Some("CA".into()),
            seeking_talent: true,
            genres: vec!["Jazz".into()],
            ..Default::default()
        };
        let id = Uuid::new_v4();
        let model = venue::Model {
            id,
            name: form.name.clone(),
            city: form.city.clone(),
            state: form.state.clone(),
            address: None,
            phone: None,
            image_link: None,
            facebook_link: None,
            website_link: None,
            seeking_talent: true,
            seeking_description: None,
        };
        assert_eq!(VenueForm::from_model(model, vec!["Jazz".into()]), form);
    }

    #[test]
    fn test_show_start_time_normalized_to_utc() {
        let form: ShowForm = serde_json::from_str(&format!(
            r#"{{"artist_id": "{}", "venue_id": "{}", "start_time": "2035-04-01T20:00:00-07:00"}}"#,
            Uuid::new_v4(),
            Uuid::new_v4()
        ))
        .unwrap();
        let model = form.into_active_model(Uuid::new_v4());
        match model.start_time {
            ActiveValue::Set(t) => {
                assert_eq!(t.offset().local_minus_utc(), 0);
                assert_eq!(t.to_rfc3339(), "2035-04-02T03:00:00+00:00");
            }
            other => panic!("start_time not set: {other:?}"),
        }
    }
}
