use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Job titles a club member can hold. Parsing and [`JobTitle::as_str`] use the wire name only;
/// [`fmt::Display`] shows the label.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JobTitle {
    #[default]
    Coach,
    FootballPlayer,
    TechnicalStaff,
    PhysicalTrainer,
}

impl JobTitle {
    /// Name used on the wire
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobTitle::Coach => "Coach",
            JobTitle::FootballPlayer => "Football Player",
            JobTitle::TechnicalStaff => "Technical Staff",
            JobTitle::PhysicalTrainer => "Physical Trainer",
        }
    }

    /// Parse a title as stored on the server. Missing or unknown values fall back to
    /// [`JobTitle::Coach`].
    pub fn from_wire(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for JobTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a free-text field should be edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Email,
    Number,
}

/// The free-text fields of a profile, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    Prenom,
    Nom,
    Email,
    Pays,
    Ville,
    Telephone,
}

impl Field {
    pub fn label(&self) -> &'static str {
        match self {
            Field::Prenom => "First Name",
            Field::Nom => "Last Name",
            Field::Email => "Email",
            Field::Pays => "Country",
            Field::Ville => "City",
            Field::Telephone => "Phone",
        }
    }

    pub fn kind(&self) -> InputKind {
        match self {
            Field::Email => InputKind::Email,
            Field::Telephone => InputKind::Number,
            _ => InputKind::Text,
        }
    }

    /// Whether `value` may be typed into this field at all.
    pub fn accepts(&self, value: &str) -> bool {
        self.rejected_chars(value) == 0
    }

    /// Whether typing turned `current` into `value`. A stored value that the filter would
    /// refuse can still be edited as long as the edit adds no refused characters.
    pub fn accepts_edit(&self, current: &str, value: &str) -> bool {
        let rejected = self.rejected_chars(value);
        rejected == 0 || rejected <= self.rejected_chars(current)
    }

    fn rejected_chars(&self, value: &str) -> usize {
        match self.kind() {
            InputKind::Number => {
                let digits = value.strip_prefix('+').unwrap_or(value);
                digits
                    .chars()
                    .filter(|c| !c.is_ascii_digit() && *c != ' ')
                    .count()
            }
            InputKind::Text | InputKind::Email => 0,
        }
    }
}

/// Returns true if `value` looks like `local@domain`.
pub fn is_valid_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !value.chars().any(char::is_whitespace)
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// A server-acknowledged avatar reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    pub id: Option<u64>,
}

/// Editable view of a profile record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileData {
    pub document_id: String,
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub pays: String,
    pub ville: String,
    pub telephone: String,
    pub titre_emploi: JobTitle,
    /// The committed avatar. A local preview never lands here.
    pub image: Option<ImageRef>,
    pub status: String,
}

impl ProfileData {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Prenom => &self.prenom,
            Field::Nom => &self.nom,
            Field::Email => &self.email,
            Field::Pays => &self.pays,
            Field::Ville => &self.ville,
            Field::Telephone => &self.telephone,
        }
    }

    pub(crate) fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Prenom => &mut self.prenom,
            Field::Nom => &mut self.nom,
            Field::Email => &mut self.email,
            Field::Pays => &mut self.pays,
            Field::Ville => &mut self.ville,
            Field::Telephone => &mut self.telephone,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.prenom, self.nom)
    }

    pub fn location(&self) -> String {
        format!("{}, {}", self.ville, self.pays)
    }

    /// First letter of the first name followed by the first letter of the last name.
    pub fn initials(&self) -> String {
        self.prenom
            .chars()
            .next()
            .into_iter()
            .chain(self.nom.chars().next())
            .collect()
    }

    /// The subset of fields sent back to the server on save.
    pub fn update_payload(&self) -> UpdatePayload {
        UpdatePayload {
            nom: self.nom.clone(),
            prenom: self.prenom.clone(),
            email: self.email.clone(),
            pays: self.pays.clone(),
            ville: self.ville.clone(),
            titre_emploi: self.titre_emploi,
            telephone: self.telephone.clone(),
            image: self.image.as_ref().and_then(|i| i.id),
        }
    }
}

impl From<&UserRecord> for ProfileData {
    fn from(record: &UserRecord) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();

        Self {
            document_id: text(&record.document_id),
            nom: text(&record.nom),
            prenom: text(&record.prenom),
            email: text(&record.email),
            pays: text(&record.pays),
            ville: text(&record.ville),
            telephone: text(&record.telephone),
            titre_emploi: JobTitle::from_wire(record.titre_emploi.as_deref()),
            image: record.image.as_ref().map(|image| ImageRef {
                url: image.url.clone().unwrap_or_default(),
                id: image.id(),
            }),
            status: text(&record.statut),
        }
    }
}

/// A profile record as the server returns it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "documentId", default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub nom: Option<String>,
    #[serde(default)]
    pub prenom: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub pays: Option<String>,
    #[serde(default)]
    pub ville: Option<String>,
    #[serde(default)]
    pub titre_emploi: Option<String>,
    #[serde(default)]
    pub telephone: Option<String>,
    #[serde(default)]
    pub statut: Option<String>,
    #[serde(default)]
    pub image: Option<ImageRelation>,
}

/// The populated `image` relation of a [`UserRecord`]. Depending on how the relation was
/// populated the id sits either on the relation itself or under `data`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRelation {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub data: Option<RelationData>,
}

impl ImageRelation {
    pub fn id(&self) -> Option<u64> {
        self.id.or(self.data.as_ref().map(|d| d.id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationData {
    pub id: u64,
}

/// Fields sent with `PUT utilisateurs/{documentId}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdatePayload {
    pub nom: String,
    pub prenom: String,
    pub email: String,
    pub pays: String,
    pub ville: String,
    pub titre_emploi: JobTitle,
    pub telephone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<u64>,
}

/// One entry of the `POST upload` response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadedFile {
    pub id: u64,
    pub url: String,
}

#[cfg(test)]
mod test {
    use serde_json::json;
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_job_title_wire_names() {
        for title in JobTitle::iter() {
            assert_eq!(JobTitle::from_wire(Some(title.as_str())), title);
            assert_eq!(
                serde_json::to_value(title).unwrap(),
                json!(title.as_str())
            );
        }
        assert_eq!(JobTitle::FootballPlayer.to_string(), "Football Player");
        assert_eq!(JobTitle::PhysicalTrainer.as_str(), "physical_trainer");
    }

    #[test]
    fn test_job_title_fallback() {
        assert_eq!(JobTitle::from_wire(None), JobTitle::Coach);
        assert_eq!(JobTitle::from_wire(Some("")), JobTitle::Coach);
        assert_eq!(JobTitle::from_wire(Some("referee")), JobTitle::Coach);
        // Display labels are not wire names
        assert_eq!(JobTitle::from_wire(Some("Technical Staff")), JobTitle::Coach);
        assert!("Football Player".parse::<JobTitle>().is_err());
    }

    #[test]
    fn test_field_order_and_parse() {
        let labels: Vec<_> = Field::iter().map(|f| f.label()).collect();
        assert_eq!(
            labels,
            ["First Name", "Last Name", "Email", "Country", "City", "Phone"]
        );
        assert_eq!("telephone".parse::<Field>().unwrap(), Field::Telephone);
        assert!("status".parse::<Field>().is_err());
    }

    #[test]
    fn test_phone_accepts() {
        assert!(Field::Telephone.accepts(""));
        assert!(Field::Telephone.accepts("+33 6 12 34 56 78"));
        assert!(!Field::Telephone.accepts("06-12"));
        assert!(!Field::Telephone.accepts("12+3"));
        assert!(Field::Nom.accepts("anything-goes"));
    }

    #[test]
    fn test_phone_edit_from_refused_value() {
        let field = Field::Telephone;

        assert!(field.accepts_edit("06-12-34-56", "06-12-34-567"));
        assert!(field.accepts_edit("06-12-34-56", "0612-34-56"));
        assert!(!field.accepts_edit("06-12-34-56", "06-12-34-56x"));
        assert!(!field.accepts_edit("0612", "0612-"));
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("jane@club.fr"));
        assert!(!is_valid_email("jane"));
        assert!(!is_valid_email("@club.fr"));
        assert!(!is_valid_email("jane@"));
        assert!(!is_valid_email("jane doe@club.fr"));
        assert!(!is_valid_email("jane@a@b"));
    }

    #[test]
    fn test_record_mapping() {
        let record: UserRecord = serde_json::from_value(json!({
            "documentId": "abc123",
            "nom": "Doe",
            "prenom": "Jane",
            "email": null,
            "titre_emploi": "technical_staff",
            "statut": "active",
            "image": { "url": "/uploads/jane.png", "data": { "id": 7 } }
        }))
        .unwrap();

        let profile = ProfileData::from(&record);

        assert_eq!(profile.document_id, "abc123");
        assert_eq!(profile.email, "");
        assert_eq!(profile.telephone, "");
        assert_eq!(profile.titre_emploi, JobTitle::TechnicalStaff);
        assert_eq!(profile.status, "active");
        assert_eq!(
            profile.image,
            Some(ImageRef {
                url: "/uploads/jane.png".into(),
                id: Some(7)
            })
        );
        assert_eq!(profile.initials(), "JD");
        assert_eq!(profile.full_name(), "Jane Doe");
    }

    #[test]
    fn test_image_relation_direct_id() {
        let record: UserRecord = serde_json::from_value(json!({
            "image": { "id": 3, "url": "/uploads/x.png" }
        }))
        .unwrap();

        assert_eq!(ProfileData::from(&record).image.unwrap().id, Some(3));
    }

    #[test]
    fn test_payload_omits_missing_image() {
        let profile = ProfileData {
            nom: "Doe".into(),
            titre_emploi: JobTitle::PhysicalTrainer,
            ..ProfileData::default()
        };

        let value = serde_json::to_value(profile.update_payload()).unwrap();

        assert_eq!(value["titre_emploi"], json!("physical_trainer"));
        assert!(value.get("image").is_none());
        assert!(value.get("status").is_none());
    }

    #[test]
    fn test_initials_with_empty_names() {
        assert_eq!(ProfileData::default().initials(), "");
        let profile = ProfileData {
            nom: "Doe".into(),
            ..ProfileData::default()
        };
        assert_eq!(profile.initials(), "D");
    }
}
