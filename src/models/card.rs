use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ImageUris / CardFace — nested API record fragments
// ---------------------------------------------------------------------------

/// Image URLs attached to a card or a single card face.
///
/// The API emits several resolutions; only the ones the checklist renders
/// are modeled. Unknown resolutions are ignored during deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageUris {
    pub small: Option<String>,
    pub normal: Option<String>,
    pub large: Option<String>,
}

impl ImageUris {
    /// The preferred renderable URL, if any resolution is present.
    pub fn best(&self) -> Option<&str> {
        self.normal
            .as_deref()
            .or(self.large.as_deref())
            .or(self.small.as_deref())
    }
}

/// One face of a multi-faced card. Faces may carry their own images
/// (double-faced layouts) or none (split/adventure layouts, where the
/// parent record holds the image).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardFace {
    pub name: Option<String>,
    pub image_uris: Option<ImageUris>,
}

// ---------------------------------------------------------------------------
// ApiCard — raw record as returned by the card-search API
// ---------------------------------------------------------------------------

/// A raw card record from the search API. Fields beyond what the
/// reconciliation pipeline consumes are dropped at the serde boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiCard {
    /// Stable unique identity supplied by the API.
    pub id: String,
    pub name: String,
    /// Set-code attribution. Fuzzy text queries can match cards from other
    /// sets, so this field is checked against the requested set on every
    /// fetch path.
    #[serde(default)]
    pub set: String,
    /// Collector number as printed — a string, possibly suffixed
    /// (`"363★"`, `"12a"`) or entirely non-numeric.
    #[serde(default)]
    pub collector_number: String,
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
    #[serde(default)]
    pub card_faces: Option<Vec<CardFace>>,
}

impl ApiCard {
    /// True iff the record exposes a usable image, either directly or via
    /// its first face. Records failing this are not displayable in a
    /// checklist and are filtered out everywhere.
    pub fn is_displayable(&self) -> bool {
        if self.image_uris.as_ref().and_then(|u| u.best()).is_some() {
            return true;
        }
        self.card_faces
            .as_deref()
            .and_then(|faces| faces.first())
            .and_then(|face| face.image_uris.as_ref())
            .and_then(|u| u.best())
            .is_some()
    }

    /// Parse the collector number as an integer.
    ///
    /// Leading decimal digits are taken (`"363★"` → 363, `"12a"` → 12); a
    /// value with no leading digits yields 0, which sorts first. Multiple
    /// malformed records therefore collide at key 0 rather than erroring.
    pub fn collector_number_value(&self) -> u32 {
        let digits: String = self
            .collector_number
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        match digits.parse() {
            Ok(n) => n,
            Err(_) => {
                log::debug!(
                    "unparseable collector number {:?} on card {} -- sorting at 0",
                    self.collector_number,
                    self.id
                );
                0
            }
        }
    }

    /// The record's stable identity string.
    pub fn identity(&self) -> &str {
        &self.id
    }

    /// All renderable image URLs, front face first.
    fn images(&self) -> Vec<String> {
        let mut urls = Vec::new();
        if let Some(url) = self.image_uris.as_ref().and_then(|u| u.best()) {
            urls.push(url.to_string());
        }
        for face in self.card_faces.as_deref().unwrap_or_default() {
            if let Some(url) = face.image_uris.as_ref().and_then(|u| u.best()) {
                urls.push(url.to_string());
            }
        }
        urls
    }

    /// Lower the raw record into a reconciled [`Card`].
    pub fn to_card(&self) -> Card {
        Card {
            identity: self.id.clone(),
            name: self.name.clone(),
            set_code: self.set.to_lowercase(),
            collector_number: self.collector_number_value(),
            images: self.images(),
            placeholder: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Card — reconciled record
// ---------------------------------------------------------------------------

/// One entry of a reconciled set list.
///
/// Within one list, identities are unique; collector numbers are not
/// (the API legitimately emits multiple prints sharing a number).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub identity: String,
    pub name: String,
    pub set_code: String,
    pub collector_number: u32,
    /// Empty for placeholders.
    pub images: Vec<String>,
    pub placeholder: bool,
}

impl Card {
    /// Synthesize a zero-image stand-in for a collector number no query
    /// could resolve. The identity is deterministic so repeated injection
    /// is stable across sessions.
    pub fn placeholder(set_code: &str, number: u32, name: &str) -> Card {
        Card {
            identity: format!("placeholder:{}:{}", set_code, number),
            name: name.to_string(),
            set_code: set_code.to_string(),
            collector_number: number,
            images: Vec::new(),
            placeholder: true,
        }
    }
}
