//! # Fallback Catalog
//!
//! Hand-authored copy of every content type the site API serves. The resolver merges API
//! results over it, so pages never render empty while the API is unreachable or only
//! partially populated by admins.
//!
//! ## Data
//!
//! - `catalog.json`, embedded at compile time and parsed once on first access
//! - Shapes match the API field for field (see [`models`])
//! - Every identity key slugs to a non-empty value, unique within its collection and within
//!   each pillar's service details
//!
//! Bump `version` whenever the copy changes so logs show which snapshot a process served.
use std::sync::LazyLock;

use serde::Deserialize;

pub mod models;
pub mod slug;

use models::{Employee, Insight, Partner, Photo, Pillar, SystemStatus};

const CATALOG_JSON: &str = include_str!("../catalog.json");

static EMBEDDED: LazyLock<Catalog> =
    LazyLock::new(|| Catalog::from_json(CATALOG_JSON).expect("embedded catalog is valid"));

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub version: u32,
    pub pillars: Vec<Pillar>,
    pub insights: Vec<Insight>,
    pub partners: Vec<Partner>,
    #[serde(default)]
    pub photos: Vec<Photo>,
    #[serde(default)]
    pub employees: Vec<Employee>,
    pub status: SystemStatus,
}

impl Catalog {
    /// Snapshot compiled into the binary.
    pub fn embedded() -> &'static Catalog {
        &EMBEDDED
    }

    pub fn from_json(json: &str) -> Result<Catalog, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn pillar(&self, key: &str) -> Option<&Pillar> {
        let key = slug::slug(key);
        self.pillars.iter().find(|pillar| slug::slug(&pillar.title) == key)
    }
}
