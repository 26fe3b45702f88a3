//! # Reconciliation
//!
//! Merges API content over catalog content, matching items by the slug of their identity key.
//!
//! - Matched items take every non-empty field from the API and keep the catalog value for
//!   empty ones (blank text, `None`, empty list)
//! - Nested collections (service names, service details) merge recursively by their own slug
//! - Unmatched catalog items are kept as-is, in catalog order
//! - API items without a catalog counterpart are appended as-is, in API order; when several
//!   share a slug only the first is kept
//! - An empty API list leaves the catalog untouched, so a pillar with an empty placeholder
//!   record never loses its authored services
//!
//! The merge is idempotent: merging the result again with the same API list changes nothing.
use std::collections::{HashMap, HashSet};

use catalog::{
    models::{Employee, Insight, Partner, Photo, Pillar, ServiceDetail, SystemStatus},
    slug::slug,
};

/// Field-by-field merge rule for one content type.
pub trait Reconcile: Clone {
    /// Human title or name the slug is derived from.
    fn identity(&self) -> &str;

    /// `self` with every non-empty field of `remote` laid over it.
    fn overlay(&self, remote: &Self) -> Self;
}

pub fn merge<T: Reconcile>(fallback: &[T], remote: &[T]) -> Vec<T> {
    if remote.is_empty() {
        return fallback.to_vec();
    }

    let mut remote_by_key: HashMap<String, &T> = HashMap::with_capacity(remote.len());
    for item in remote {
        remote_by_key.entry(slug(item.identity())).or_insert(item);
    }

    let mut seen = HashSet::with_capacity(fallback.len() + remote.len());
    let mut merged = Vec::with_capacity(fallback.len() + remote.len());

    for item in fallback {
        let key = slug(item.identity());

        match remote_by_key.get(&key) {
            Some(remote_item) => merged.push(item.overlay(remote_item)),
            None => merged.push(item.clone()),
        }

        seen.insert(key);
    }

    // first remote item per key, same rule as the matches above
    merged.extend(
        remote
            .iter()
            .filter(|item| seen.insert(slug(item.identity())))
            .cloned(),
    );

    merged
}

fn text(fallback: &str, remote: &str) -> String {
    if remote.trim().is_empty() {
        fallback.to_string()
    } else {
        remote.to_string()
    }
}

fn optional(fallback: &Option<String>, remote: &Option<String>) -> Option<String> {
    match remote {
        Some(value) if !value.trim().is_empty() => Some(value.clone()),
        _ => fallback.clone(),
    }
}

fn items(fallback: &[String], remote: &[String]) -> Vec<String> {
    if remote.is_empty() {
        fallback.to_vec()
    } else {
        remote.to_vec()
    }
}

// service names inside a pillar
impl Reconcile for String {
    fn identity(&self) -> &str {
        self
    }

    fn overlay(&self, remote: &Self) -> Self {
        text(self, remote)
    }
}

impl Reconcile for Pillar {
    fn identity(&self) -> &str {
        &self.title
    }

    fn overlay(&self, remote: &Self) -> Self {
        Pillar {
            id: remote.id.or(self.id),
            title: text(&self.title, &remote.title),
            subtitle: text(&self.subtitle, &remote.subtitle),
            description: text(&self.description, &remote.description),
            color: text(&self.color, &remote.color),
            icon: text(&self.icon, &remote.icon),
            services: merge(&self.services, &remote.services),
            service_details: merge(&self.service_details, &remote.service_details),
        }
    }
}

impl Reconcile for ServiceDetail {
    fn identity(&self) -> &str {
        &self.name
    }

    fn overlay(&self, remote: &Self) -> Self {
        ServiceDetail {
            name: text(&self.name, &remote.name),
            description: text(&self.description, &remote.description),
            long_description: optional(&self.long_description, &remote.long_description),
            features: items(&self.features, &remote.features),
            benefits: items(&self.benefits, &remote.benefits),
            image: optional(&self.image, &remote.image),
        }
    }
}

impl Reconcile for Insight {
    fn identity(&self) -> &str {
        &self.title
    }

    fn overlay(&self, remote: &Self) -> Self {
        Insight {
            id: remote.id.or(self.id),
            title: text(&self.title, &remote.title),
            category: text(&self.category, &remote.category),
            date: text(&self.date, &remote.date),
            excerpt: text(&self.excerpt, &remote.excerpt),
            paragraphs: items(&self.paragraphs, &remote.paragraphs),
            image: optional(&self.image, &remote.image),
            link: text(&self.link, &remote.link),
        }
    }
}

impl Reconcile for Partner {
    fn identity(&self) -> &str {
        &self.name
    }

    fn overlay(&self, remote: &Self) -> Self {
        Partner {
            id: remote.id.or(self.id),
            name: text(&self.name, &remote.name),
            logo: optional(&self.logo, &remote.logo),
            category: text(&self.category, &remote.category),
        }
    }
}

impl Reconcile for Photo {
    fn identity(&self) -> &str {
        &self.title
    }

    fn overlay(&self, remote: &Self) -> Self {
        Photo {
            id: remote.id.or(self.id),
            title: text(&self.title, &remote.title),
            url: text(&self.url, &remote.url),
            category: text(&self.category, &remote.category),
        }
    }
}

impl Reconcile for Employee {
    fn identity(&self) -> &str {
        &self.name
    }

    fn overlay(&self, remote: &Self) -> Self {
        Employee {
            id: remote.id.or(self.id),
            name: text(&self.name, &remote.name),
            role: text(&self.role, &remote.role),
            bio: text(&self.bio, &remote.bio),
            image: text(&self.image, &remote.image),
            achievement: text(&self.achievement, &remote.achievement),
            speciality: text(&self.speciality, &remote.speciality),
            email: text(&self.email, &remote.email),
            linkedin: text(&self.linkedin, &remote.linkedin),
        }
    }
}

impl Reconcile for SystemStatus {
    fn identity(&self) -> &str {
        &self.status
    }

    fn overlay(&self, remote: &Self) -> Self {
        SystemStatus {
            status: text(&self.status, &remote.status),
            message: optional(&self.message, &remote.message),
        }
    }
}
