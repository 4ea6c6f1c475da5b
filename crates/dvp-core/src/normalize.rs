//! The in-memory normalization pass.
//!
//! [`Normalized::build`] reads cleaned rows once and produces every dimension
//! and junction list the store needs. Ids assigned here for People and
//! additional requests are provisional: the store replaces them with the ids
//! it assigns on insert before any dependent junction row is written.

use std::{
  borrow::Borrow,
  collections::{HashMap, HashSet},
  hash::Hash,
};

use crate::{
  person::PersonKey,
  policy::ParcelIndex,
  record::{PetitionRecord, Role},
  tokens::{normalize_result, split_list},
};

// ─── Dimension ───────────────────────────────────────────────────────────────

/// A deduplicated lookup table with 1-based surrogate ids in first-seen order.
#[derive(Debug, Clone)]
pub struct Dimension<K> {
  ids:     HashMap<K, i64>,
  entries: Vec<(i64, K)>,
}

impl<K> Default for Dimension<K> {
  fn default() -> Self {
    Self {
      ids:     HashMap::new(),
      entries: Vec::new(),
    }
  }
}

impl<K: Clone + Eq + Hash> Dimension<K> {
  /// Return the id of `value`, registering it if it is new.
  pub fn intern(&mut self, value: K) -> i64 {
    if let Some(&id) = self.ids.get(&value) {
      return id;
    }
    let id = self.entries.len() as i64 + 1;
    self.ids.insert(value.clone(), id);
    self.entries.push((id, value));
    id
  }

  pub fn id<Q>(&self, value: &Q) -> Option<i64>
  where
    K: Borrow<Q>,
    Q: Eq + Hash + ?Sized,
  {
    self.ids.get(value).copied()
  }

  /// `(id, value)` pairs in id order.
  pub fn entries(&self) -> &[(i64, K)] { &self.entries }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

// ─── Table rows ──────────────────────────────────────────────────────────────

/// A `Petitions` row before its additional-request id is resolved.
#[derive(Debug, Clone)]
pub struct Petition {
  pub petition_id: i64,
  pub record:      PetitionRecord,
}

/// A distinct `(end_court, county, state)` triple. Not surrogate-keyed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Court {
  pub court:  Option<String>,
  pub county: String,
  pub state:  String,
}

/// A petition's petitioner or defendant, linked by identity rather than by id.
#[derive(Debug, Clone)]
pub struct PersonLink {
  pub petition_id: i64,
  pub person:      PersonKey,
}

/// A single stored outcome of a petition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
  pub petition_id: i64,
  pub result:      String,
}

// ─── Normalized batch ────────────────────────────────────────────────────────

/// Every table of a load, built from the rows of one input file.
#[derive(Debug, Clone, Default)]
pub struct Normalized {
  pub petitions:                 Vec<Petition>,
  pub parcels:                   ParcelIndex,
  pub reasoning:                 Dimension<String>,
  /// `(petition_id, reasoning_id)`.
  pub petition_reasoning:        Vec<(i64, i64)>,
  pub archives:                  Dimension<String>,
  pub courts:                    Vec<Court>,
  /// Provisional People ids; the store re-keys these on insert.
  pub people:                    Dimension<PersonKey>,
  pub person_links:              Vec<PersonLink>,
  /// Whole comma-joined request strings under provisional ids.
  pub additional_requests:       Dimension<String>,
  /// `(provisional_id, token)` for each request string split on commas.
  pub additional_request_splits: Vec<(i64, String)>,
  pub outcomes:                  Vec<Outcome>,
}

impl Normalized {
  pub fn build(records: Vec<PetitionRecord>) -> Self {
    let mut out = Normalized::default();

    // Reasoning ids are assigned in a first pass so the junction below only
    // ever refers to known terms.
    for record in &records {
      for term in split_list(&record.reasoning) {
        out.reasoning.intern(term.to_owned());
      }
    }

    let mut seen_courts = HashSet::new();

    for (idx, record) in records.into_iter().enumerate() {
      let petition_id = idx as i64 + 1;
      out.parcels.insert(&record.parcel_number, petition_id);

      for term in split_list(&record.reasoning) {
        if let Some(reasoning_id) = out.reasoning.id(term) {
          out.petition_reasoning.push((petition_id, reasoning_id));
        }
      }

      for role in Role::ALL {
        if let Some(person) = PersonKey::for_role(&record, role) {
          out.people.intern(person.clone());
          out.person_links.push(PersonLink { petition_id, person });
        }
      }

      if !record.archive.is_empty() {
        out.archives.intern(record.archive.clone());
      }

      let court = Court {
        court:  record.end_court.clone(),
        county: record.county.clone(),
        state:  record.state.clone(),
      };
      if seen_courts.insert(court.clone()) {
        out.courts.push(court);
      }

      if let Some(requests) = &record.additional_requests {
        out.additional_requests.intern(requests.clone());
      }

      for token in split_list(&record.result) {
        out.outcomes.push(Outcome {
          petition_id,
          result: normalize_result(token),
        });
      }

      out.petitions.push(Petition {
        petition_id,
        record,
      });
    }

    out.additional_request_splits = out
      .additional_requests
      .entries()
      .iter()
      .flat_map(|(id, requests)| {
        split_list(requests).map(move |token| (*id, token.to_owned()))
      })
      .collect();

    for dup in out.parcels.duplicates() {
      tracing::warn!(
        parcel_number = %dup.parcel_number,
        replaced = dup.replaced,
        winner = dup.winner,
        "duplicate parcel number; index now points at the later row"
      );
    }

    out
  }
}
