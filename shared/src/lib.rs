use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One catalog entry for an individual red panda.
///
/// Every field is free text straight out of the exhibit roster sheet; any of
/// them may be empty. Dates are kept in their display form (`yyyy/mm/dd`).
/// `age` is derived at load time from the birth and death dates, never taken
/// from the sheet. The collection is rebuilt wholesale on every load, so a
/// record is immutable once constructed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedPanda {
    pub name: String,
    pub gender: String,
    pub birth_date: String,
    pub death_date: String,
    pub age: String,
    pub moved_out_date: String,
    pub moved_out_zoo: String,
    pub arrival_date: String,
    pub origin_zoo: String,
    pub father: String,
    pub mother: String,
    pub pair1: String,
    pub pair2: String,
    pub pair3: String,
    pub personality: String,
    pub feature: String,
}

impl RedPanda {
    /// Still at the park: neither a death date nor a transfer-out date is
    /// recorded. Whitespace-only dates count as blank.
    pub fn is_in_park(&self) -> bool {
        self.death_date.trim().is_empty() && self.moved_out_date.trim().is_empty()
    }
}

/// Card view-model: a record paired with its resolved thumbnail URL.
/// Built per request, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PandaCard {
    pub panda: RedPanda,
    pub thumb_url: String,
}

/// View data for the card catalog page: both partitions searched, sorted and
/// paginated independently, each with its own totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogPage {
    pub q: Option<String>,
    pub page: u32,
    pub size: u32,
    pub in_park_total: usize,
    pub in_park_total_pages: u32,
    pub in_park_cards: Vec<PandaCard>,
    pub past_total: usize,
    pub past_total_pages: u32,
    pub past_cards: Vec<PandaCard>,
}

/// A visitor diary post. `id` and `created_at` are assigned by the store on
/// creation; `created_at` is immutable afterwards and is the only ordering
/// key for listings. `panda_name` references a catalog record by name only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryPost {
    pub id: i64,
    pub panda_name: String,
    pub comment: String,
    pub image_filename: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One page of diary posts, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryPage {
    pub posts: Vec<DiaryPost>,
    pub page: u32,
    pub size: u32,
    pub total: i64,
    pub total_pages: u32,
}

/// View data for one animal's detail page: the record, its confirmed image
/// URLs (or the placeholder), and its diary posts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PandaDetail {
    pub panda: RedPanda,
    pub images: Vec<String>,
    pub posts: DiaryPage,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panda(death_date: &str, moved_out_date: &str) -> RedPanda {
        RedPanda {
            name: "テスト".to_string(),
            death_date: death_date.to_string(),
            moved_out_date: moved_out_date.to_string(),
            ..RedPanda::default()
        }
    }

    #[test]
    fn test_in_park_when_both_dates_blank() {
        assert!(panda("", "").is_in_park());
        assert!(panda("  ", "").is_in_park());
    }

    #[test]
    fn test_not_in_park_with_death_date() {
        assert!(!panda("2022/05/01", "").is_in_park());
    }

    #[test]
    fn test_not_in_park_with_moved_out_date() {
        assert!(!panda("", "2021/03/15").is_in_park());
    }

    #[test]
    fn test_not_in_park_with_both_dates() {
        assert!(!panda("2022/05/01", "2021/03/15").is_in_park());
    }
}
