use serde::{Deserialize, Serialize};

use crate::item::{Item, ItemCategory, ItemCondition};

/// Upper bound on page size so a single request cannot drain the
/// whole catalog.
pub const MAX_PAGE_SIZE: usize = 100;
pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const FEATURED_COUNT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    Price,
    PriceDesc,
    Rating,
}

/// Conjunctive filter set over active items. Absent fields impose no
/// constraint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    pub query: Option<String>,
    pub category: Option<ItemCategory>,
    pub condition: Option<ItemCondition>,
    pub city: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl SearchFilters {
    /// Inactive items never match, regardless of the other filters.
    pub fn matches(&self, item: &Item) -> bool {
        if !item.is_active {
            return false;
        }
        if let Some(q) = &self.query {
            let q = q.to_lowercase();
            if !item.title.to_lowercase().contains(&q)
                && !item.description.to_lowercase().contains(&q)
            {
                return false;
            }
        }
        if let Some(category) = self.category {
            if item.category != category {
                return false;
            }
        }
        if let Some(condition) = self.condition {
            if item.condition != condition {
                return false;
            }
        }
        if let Some(city) = &self.city {
            if !item.location.city.to_lowercase().contains(&city.to_lowercase()) {
                return false;
            }
        }
        if let Some(min) = self.min_price {
            if item.pricing.daily < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if item.pricing.daily > max {
                return false;
            }
        }
        true
    }
}

pub fn sort_items(items: &mut [Item], key: SortKey) {
    match key {
        SortKey::Newest => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::Oldest => items.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortKey::Price => items.sort_by(|a, b| a.pricing.daily.total_cmp(&b.pricing.daily)),
        SortKey::PriceDesc => items.sort_by(|a, b| b.pricing.daily.total_cmp(&a.pricing.daily)),
        SortKey::Rating => {
            items.sort_by(|a, b| b.ratings.average.total_cmp(&a.ratings.average))
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page {
    pub items: Vec<Item>,
    pub pagination: Pagination,
}

/// Classic offset pagination. Page is floored to 1 and limit clamped
/// to [1, MAX_PAGE_SIZE].
pub fn paginate(items: Vec<Item>, page: usize, limit: usize) -> Page {
    let page = page.max(1);
    let limit = limit.clamp(1, MAX_PAGE_SIZE);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(limit);
    // Saturating math: `page` comes straight off the query string, so
    // huge values must land on an empty page, not overflow.
    let start = (page - 1).saturating_mul(limit);
    let end = start.saturating_add(limit).min(total_items);

    let slice = if start < total_items {
        items[start..end].to_vec()
    } else {
        Vec::new()
    };

    Page {
        items: slice,
        pagination: Pagination {
            current_page: page,
            total_pages,
            total_items,
            has_next: start.saturating_add(limit) < total_items,
            has_prev: page > 1,
        },
    }
}

/// Top-N view over active items that have at least one rating, ranked
/// by rating average descending.
pub fn featured_items(items: Vec<Item>) -> Vec<Item> {
    let mut rated: Vec<Item> = items
        .into_iter()
        .filter(|i| i.is_active && i.ratings.count > 0)
        .collect();
    rated.sort_by(|a, b| b.ratings.average.total_cmp(&a.ratings.average));
    rated.truncate(FEATURED_COUNT);
    rated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Availability, ItemLocation, Policies, Pricing, Ratings};
    use crate::user::Coordinates;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn item(title: &str, daily: f64, city: &str, age_days: i64) -> Item {
        let created = Utc::now() - Duration::days(age_days);
        Item {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: title.to_string(),
            description: format!("{title} in good shape"),
            category: ItemCategory::Tools,
            sub_category: None,
            images: vec![],
            condition: ItemCondition::Good,
            pricing: Pricing {
                hourly: None,
                daily,
                weekly: None,
                monthly: None,
                security_deposit: 50.0,
            },
            availability: Availability::default(),
            location: ItemLocation {
                city: city.to_string(),
                state: "TX".to_string(),
                address: None,
                coordinates: Coordinates { lat: 0.0, lng: 0.0 },
            },
            specifications: None,
            policies: Policies::default(),
            ratings: Ratings::default(),
            created_at: created,
            updated_at: created,
            is_active: true,
        }
    }

    #[test]
    fn test_inactive_items_never_match() {
        let mut i = item("Hammer", 10.0, "Austin", 0);
        i.is_active = false;
        assert!(!SearchFilters::default().matches(&i));
    }

    #[test]
    fn test_query_matches_title_and_description_case_insensitive() {
        let i = item("Pressure Washer", 40.0, "Austin", 0);
        let by_title = SearchFilters { query: Some("WASHER".to_string()), ..Default::default() };
        let by_desc = SearchFilters { query: Some("good shape".to_string()), ..Default::default() };
        let miss = SearchFilters { query: Some("kayak".to_string()), ..Default::default() };
        assert!(by_title.matches(&i));
        assert!(by_desc.matches(&i));
        assert!(!miss.matches(&i));
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let i = item("Projector", 800.0, "Austin", 0);
        let inside = SearchFilters { min_price: Some(500.0), max_price: Some(1000.0), ..Default::default() };
        let boundary = SearchFilters { min_price: Some(800.0), max_price: Some(800.0), ..Default::default() };
        let below = SearchFilters { min_price: Some(900.0), ..Default::default() };
        assert!(inside.matches(&i));
        assert!(boundary.matches(&i));
        assert!(!below.matches(&i));
    }

    #[test]
    fn test_city_substring_match() {
        let i = item("Tent", 15.0, "San Antonio", 0);
        let f = SearchFilters { city: Some("antonio".to_string()), ..Default::default() };
        assert!(f.matches(&i));
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let i = item("Drill", 20.0, "Austin", 0);
        let f = SearchFilters {
            query: Some("drill".to_string()),
            min_price: Some(30.0),
            ..Default::default()
        };
        assert!(!f.matches(&i));
    }

    #[test]
    fn test_sort_price_and_rating() {
        let mut items = vec![item("A", 30.0, "x", 3), item("B", 10.0, "x", 2), item("C", 20.0, "x", 1)];
        items[0].ratings = Ratings { average: 3.5, count: 4 };
        items[1].ratings = Ratings { average: 4.8, count: 9 };
        items[2].ratings = Ratings { average: 4.1, count: 2 };

        sort_items(&mut items, SortKey::Price);
        let dailies: Vec<f64> = items.iter().map(|i| i.pricing.daily).collect();
        assert_eq!(dailies, vec![10.0, 20.0, 30.0]);

        sort_items(&mut items, SortKey::PriceDesc);
        let dailies: Vec<f64> = items.iter().map(|i| i.pricing.daily).collect();
        assert_eq!(dailies, vec![30.0, 20.0, 10.0]);

        sort_items(&mut items, SortKey::Rating);
        let averages: Vec<f64> = items.iter().map(|i| i.ratings.average).collect();
        assert!(averages.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_sort_newest_and_oldest() {
        let mut items = vec![item("old", 1.0, "x", 10), item("new", 1.0, "x", 0), item("mid", 1.0, "x", 5)];

        sort_items(&mut items, SortKey::Newest);
        assert_eq!(items[0].title, "new");
        assert_eq!(items[2].title, "old");

        sort_items(&mut items, SortKey::Oldest);
        assert_eq!(items[0].title, "old");
        assert_eq!(items[2].title, "new");
    }

    #[test]
    fn test_pagination_flags() {
        let items: Vec<Item> = (0..20).map(|n| item(&format!("item-{n}"), 5.0, "x", n)).collect();

        let page = paginate(items.clone(), 2, 12);
        assert_eq!(page.items.len(), 8);
        assert_eq!(page.pagination.current_page, 2);
        assert_eq!(page.pagination.total_pages, 2);
        assert_eq!(page.pagination.total_items, 20);
        assert!(!page.pagination.has_next);
        assert!(page.pagination.has_prev);

        let first = paginate(items, 1, 12);
        assert_eq!(first.items.len(), 12);
        assert!(first.pagination.has_next);
        assert!(!first.pagination.has_prev);
    }

    #[test]
    fn test_pagination_clamps_inputs() {
        let items: Vec<Item> = (0..5).map(|n| item(&format!("i{n}"), 5.0, "x", n)).collect();

        let page = paginate(items.clone(), 0, 0);
        assert_eq!(page.pagination.current_page, 1);
        assert_eq!(page.items.len(), 1);

        let big = paginate(items, 1, 10_000);
        assert!(big.items.len() <= MAX_PAGE_SIZE);
    }

    #[test]
    fn test_extreme_page_number_yields_empty_page() {
        let items: Vec<Item> = (0..3).map(|n| item(&format!("i{n}"), 5.0, "x", n)).collect();

        let page = paginate(items, usize::MAX, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.current_page, usize::MAX);
        assert!(!page.pagination.has_next);
        assert!(page.pagination.has_prev);

        // Degenerate call with no items at all.
        let empty = paginate(Vec::new(), usize::MAX, 10);
        assert!(empty.items.is_empty());
        assert_eq!(empty.pagination.total_pages, 0);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let items: Vec<Item> = (0..3).map(|n| item(&format!("i{n}"), 5.0, "x", n)).collect();
        let page = paginate(items, 5, 10);
        assert!(page.items.is_empty());
        assert!(!page.pagination.has_next);
        assert!(page.pagination.has_prev);
    }

    #[test]
    fn test_featured_takes_top_eight_rated() {
        let mut items: Vec<Item> = (0..9)
            .map(|n| {
                let mut i = item(&format!("i{n}"), 5.0, "x", n as i64);
                i.ratings = Ratings { average: n as f64 / 2.0, count: 1 };
                i
            })
            .collect();
        // One unrated and one inactive item must be excluded.
        items.push(item("unrated", 5.0, "x", 0));
        let mut inactive = item("inactive", 5.0, "x", 0);
        inactive.is_active = false;
        inactive.ratings = Ratings { average: 5.0, count: 10 };
        items.push(inactive);

        let featured = featured_items(items);
        assert_eq!(featured.len(), FEATURED_COUNT);
        let averages: Vec<f64> = featured.iter().map(|i| i.ratings.average).collect();
        assert!(averages.windows(2).all(|w| w[0] >= w[1]));
        assert!(featured.iter().all(|i| i.ratings.count > 0 && i.is_active));
    }
}
