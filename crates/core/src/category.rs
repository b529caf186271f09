use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub i64);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable reference data. Created by setup/seed; the categorization
/// engine only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Icon key for the frontend icon set (e.g. "PizzaSlice").
    pub icon: String,
    /// Display color as a hex string (e.g. "#74C648").
    pub color: String,
}

impl Category {
    pub fn new(id: i64, name: &str, icon: &str, color: &str) -> Self {
        Category {
            id: CategoryId(id),
            name: name.to_string(),
            icon: icon.to_string(),
            color: color.to_string(),
        }
    }
}

/// The stock category set seeded into a fresh database: (name, icon key).
pub const DEFAULT_CATEGORIES: [(&str, &str); 17] = [
    ("Rent", "City"),
    ("Entertainment", "Tv"),
    ("Restaurants", "PizzaSlice"),
    ("Furniture", "Sofa"),
    ("Groceries", "Cart"),
    ("Gifts", "Gift"),
    ("Fitness", "Gym"),
    ("Water Bill", "Droplet"),
    ("Technology", "Tv"),
    ("Electricity Bill", "Flash"),
    ("Clothes", "Shirt"),
    ("Transportation", "Tram"),
    ("Heating Bill", "FireFlame"),
    ("Home Internet", "Wifi"),
    ("Taxes", "Cash"),
    ("Mobile Data", "SmartphoneDevice"),
    ("Other", "HelpCircle"),
];

/// Display palette cycled over the seeded categories.
pub const CATEGORY_COLORS: [&str; 6] = [
    "#74C648", "#AC66DA", "#D93F3F", "#4A90E2", "#FFA500", "#FF8C00",
];

/// The category list with case-insensitive name lookup.
///
/// Matching resolves category *names* at the engine boundary; ids are only
/// used to join against pattern rows.
#[derive(Debug, Clone, Default)]
pub struct CategoryDirectory {
    categories: Vec<Category>,
    by_name: HashMap<String, usize>,
    by_id: HashMap<CategoryId, usize>,
}

impl CategoryDirectory {
    pub fn new(categories: Vec<Category>) -> Self {
        let mut by_name = HashMap::with_capacity(categories.len());
        let mut by_id = HashMap::with_capacity(categories.len());
        for (idx, cat) in categories.iter().enumerate() {
            by_name.insert(cat.name.to_lowercase(), idx);
            by_id.insert(cat.id, idx);
        }
        CategoryDirectory { categories, by_name, by_id }
    }

    /// Case-insensitive lookup by display name.
    pub fn find_by_name(&self, name: &str) -> Option<&Category> {
        self.by_name
            .get(&name.to_lowercase())
            .map(|&idx| &self.categories[idx])
    }

    pub fn get(&self, id: CategoryId) -> Option<&Category> {
        self.by_id.get(&id).map(|&idx| &self.categories[idx])
    }

    /// Canonical display name for an id, if the id is known.
    pub fn name_of(&self, id: CategoryId) -> Option<&str> {
        self.get(id).map(|c| c.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
