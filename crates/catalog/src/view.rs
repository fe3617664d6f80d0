//! Product view pipeline: category filter, title search, stable sort.

use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::product::Product;

/// Ordering applied to the listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOption {
    #[default]
    PriceAsc,
    PriceDesc,
    RatingDesc,
    NameAsc,
}

impl SortOption {
    pub const ALL: [SortOption; 4] = [
        SortOption::PriceAsc,
        SortOption::PriceDesc,
        SortOption::RatingDesc,
        SortOption::NameAsc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::PriceAsc => "price-asc",
            SortOption::PriceDesc => "price-desc",
            SortOption::RatingDesc => "rating-desc",
            SortOption::NameAsc => "name-asc",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortOption::PriceAsc => "Price: Low to High",
            SortOption::PriceDesc => "Price: High to Low",
            SortOption::RatingDesc => "Highest Rated",
            SortOption::NameAsc => "Name: A to Z",
        }
    }

    /// Comparator for this option. Callers must use a stable sort.
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self {
            SortOption::PriceAsc => a.price.total_cmp(&b.price),
            SortOption::PriceDesc => b.price.total_cmp(&a.price),
            SortOption::RatingDesc => b.rating.rate.total_cmp(&a.rating.rate),
            SortOption::NameAsc => compare_titles(&a.title, &b.title),
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown sort option '{0}' (expected one of: price-asc, price-desc, rating-desc, name-asc)")]
pub struct UnknownSortOption(pub String);

impl FromStr for SortOption {
    type Err = UnknownSortOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOption::ALL
            .into_iter()
            .find(|option| option.as_str() == s)
            .ok_or_else(|| UnknownSortOption(s.to_string()))
    }
}

/// Collation for product titles.
///
/// Three levels, each consulted only on a tie at the previous one: base
/// letters ignoring accents and case (`Élan` sorts among the e's), then
/// accents (unaccented first), then case (lowercase first).
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| folded(a).cmp(folded(b)))
        .then_with(|| compare_case(a, b))
}

fn base_letters(title: &str) -> impl Iterator<Item = char> + '_ {
    title
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

fn folded(title: &str) -> impl Iterator<Item = char> + '_ {
    title.nfd().flat_map(char::to_lowercase)
}

fn compare_case(a: &str, b: &str) -> Ordering {
    for (x, y) in a.nfd().zip(b.nfd()) {
        if x == y {
            continue;
        }
        return match (x.is_lowercase(), y.is_lowercase()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => x.cmp(&y),
        };
    }
    a.len().cmp(&b.len())
}

/// User-controlled listing state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuery {
    /// Exact category to keep; `None` or empty keeps every category.
    pub category: Option<String>,
    /// Case-insensitive title substring; empty keeps everything.
    pub search: String,
    pub sort: SortOption,
}

impl ProductQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_sort(mut self, sort: SortOption) -> Self {
        self.sort = sort;
        self
    }

    /// Whether `product` passes both filters.
    pub fn matches(&self, product: &Product) -> bool {
        let category_ok = match self.category.as_deref() {
            None | Some("") => true,
            Some(category) => product.category == category,
        };
        category_ok && self.matches_search(product)
    }

    fn matches_search(&self, product: &Product) -> bool {
        if self.search.is_empty() {
            return true;
        }
        product
            .title
            .to_lowercase()
            .contains(&self.search.to_lowercase())
    }

    /// Produce the visible listing. `products` is left untouched.
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let mut visible: Vec<Product> = products
            .iter()
            .filter(|p| self.matches(p))
            .cloned()
            .collect();

        // `sort_by` is stable: ties keep their input order.
        visible.sort_by(|a, b| self.sort.compare(a, b));
        visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Rating;
    use proptest::prelude::*;
    use storefront_core::ProductId;

    fn product(id: u64, title: &str, price: f64, category: &str, rate: f64) -> Product {
        Product {
            id: ProductId::new(id),
            title: title.to_string(),
            price,
            description: String::new(),
            category: category.to_string(),
            image: String::new(),
            rating: Rating { rate, count: 10 },
        }
    }

    fn titles(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn price_ties_keep_input_order() {
        let products = vec![
            product(1, "B", 5.0, "misc", 1.0),
            product(2, "A", 5.0, "misc", 1.0),
        ];
        let sorted = ProductQuery::new().with_sort(SortOption::PriceAsc).apply(&products);
        assert_eq!(titles(&sorted), vec!["B", "A"]);

        let sorted = ProductQuery::new().with_sort(SortOption::PriceDesc).apply(&products);
        assert_eq!(titles(&sorted), vec!["B", "A"]);
    }

    #[test]
    fn sorts_by_price_in_both_directions() {
        let products = vec![
            product(1, "Mid", 20.0, "misc", 1.0),
            product(2, "Low", 9.5, "misc", 1.0),
            product(3, "High", 100.0, "misc", 1.0),
        ];
        let asc = ProductQuery::new().with_sort(SortOption::PriceAsc).apply(&products);
        assert_eq!(titles(&asc), vec!["Low", "Mid", "High"]);
        let desc = ProductQuery::new().with_sort(SortOption::PriceDesc).apply(&products);
        assert_eq!(titles(&desc), vec!["High", "Mid", "Low"]);
    }

    #[test]
    fn rating_desc_is_stable() {
        let products = vec![
            product(1, "Okay", 1.0, "misc", 3.0),
            product(2, "Great", 1.0, "misc", 4.8),
            product(3, "Also okay", 1.0, "misc", 3.0),
        ];
        let sorted = ProductQuery::new().with_sort(SortOption::RatingDesc).apply(&products);
        assert_eq!(titles(&sorted), vec!["Great", "Okay", "Also okay"]);
    }

    #[test]
    fn name_asc_ignores_case() {
        let products = vec![
            product(1, "banana", 1.0, "misc", 1.0),
            product(2, "Apple", 1.0, "misc", 1.0),
            product(3, "cherry", 1.0, "misc", 1.0),
        ];
        let sorted = ProductQuery::new().with_sort(SortOption::NameAsc).apply(&products);
        assert_eq!(titles(&sorted), vec!["Apple", "banana", "cherry"]);
    }

    #[test]
    fn compare_titles_puts_lowercase_first_on_case_only_difference() {
        assert_eq!(compare_titles("apple", "Apple"), Ordering::Less);
        assert_eq!(compare_titles("Apple", "apple"), Ordering::Greater);
        assert_eq!(compare_titles("Apple", "Apple"), Ordering::Equal);
        assert_eq!(compare_titles("App", "apple"), Ordering::Less);
    }

    #[test]
    fn accented_titles_sort_next_to_their_base_letter() {
        assert_eq!(compare_titles("Élan", "Zebra"), Ordering::Less);
        assert_eq!(compare_titles("Élan", "Dune"), Ordering::Greater);
        assert_eq!(compare_titles("eclair", "éclair"), Ordering::Less);
        assert_eq!(compare_titles("éclair", "Eclair"), Ordering::Greater);

        let products = vec![
            product(1, "Zebra Print Scarf", 1.0, "misc", 1.0),
            product(2, "Élan Leather Bag", 1.0, "misc", 1.0),
            product(3, "denim Jacket", 1.0, "misc", 1.0),
            product(4, "Ängel Pendant", 1.0, "misc", 1.0),
        ];
        let sorted = ProductQuery::new().with_sort(SortOption::NameAsc).apply(&products);
        assert_eq!(
            titles(&sorted),
            vec!["Ängel Pendant", "denim Jacket", "Élan Leather Bag", "Zebra Print Scarf"]
        );
    }

    #[test]
    fn name_ties_keep_input_order() {
        let products = vec![
            product(1, "Mug", 3.0, "misc", 1.0),
            product(2, "Mug", 1.0, "misc", 1.0),
        ];
        let sorted = ProductQuery::new().with_sort(SortOption::NameAsc).apply(&products);
        let ids: Vec<u64> = sorted.iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn labels_are_human_readable() {
        assert_eq!(SortOption::PriceAsc.label(), "Price: Low to High");
        assert_eq!(SortOption::RatingDesc.label(), "Highest Rated");
        assert_eq!(SortOption::NameAsc.label(), "Name: A to Z");
    }

    #[test]
    fn category_filter_keeps_only_matching_items() {
        let products = vec![
            product(1, "Monitor", 100.0, "electronics", 4.0),
            product(2, "Ring", 50.0, "jewelery", 4.0),
        ];
        let visible = ProductQuery::new().with_category("electronics").apply(&products);
        assert_eq!(titles(&visible), vec!["Monitor"]);
    }

    #[test]
    fn empty_category_keeps_everything() {
        let products = vec![
            product(1, "Monitor", 100.0, "electronics", 4.0),
            product(2, "Ring", 50.0, "jewelery", 4.0),
        ];
        let visible = ProductQuery::new().with_category("").apply(&products);
        assert_eq!(visible.len(), 2);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let products = vec![
            product(1, "Fjallraven Backpack", 100.0, "bags", 4.0),
            product(2, "Men's Cotton Shirt", 20.0, "men's clothing", 4.0),
        ];
        let visible = ProductQuery::new().with_search("shirt").apply(&products);
        assert_eq!(titles(&visible), vec!["Men's Cotton Shirt"]);

        let visible = ProductQuery::new().with_search("COTTON").apply(&products);
        assert_eq!(visible.len(), 1);
    }

    #[test]
    fn no_match_yields_empty_listing() {
        let products = vec![product(1, "Monitor", 100.0, "electronics", 4.0)];
        let visible = ProductQuery::new()
            .with_category("electronics")
            .with_search("ring")
            .apply(&products);
        assert!(visible.is_empty());
    }

    #[test]
    fn sort_option_round_trips_wire_names() {
        for option in SortOption::ALL {
            assert_eq!(option.as_str().parse::<SortOption>().unwrap(), option);
        }
        assert_eq!(SortOption::default(), SortOption::PriceAsc);
        assert!("cheapest".parse::<SortOption>().is_err());

        let json = serde_json::to_string(&SortOption::RatingDesc).unwrap();
        assert_eq!(json, "\"rating-desc\"");
    }

    /// Coarse prices, ratings and titles so that ties are common.
    /// Each id is the product's input position.
    fn arb_products() -> impl Strategy<Value = Vec<Product>> {
        prop::collection::vec(
            (
                "[abABáÁ ]{0,3}",
                0u32..4,
                prop::sample::select(vec!["electronics", "jewelery", "men's clothing"]),
                0u32..=5,
            ),
            0..30,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (title, price, category, rate))| {
                    product(i as u64, &title, f64::from(price) * 2.5, category, f64::from(rate))
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn listing_is_a_stable_ordered_subset(
            products in arb_products(),
            sort in prop::sample::select(SortOption::ALL.to_vec()),
            search in "[ab]{0,1}",
        ) {
            let before = products.clone();
            let query = ProductQuery::new().with_search(search).with_sort(sort);
            let visible = query.apply(&products);

            prop_assert_eq!(&products, &before);
            for p in &visible {
                prop_assert!(query.matches(p));
            }
            let expected = products.iter().filter(|p| query.matches(p)).count();
            prop_assert_eq!(visible.len(), expected);
            for pair in visible.windows(2) {
                match sort.compare(&pair[0], &pair[1]) {
                    Ordering::Less => {}
                    Ordering::Equal => prop_assert!(pair[0].id < pair[1].id, "tie reordered: {:?}", pair),
                    Ordering::Greater => prop_assert!(false, "out of order: {:?}", pair),
                }
            }
        }
    }
}
